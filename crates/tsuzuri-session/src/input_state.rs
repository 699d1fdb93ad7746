//! The input-mode state machine.
//!
//! [`InputState::event`] is a total, pure function from (mode, action) to a
//! client effect plus a transition instruction. It never touches the buffer;
//! the controller executes the effect and then applies the transition.

use tsuzuri_core::composing::{InputPiece, Modifiers};

use crate::types::{Function, InputLanguage, Navigation, Number, UserAction};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum InputState {
    #[default]
    None,
    /// A dead key was pressed; holds the spacing diacritic.
    AttachDiacritic(char),
    Composing,
    Previewing,
    Selecting,
    ReplaceSuggestion,
    /// Raw code-point entry; holds the hex digits typed so far.
    UnicodeInput(String),
}

/// What the controller should do for a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Handled; nothing else to do.
    Consume,
    /// Not handled; the host should process the key.
    Fallthrough,

    ShowCandidateWindow,
    HideCandidateWindow,
    EnterFirstCandidatePreviewMode,
    EnterCandidateSelectionMode,

    AppendPieceToMarkedText(Vec<InputPiece>),
    InsertWithoutMarkedText(String),
    EditSegment(isize),
    CommitMarkedText,
    CommitMarkedTextAndAppendPieceToMarkedText(Vec<InputPiece>),
    CommitMarkedTextAndSelectInputLanguage(InputLanguage),
    RemoveLastMarkedText,
    StopComposition,

    SubmitSelectedCandidate,
    SubmitHiraganaCandidate,
    SubmitKatakanaCandidate,
    SubmitHalfWidthKatakanaCandidate,
    SubmitFullWidthRomanCandidate,
    SubmitHalfWidthRomanCandidate,

    SelectPrevCandidate,
    SelectNextCandidate,
    /// Digit shortcut 1..=9 on the visible page.
    SelectNumberCandidate(u8),
    SelectNextCandidatePage,
    SelectPrevCandidatePage,
    SelectFirstCandidate,
    SelectLastCandidate,

    EnableDebugWindow,
    DisableDebugWindow,
    ForgetMemory,
    SelectInputLanguage(InputLanguage),

    RequestPredictiveSuggestion,
    AcceptPredictionCandidate,
    RequestReplaceSuggestion,
    SelectNextReplaceSuggestionCandidate,
    SelectPrevReplaceSuggestionCandidate,
    SubmitReplaceSuggestionCandidate,
    HideReplaceSuggestionWindow,

    EnterUnicodeInputMode,
    AppendToUnicodeInput(String),
    RemoveLastUnicodeInput,
    SubmitUnicodeInput(String),
    CancelUnicodeInput,
    SubmitSelectedCandidateAndEnterUnicodeInputMode,

    ReconvertCommittedText,
}

/// How the mode changes once the action has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientActionCallback {
    /// Keep the current mode.
    Fallthrough,
    Transition(InputState),
    /// Decided by whether the buffer is empty after a deletion.
    BasedOnBackspace {
        if_empty: InputState,
        if_not_empty: InputState,
    },
    /// Decided by whether the buffer is empty after a candidate submission.
    BasedOnSubmitCandidate {
        if_empty: InputState,
        if_not_empty: InputState,
    },
}

impl ClientActionCallback {
    /// The mode to move to, given the mode before and the buffer state after
    /// the action.
    pub fn resolve(self, current: InputState, buffer_is_empty: bool) -> InputState {
        match self {
            ClientActionCallback::Fallthrough => current,
            ClientActionCallback::Transition(next) => next,
            ClientActionCallback::BasedOnBackspace {
                if_empty,
                if_not_empty,
            }
            | ClientActionCallback::BasedOnSubmitCandidate {
                if_empty,
                if_not_empty,
            } => {
                if buffer_is_empty {
                    if_empty
                } else {
                    if_not_empty
                }
            }
        }
    }
}

/// Everything besides mode and action that a transition may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionContext {
    pub modifiers: Modifiers,
    pub input_language: InputLanguage,
    pub live_conversion: bool,
    pub debug_window: bool,
    pub suggestion: bool,
}

use ClientAction as A;
use ClientActionCallback as C;

const PASS: (ClientAction, ClientActionCallback) = (A::Fallthrough, C::Fallthrough);
const CONSUME: (ClientAction, ClientActionCallback) = (A::Consume, C::Fallthrough);

fn to(state: InputState) -> ClientActionCallback {
    C::Transition(state)
}

fn after_submit(if_not_empty: InputState) -> ClientActionCallback {
    C::BasedOnSubmitCandidate {
        if_empty: InputState::None,
        if_not_empty,
    }
}

fn after_backspace() -> ClientActionCallback {
    C::BasedOnBackspace {
        if_empty: InputState::None,
        if_not_empty: InputState::Composing,
    }
}

fn function_action(function: Function) -> ClientAction {
    match function {
        Function::Six => A::SubmitHiraganaCandidate,
        Function::Seven => A::SubmitKatakanaCandidate,
        Function::Eight => A::SubmitHalfWidthKatakanaCandidate,
        Function::Nine => A::SubmitFullWidthRomanCandidate,
        Function::Ten => A::SubmitHalfWidthRomanCandidate,
    }
}

fn is_hex_digit(c: char) -> bool {
    c.is_ascii_digit() || ('a'..='f').contains(&c)
}

impl InputState {
    /// Modes in which a candidate or suggestion affordance may be on screen.
    fn is_rich(&self) -> bool {
        matches!(
            self,
            InputState::Composing
                | InputState::Previewing
                | InputState::Selecting
                | InputState::ReplaceSuggestion
        )
    }

    /// Option is honored only for a few actions; everything else goes to the
    /// host so system shortcuts keep working. `None` means continue with the
    /// per-mode table.
    fn option_gate(&self, action: &UserAction) -> Option<(ClientAction, ClientActionCallback)> {
        match action {
            UserAction::Input(_) | UserAction::DeadKey(_) | UserAction::Backspace => None,
            UserAction::Enter if *self == InputState::Composing => None,
            UserAction::Tab if self.is_rich() => None,
            UserAction::Navigation(_)
            | UserAction::Escape
            | UserAction::Eisu
            | UserAction::Kana
                if self.is_rich() =>
            {
                Some(CONSUME)
            }
            _ => Some(PASS),
        }
    }

    pub fn event(
        &self,
        action: &UserAction,
        ctx: &TransitionContext,
    ) -> (ClientAction, ClientActionCallback) {
        let m = ctx.modifiers;
        if m.command {
            return PASS;
        }
        if m.option {
            if let Some(gated) = self.option_gate(action) {
                return gated;
            }
        }
        match self {
            InputState::None => Self::on_none(action, ctx),
            InputState::AttachDiacritic(diacritic) => Self::on_attach_diacritic(*diacritic, action),
            InputState::Composing => Self::on_composing(action, ctx),
            InputState::Previewing => Self::on_previewing(action, ctx),
            InputState::Selecting => Self::on_selecting(action, ctx),
            InputState::ReplaceSuggestion => Self::on_replace_suggestion(action),
            InputState::UnicodeInput(code_point) => Self::on_unicode_input(code_point, action),
        }
    }

    fn on_none(action: &UserAction, ctx: &TransitionContext) -> (ClientAction, ClientActionCallback) {
        let english = ctx.input_language == InputLanguage::English;
        match action {
            UserAction::Input(pieces) => {
                if english {
                    (
                        A::InsertWithoutMarkedText(UserAction::input_string(pieces, true)),
                        C::Fallthrough,
                    )
                } else {
                    (A::AppendPieceToMarkedText(pieces.clone()), to(InputState::Composing))
                }
            }
            UserAction::DeadKey(diacritic) => {
                if english {
                    (A::Consume, to(InputState::AttachDiacritic(*diacritic)))
                } else {
                    PASS
                }
            }
            UserAction::Number(number) => {
                if english {
                    (A::InsertWithoutMarkedText(number.input_string()), C::Fallthrough)
                } else {
                    (
                        A::AppendPieceToMarkedText(vec![number.input_piece()]),
                        to(InputState::Composing),
                    )
                }
            }
            UserAction::Eisu => (A::SelectInputLanguage(InputLanguage::English), C::Fallthrough),
            UserAction::Kana => (A::SelectInputLanguage(InputLanguage::Japanese), C::Fallthrough),
            UserAction::Space { prefers_full_width } => {
                let text = if !english && *prefers_full_width { "　" } else { " " };
                (A::InsertWithoutMarkedText(text.to_string()), C::Fallthrough)
            }
            UserAction::Suggest if ctx.suggestion => {
                (A::RequestPredictiveSuggestion, to(InputState::ReplaceSuggestion))
            }
            UserAction::StartUnicodeInput => {
                (A::EnterUnicodeInputMode, to(InputState::UnicodeInput(String::new())))
            }
            UserAction::ReconvertCommittedText => (A::ReconvertCommittedText, C::Fallthrough),
            UserAction::Suggest
            | UserAction::Unknown
            | UserAction::Navigation(_)
            | UserAction::Backspace
            | UserAction::Enter
            | UserAction::Escape
            | UserAction::Function(_)
            | UserAction::EditSegment(_)
            | UserAction::Tab
            | UserAction::Forget
            | UserAction::TransformSelectedText => PASS,
        }
    }

    fn on_attach_diacritic(diacritic: char, action: &UserAction) -> (ClientAction, ClientActionCallback) {
        let with = |suffix: &str| {
            let mut text = String::with_capacity(suffix.len() + 2);
            text.push(diacritic);
            text.push_str(suffix);
            A::InsertWithoutMarkedText(text)
        };
        match action {
            UserAction::Input(pieces) => {
                let typed = UserAction::input_string(pieces, true);
                let text = tsuzuri_core::diacritic::attach_or_literal(diacritic, &typed);
                (A::InsertWithoutMarkedText(text), to(InputState::None))
            }
            UserAction::DeadKey(next) => (with(""), to(InputState::AttachDiacritic(*next))),
            UserAction::Number(number) => (with(&number.input_string()), to(InputState::None)),
            UserAction::Backspace | UserAction::Escape => (A::StopComposition, to(InputState::None)),
            UserAction::Kana => (A::SelectInputLanguage(InputLanguage::Japanese), to(InputState::None)),
            UserAction::Function(_) => CONSUME,
            UserAction::Enter => (with("\n"), to(InputState::None)),
            UserAction::Tab => (with("\t"), to(InputState::None)),
            UserAction::StartUnicodeInput => (with(""), to(InputState::UnicodeInput(String::new()))),
            UserAction::Unknown
            | UserAction::Space { .. }
            | UserAction::Eisu
            | UserAction::Navigation(_)
            | UserAction::EditSegment(_)
            | UserAction::Suggest
            | UserAction::Forget
            | UserAction::TransformSelectedText
            | UserAction::ReconvertCommittedText => (with(""), to(InputState::None)),
        }
    }

    fn on_composing(action: &UserAction, ctx: &TransitionContext) -> (ClientAction, ClientActionCallback) {
        let m = ctx.modifiers;
        match action {
            UserAction::Input(pieces) => (A::AppendPieceToMarkedText(pieces.clone()), C::Fallthrough),
            UserAction::Number(number) => {
                (A::AppendPieceToMarkedText(vec![number.input_piece()]), C::Fallthrough)
            }
            UserAction::Backspace if m.option => CONSUME,
            UserAction::Backspace => (A::RemoveLastMarkedText, after_backspace()),
            UserAction::Enter if m.option => CONSUME,
            UserAction::Enter => (A::CommitMarkedText, to(InputState::None)),
            UserAction::Escape => (A::StopComposition, to(InputState::None)),
            UserAction::Space { .. } => {
                if ctx.live_conversion {
                    (A::EnterCandidateSelectionMode, to(InputState::Selecting))
                } else {
                    (A::EnterFirstCandidatePreviewMode, to(InputState::Previewing))
                }
            }
            UserAction::Function(function) => (function_action(*function), to(InputState::None)),
            UserAction::Forget => CONSUME,
            UserAction::Tab if m.option => CONSUME,
            UserAction::Tab => (A::AcceptPredictionCandidate, C::Fallthrough),
            UserAction::Eisu => (A::SelectInputLanguage(InputLanguage::English), C::Fallthrough),
            UserAction::Kana => (A::SelectInputLanguage(InputLanguage::Japanese), C::Fallthrough),
            UserAction::Navigation(direction) => Self::begin_selection(*direction, m),
            UserAction::EditSegment(count) => (A::EditSegment(*count), to(InputState::Selecting)),
            UserAction::Suggest if ctx.suggestion => {
                (A::RequestReplaceSuggestion, to(InputState::ReplaceSuggestion))
            }
            UserAction::StartUnicodeInput => {
                (A::CommitMarkedText, to(InputState::UnicodeInput(String::new())))
            }
            UserAction::ReconvertCommittedText => (A::ReconvertCommittedText, C::Fallthrough),
            UserAction::Suggest
            | UserAction::Unknown
            | UserAction::TransformSelectedText
            | UserAction::DeadKey(_) => PASS,
        }
    }

    /// Navigation from composing or previewing.
    fn begin_selection(direction: Navigation, m: Modifiers) -> (ClientAction, ClientActionCallback) {
        match direction {
            Navigation::Down => (A::EnterCandidateSelectionMode, to(InputState::Selecting)),
            Navigation::Right if m.shift => (A::EditSegment(1), to(InputState::Selecting)),
            Navigation::Left if m.shift => (A::EditSegment(-1), to(InputState::Selecting)),
            _ => CONSUME,
        }
    }

    fn on_previewing(action: &UserAction, ctx: &TransitionContext) -> (ClientAction, ClientActionCallback) {
        let m = ctx.modifiers;
        match action {
            UserAction::Input(pieces) => (
                A::CommitMarkedTextAndAppendPieceToMarkedText(pieces.clone()),
                to(InputState::Composing),
            ),
            UserAction::Number(number) => (
                A::CommitMarkedTextAndAppendPieceToMarkedText(vec![number.input_piece()]),
                to(InputState::Composing),
            ),
            UserAction::Backspace if m.option => CONSUME,
            UserAction::Backspace => (A::RemoveLastMarkedText, to(InputState::Composing)),
            UserAction::Enter => (A::CommitMarkedText, to(InputState::None)),
            UserAction::Space { .. } => (A::EnterCandidateSelectionMode, to(InputState::Selecting)),
            UserAction::Escape => (A::HideCandidateWindow, to(InputState::Composing)),
            UserAction::Function(function) => (function_action(*function), to(InputState::None)),
            UserAction::Eisu => (A::SelectInputLanguage(InputLanguage::English), C::Fallthrough),
            UserAction::Kana => (A::SelectInputLanguage(InputLanguage::Japanese), C::Fallthrough),
            UserAction::Forget | UserAction::Tab => CONSUME,
            UserAction::Navigation(direction) => Self::begin_selection(*direction, m),
            UserAction::EditSegment(count) => (A::EditSegment(*count), to(InputState::Selecting)),
            UserAction::StartUnicodeInput => {
                (A::CommitMarkedText, to(InputState::UnicodeInput(String::new())))
            }
            UserAction::ReconvertCommittedText => (A::ReconvertCommittedText, C::Fallthrough),
            UserAction::Unknown
            | UserAction::Suggest
            | UserAction::TransformSelectedText
            | UserAction::DeadKey(_) => PASS,
        }
    }

    fn on_selecting(action: &UserAction, ctx: &TransitionContext) -> (ClientAction, ClientActionCallback) {
        let m = ctx.modifiers;
        match action {
            UserAction::Input(pieces) => {
                let typed = UserAction::input_string(pieces, true);
                if ctx.debug_window && typed == "d" {
                    return (A::EnableDebugWindow, C::Fallthrough);
                }
                if ctx.debug_window && typed == "D" {
                    return (A::DisableDebugWindow, C::Fallthrough);
                }
                // Commits and starts a new composition instead of resuming the
                // current one.
                (
                    A::CommitMarkedTextAndAppendPieceToMarkedText(pieces.clone()),
                    to(InputState::Composing),
                )
            }
            UserAction::Enter => (A::SubmitSelectedCandidate, after_submit(InputState::Previewing)),
            UserAction::Backspace if m.option => CONSUME,
            UserAction::Backspace => (A::RemoveLastMarkedText, after_backspace()),
            UserAction::Escape => {
                if ctx.live_conversion {
                    (A::HideCandidateWindow, to(InputState::Composing))
                } else {
                    (A::EnterFirstCandidatePreviewMode, to(InputState::Previewing))
                }
            }
            UserAction::Space { .. } if m.shift => (A::SelectPrevCandidate, C::Fallthrough),
            UserAction::Space { .. } => (A::SelectNextCandidate, C::Fallthrough),
            UserAction::Navigation(direction) => match direction {
                Navigation::Right if m.shift => (A::EditSegment(1), C::Fallthrough),
                Navigation::Right => {
                    (A::SubmitSelectedCandidate, after_submit(InputState::Selecting))
                }
                Navigation::Left if m.shift => (A::EditSegment(-1), C::Fallthrough),
                Navigation::Left => CONSUME,
                Navigation::PageDown => (A::SelectNextCandidatePage, C::Fallthrough),
                Navigation::PageUp => (A::SelectPrevCandidatePage, C::Fallthrough),
                Navigation::Home => (A::SelectFirstCandidate, C::Fallthrough),
                Navigation::End => (A::SelectLastCandidate, C::Fallthrough),
                Navigation::Down => (A::SelectNextCandidate, C::Fallthrough),
                Navigation::Up => (A::SelectPrevCandidate, C::Fallthrough),
            },
            UserAction::Function(function) => {
                (function_action(*function), after_submit(InputState::Selecting))
            }
            UserAction::Number(number @ (Number::Zero | Number::ShiftZero)) => (
                A::CommitMarkedTextAndAppendPieceToMarkedText(vec![number.input_piece()]),
                to(InputState::Composing),
            ),
            UserAction::Number(number) => (
                A::SelectNumberCandidate(number.value()),
                after_submit(InputState::Previewing),
            ),
            UserAction::EditSegment(count) => (A::EditSegment(*count), to(InputState::Selecting)),
            UserAction::Forget => (A::ForgetMemory, C::Fallthrough),
            UserAction::Eisu => (
                A::CommitMarkedTextAndSelectInputLanguage(InputLanguage::English),
                C::Fallthrough,
            ),
            UserAction::Kana => (A::SelectInputLanguage(InputLanguage::Japanese), C::Fallthrough),
            UserAction::Tab => CONSUME,
            UserAction::StartUnicodeInput => (
                A::SubmitSelectedCandidateAndEnterUnicodeInputMode,
                to(InputState::UnicodeInput(String::new())),
            ),
            UserAction::ReconvertCommittedText => (A::ReconvertCommittedText, C::Fallthrough),
            UserAction::Unknown
            | UserAction::Suggest
            | UserAction::TransformSelectedText
            | UserAction::DeadKey(_) => PASS,
        }
    }

    fn on_replace_suggestion(action: &UserAction) -> (ClientAction, ClientActionCallback) {
        match action {
            UserAction::Input(pieces) => {
                (A::AppendPieceToMarkedText(pieces.clone()), to(InputState::Composing))
            }
            UserAction::Space { .. } => (A::SelectNextReplaceSuggestionCandidate, C::Fallthrough),
            UserAction::Navigation(Navigation::Down) => {
                (A::SelectNextReplaceSuggestionCandidate, C::Fallthrough)
            }
            UserAction::Navigation(Navigation::Up) => {
                (A::SelectPrevReplaceSuggestionCandidate, C::Fallthrough)
            }
            UserAction::Navigation(_) => CONSUME,
            UserAction::Suggest => (A::RequestReplaceSuggestion, C::Fallthrough),
            UserAction::Enter => (A::SubmitReplaceSuggestionCandidate, to(InputState::None)),
            UserAction::Backspace | UserAction::Escape => {
                (A::HideReplaceSuggestionWindow, to(InputState::Composing))
            }
            UserAction::Eisu => (A::SelectInputLanguage(InputLanguage::English), C::Fallthrough),
            UserAction::Kana => (A::SelectInputLanguage(InputLanguage::Japanese), C::Fallthrough),
            UserAction::Forget | UserAction::Tab => CONSUME,
            UserAction::StartUnicodeInput => (
                A::HideReplaceSuggestionWindow,
                to(InputState::UnicodeInput(String::new())),
            ),
            UserAction::ReconvertCommittedText => (A::ReconvertCommittedText, C::Fallthrough),
            UserAction::Unknown
            | UserAction::Function(_)
            | UserAction::Number(_)
            | UserAction::EditSegment(_)
            | UserAction::TransformSelectedText
            | UserAction::DeadKey(_) => PASS,
        }
    }

    fn on_unicode_input(code_point: &str, action: &UserAction) -> (ClientAction, ClientActionCallback) {
        let extended = |digits: String| {
            let mut next = code_point.to_string();
            next.push_str(&digits);
            (A::AppendToUnicodeInput(digits), to(InputState::UnicodeInput(next)))
        };
        match action {
            UserAction::Input(pieces) => {
                let digits: String = UserAction::input_string(pieces, true)
                    .to_lowercase()
                    .chars()
                    .filter(|&c| is_hex_digit(c))
                    .collect();
                if digits.is_empty() {
                    CONSUME
                } else {
                    extended(digits)
                }
            }
            UserAction::Number(number) => extended(number.input_string()),
            UserAction::Backspace => {
                let mut shorter = code_point.to_string();
                if shorter.pop().is_none() {
                    (A::CancelUnicodeInput, to(InputState::None))
                } else {
                    (A::RemoveLastUnicodeInput, to(InputState::UnicodeInput(shorter)))
                }
            }
            UserAction::Enter | UserAction::Space { .. } => {
                if code_point.is_empty() {
                    (A::CancelUnicodeInput, to(InputState::None))
                } else {
                    (A::SubmitUnicodeInput(code_point.to_string()), to(InputState::None))
                }
            }
            UserAction::Escape => (A::CancelUnicodeInput, to(InputState::None)),
            UserAction::Eisu
            | UserAction::Kana
            | UserAction::Tab
            | UserAction::Forget
            | UserAction::Function(_)
            | UserAction::Navigation(_)
            | UserAction::EditSegment(_)
            | UserAction::Suggest
            | UserAction::TransformSelectedText
            | UserAction::DeadKey(_)
            | UserAction::StartUnicodeInput
            | UserAction::Unknown
            | UserAction::ReconvertCommittedText => CONSUME,
        }
    }
}
