use tsuzuri_core::composing::{InputPiece, Modifiers};
use tsuzuri_core::diacritic::dead_key_diacritic;

use crate::input_state::{ClientAction as A, ClientActionCallback as C, InputState, TransitionContext};
use crate::types::{InputLanguage, Navigation, Number, UserAction};

fn ctx() -> TransitionContext {
    TransitionContext {
        modifiers: Modifiers::NONE,
        input_language: InputLanguage::Japanese,
        live_conversion: true,
        debug_window: false,
        suggestion: true,
    }
}

fn with_mods(modifiers: Modifiers) -> TransitionContext {
    TransitionContext {
        modifiers,
        ..ctx()
    }
}

fn input(s: &str) -> UserAction {
    UserAction::Input(s.chars().map(InputPiece::key).collect())
}

#[test]
fn none_input_by_language() {
    let (action, callback) = InputState::None.event(&input("a"), &ctx());
    assert_eq!(action, A::AppendPieceToMarkedText(vec![InputPiece::key('a')]));
    assert_eq!(callback, C::Transition(InputState::Composing));

    let english = TransitionContext {
        input_language: InputLanguage::English,
        ..ctx()
    };
    let (action, callback) = InputState::None.event(&input("a"), &english);
    assert_eq!(action, A::InsertWithoutMarkedText("a".into()));
    assert_eq!(callback, C::Fallthrough);
}

#[test]
fn composing_space_follows_live_conversion() {
    let space = UserAction::Space {
        prefers_full_width: true,
    };
    assert_eq!(
        InputState::Composing.event(&space, &ctx()),
        (A::EnterCandidateSelectionMode, C::Transition(InputState::Selecting))
    );
    let lean = TransitionContext {
        live_conversion: false,
        ..ctx()
    };
    assert_eq!(
        InputState::Composing.event(&space, &lean),
        (A::EnterFirstCandidatePreviewMode, C::Transition(InputState::Previewing))
    );
}

#[test]
fn backspace_callback_depends_on_buffer() {
    let (action, callback) = InputState::Composing.event(&UserAction::Backspace, &ctx());
    assert_eq!(action, A::RemoveLastMarkedText);
    assert_eq!(callback.clone().resolve(InputState::Composing, true), InputState::None);
    assert_eq!(callback.resolve(InputState::Composing, false), InputState::Composing);
}

#[test]
fn selecting_submission() {
    let (action, callback) = InputState::Selecting.event(&UserAction::Enter, &ctx());
    assert_eq!(action, A::SubmitSelectedCandidate);
    assert_eq!(callback.clone().resolve(InputState::Selecting, false), InputState::Previewing);
    assert_eq!(callback.resolve(InputState::Selecting, true), InputState::None);

    let right = UserAction::Navigation(Navigation::Right);
    let (action, callback) = InputState::Selecting.event(&right, &ctx());
    assert_eq!(action, A::SubmitSelectedCandidate);
    assert_eq!(callback.resolve(InputState::Selecting, false), InputState::Selecting);

    // Shift+right grows the segment instead.
    let (action, _) = InputState::Selecting.event(&right, &with_mods(Modifiers::SHIFT));
    assert_eq!(action, A::EditSegment(1));
}

#[test]
fn selecting_digits() {
    for number in Number::ALL {
        let (action, callback) = InputState::Selecting.event(&UserAction::Number(number), &ctx());
        match number {
            Number::Zero | Number::ShiftZero => {
                assert_eq!(
                    action,
                    A::CommitMarkedTextAndAppendPieceToMarkedText(vec![number.input_piece()])
                );
                assert_eq!(callback, C::Transition(InputState::Composing));
            }
            n => {
                assert_eq!(action, A::SelectNumberCandidate(n.value()));
                assert!(matches!(callback, C::BasedOnSubmitCandidate { .. }));
            }
        }
    }
}

#[test]
fn selecting_paging_keys() {
    let cases = [
        (Navigation::PageDown, A::SelectNextCandidatePage),
        (Navigation::PageUp, A::SelectPrevCandidatePage),
        (Navigation::Home, A::SelectFirstCandidate),
        (Navigation::End, A::SelectLastCandidate),
    ];
    for (nav, expected) in cases {
        assert_eq!(
            InputState::Selecting.event(&UserAction::Navigation(nav), &ctx()),
            (expected, C::Fallthrough)
        );
    }
}

#[test]
fn selecting_input_commits_then_composes() {
    let (action, callback) = InputState::Selecting.event(&input("k"), &ctx());
    assert_eq!(
        action,
        A::CommitMarkedTextAndAppendPieceToMarkedText(vec![InputPiece::key('k')])
    );
    assert_eq!(callback, C::Transition(InputState::Composing));
}

#[test]
fn debug_window_toggle_only_when_enabled() {
    let debug = TransitionContext {
        debug_window: true,
        ..ctx()
    };
    assert_eq!(InputState::Selecting.event(&input("d"), &debug).0, A::EnableDebugWindow);
    assert_eq!(InputState::Selecting.event(&input("D"), &debug).0, A::DisableDebugWindow);
    assert_ne!(InputState::Selecting.event(&input("d"), &ctx()).0, A::EnableDebugWindow);
}

#[test]
fn attach_diacritic_composes_or_falls_back() {
    let acute = dead_key_diacritic('e').unwrap();
    let state = InputState::AttachDiacritic(acute);
    assert_eq!(
        state.event(&input("e"), &ctx()),
        (A::InsertWithoutMarkedText("é".into()), C::Transition(InputState::None))
    );
    let (action, callback) = state.event(&input("x"), &ctx());
    assert_eq!(action, A::InsertWithoutMarkedText(format!("{acute}x")));
    assert_eq!(callback, C::Transition(InputState::None));
}

#[test]
fn unicode_input_accumulates_hex_only() {
    let state = InputState::UnicodeInput("30".into());
    assert_eq!(
        state.event(&input("4g2"), &ctx()),
        (
            A::AppendToUnicodeInput("42".into()),
            C::Transition(InputState::UnicodeInput("3042".into()))
        )
    );
    assert_eq!(
        state.event(&UserAction::Enter, &ctx()),
        (A::SubmitUnicodeInput("30".into()), C::Transition(InputState::None))
    );
    let empty = InputState::UnicodeInput(String::new());
    assert_eq!(
        empty.event(&UserAction::Backspace, &ctx()),
        (A::CancelUnicodeInput, C::Transition(InputState::None))
    );
    assert_eq!(
        state.event(&UserAction::Backspace, &ctx()),
        (
            A::RemoveLastUnicodeInput,
            C::Transition(InputState::UnicodeInput("3".into()))
        )
    );
}

#[test]
fn reconvert_never_changes_mode() {
    for state in [
        InputState::None,
        InputState::Composing,
        InputState::Previewing,
        InputState::Selecting,
        InputState::ReplaceSuggestion,
    ] {
        assert_eq!(
            state.event(&UserAction::ReconvertCommittedText, &ctx()),
            (A::ReconvertCommittedText, C::Fallthrough)
        );
    }
}

#[test]
fn command_always_passes_through() {
    let command = with_mods(Modifiers::COMMAND);
    for action in [input("c"), UserAction::Enter, UserAction::Backspace] {
        assert_eq!(
            InputState::Composing.event(&action, &command),
            (A::Fallthrough, C::Fallthrough)
        );
    }
}

#[test]
fn option_allow_list() {
    let option = with_mods(Modifiers::OPTION);
    // Typed symbols still go to the buffer.
    assert_eq!(
        InputState::Composing.event(&input("…"), &option).0,
        A::AppendPieceToMarkedText(vec![InputPiece::key('…')])
    );
    // Navigation is swallowed in rich modes and passed on otherwise.
    let down = UserAction::Navigation(Navigation::Down);
    assert_eq!(InputState::Selecting.event(&down, &option), (A::Consume, C::Fallthrough));
    assert_eq!(InputState::None.event(&down, &option), (A::Fallthrough, C::Fallthrough));
    assert_eq!(
        InputState::Selecting.event(&UserAction::Forget, &option),
        (A::Fallthrough, C::Fallthrough)
    );
}

#[test]
fn suggest_requires_backend() {
    let off = TransitionContext {
        suggestion: false,
        ..ctx()
    };
    assert_eq!(
        InputState::Composing.event(&UserAction::Suggest, &off),
        (A::Fallthrough, C::Fallthrough)
    );
    assert_eq!(
        InputState::Composing.event(&UserAction::Suggest, &ctx()),
        (A::RequestReplaceSuggestion, C::Transition(InputState::ReplaceSuggestion))
    );
    assert_eq!(
        InputState::None.event(&UserAction::Suggest, &ctx()),
        (A::RequestPredictiveSuggestion, C::Transition(InputState::ReplaceSuggestion))
    );
}
