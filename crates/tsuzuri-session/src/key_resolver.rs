//! Turns a raw key event into a [`UserAction`].
//!
//! Resolution order:
//! 1. logical key + exact modifier set (control table, yen/backslash, option punctuation)
//! 2. logical navigation function keys (page up/down, home, end)
//! 3. physical key code
//! 4. printable text as input, anything else `Unknown`
//!
//! The resolver never fails; unmapped events become [`UserAction::Unknown`].

use tsuzuri_core::composing::{InputPiece, Modifiers};
use tsuzuri_core::diacritic::dead_key_diacritic;
use tsuzuri_core::settings::{PunctuationStyle, Settings};
use tsuzuri_core::unicode::h2z;

use crate::types::{
    function_char, key, Function, InputLanguage, KeyEvent, Navigation, Number, UserAction,
};

const CONTROL_SHIFT: Modifiers = Modifiers {
    control: true,
    shift: true,
    option: false,
    command: false,
};
const SHIFT_OPTION: Modifiers = Modifiers {
    shift: true,
    option: true,
    control: false,
    command: false,
};

/// The settings the resolver reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    pub punctuation_style: PunctuationStyle,
    /// Type `\` (instead of `¥`) on the yen/backslash key.
    pub type_back_slash: bool,
    /// Type a half-width space on plain space.
    pub type_half_space: bool,
    /// Pass ASCII symbols through untouched for a custom romaji table.
    pub preserve_ascii_symbol_keys: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            punctuation_style: PunctuationStyle::KutenAndToten,
            type_back_slash: false,
            type_half_space: false,
            preserve_ascii_symbol_keys: false,
        }
    }
}

impl ResolverConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        ResolverConfig {
            punctuation_style: settings.input.punctuation_style,
            type_back_slash: settings.input.type_back_slash,
            type_half_space: settings.input.type_half_space,
            preserve_ascii_symbol_keys: settings.preserve_ascii_symbol_keys(),
        }
    }
}

/// The full-width intention of `c` typed in Japanese mode.
///
/// Comma and period follow the punctuation style; `invert` swaps each to
/// its other form (option+, / option+.).
pub fn intention(c: char, invert: bool, style: PunctuationStyle) -> Option<char> {
    match c {
        ',' => {
            let normal = style.comma();
            Some(match (invert, normal) {
                (false, n) => n,
                (true, '，') => '、',
                (true, _) => '，',
            })
        }
        '.' => {
            let normal = style.period();
            Some(match (invert, normal) {
                (false, n) => n,
                (true, '．') => '。',
                (true, _) => '．',
            })
        }
        c => h2z(c),
    }
}

fn bypasses_intention(c: char, preserve_ascii_symbol_keys: bool) -> bool {
    preserve_ascii_symbol_keys && c.is_ascii_punctuation()
}

/// Letters, digits, symbols and punctuation; no whitespace, controls or
/// private-use function-key characters.
fn is_printable(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(|c| {
            c.is_alphanumeric()
                || c.is_ascii_punctuation()
                || (!c.is_ascii()
                    && !c.is_whitespace()
                    && !c.is_control()
                    && !('\u{E000}'..='\u{F8FF}').contains(&c))
        })
}

pub struct KeyResolver {
    pub config: ResolverConfig,
}

impl KeyResolver {
    pub fn new(config: ResolverConfig) -> Self {
        KeyResolver { config }
    }

    fn key_map(&self, text: &str, language: InputLanguage, invert: bool) -> Vec<InputPiece> {
        match language {
            InputLanguage::English => text.chars().map(InputPiece::Character).collect(),
            InputLanguage::Japanese => text
                .chars()
                .map(|c| {
                    let intention = if bypasses_intention(
                        c,
                        self.config.preserve_ascii_symbol_keys && !invert,
                    ) {
                        None
                    } else {
                        intention(c, invert, self.config.punctuation_style)
                    };
                    InputPiece::Key {
                        intention,
                        input: c,
                        modifiers: Modifiers::NONE,
                    }
                })
                .collect(),
        }
    }

    fn input(&self, text: &str, language: InputLanguage) -> UserAction {
        UserAction::Input(self.key_map(text, language, false))
    }

    fn resolve_logical(
        &self,
        logical: &str,
        modifiers: Modifiers,
        language: InputLanguage,
    ) -> Option<UserAction> {
        let mut chars = logical.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return None,
        };
        let japanese = language == InputLanguage::Japanese;

        if modifiers == Modifiers::OPTION && language == InputLanguage::English {
            if let Some(diacritic) = dead_key_diacritic(single) {
                return Some(UserAction::DeadKey(diacritic));
            }
        }

        let action = match (single, modifiers) {
            ('h', Modifiers::CONTROL) => UserAction::Backspace,
            ('p', Modifiers::CONTROL) => UserAction::Navigation(Navigation::Up),
            ('m', Modifiers::CONTROL) => UserAction::Enter,
            ('n', Modifiers::CONTROL) => UserAction::Navigation(Navigation::Down),
            ('f', Modifiers::CONTROL) => UserAction::Navigation(Navigation::Right),
            ('i', Modifiers::CONTROL) => UserAction::EditSegment(-1),
            ('o', Modifiers::CONTROL) => UserAction::EditSegment(1),
            ('l', Modifiers::CONTROL) => UserAction::Function(Function::Nine),
            ('j', Modifiers::CONTROL) => UserAction::Function(Function::Six),
            ('k', Modifiers::CONTROL) => UserAction::Function(Function::Seven),
            (';', Modifiers::CONTROL) => UserAction::Function(Function::Eight),
            (':' | '\'', Modifiers::CONTROL) => UserAction::Function(Function::Ten),
            ('s', Modifiers::CONTROL) => UserAction::Suggest,
            ('u', CONTROL_SHIFT) => UserAction::StartUnicodeInput,
            ('r', CONTROL_SHIFT) => UserAction::ReconvertCommittedText,

            ('¥' | '\\', Modifiers::SHIFT | SHIFT_OPTION) => self.input("|", language),
            ('¥' | '\\', Modifiers::NONE) => {
                self.input(if self.config.type_back_slash { "\\" } else { "¥" }, language)
            }
            ('¥' | '\\', Modifiers::OPTION) => {
                self.input(if self.config.type_back_slash { "¥" } else { "\\" }, language)
            }

            ('/', SHIFT_OPTION) if japanese => self.input("…", language),
            ('/', Modifiers::SHIFT) if japanese => self.input("?", language),
            ('/', Modifiers::OPTION) if japanese => self.input("／", language),
            ('[', Modifiers::OPTION) if japanese => self.input("［", language),
            ('[', SHIFT_OPTION) if japanese => self.input("｛", language),
            (']', Modifiers::OPTION) if japanese => self.input("］", language),
            (']', SHIFT_OPTION) if japanese => self.input("｝", language),
            (',' | '.', Modifiers::OPTION) if japanese => {
                UserAction::Input(self.key_map(&single.to_string(), language, true))
            }

            (function_char::PAGE_UP, _) => UserAction::Navigation(Navigation::PageUp),
            (function_char::PAGE_DOWN, _) => UserAction::Navigation(Navigation::PageDown),
            (function_char::HOME, _) => UserAction::Navigation(Navigation::Home),
            (function_char::END, _) => UserAction::Navigation(Navigation::End),
            _ => return None,
        };
        Some(action)
    }

    fn resolve_code(&self, event: &KeyEvent) -> Option<UserAction> {
        let m = event.modifiers;
        let action = match event.key_code {
            key::ENTER | key::NUMPAD_ENTER => UserAction::Enter,
            key::TAB => UserAction::Tab,
            key::SPACE => UserAction::Space {
                prefers_full_width: self.config.type_half_space == m.shift,
            },
            key::BACKSPACE if m.control => UserAction::Forget,
            key::BACKSPACE => UserAction::Backspace,
            key::ESCAPE => UserAction::Escape,
            key::F6 => UserAction::Function(Function::Six),
            key::F7 => UserAction::Function(Function::Seven),
            key::F8 => UserAction::Function(Function::Eight),
            key::F9 => UserAction::Function(Function::Nine),
            key::F10 => UserAction::Function(Function::Ten),
            key::EISU => UserAction::Eisu,
            key::KANA => UserAction::Kana,
            key::LEFT => UserAction::Navigation(Navigation::Left),
            key::RIGHT => UserAction::Navigation(Navigation::Right),
            key::DOWN => UserAction::Navigation(Navigation::Down),
            key::UP => UserAction::Navigation(Navigation::Up),
            key::NUMPAD_SLASH => UserAction::Input(vec![InputPiece::Character('/')]),
            key::NUMPAD_COMMA => UserAction::Input(vec![InputPiece::Character(',')]),
            key::NUMPAD_PERIOD => UserAction::Input(vec![InputPiece::Character('.')]),
            code if key::NUMPAD_UNSUPPORTED.contains(&code) => UserAction::Unknown,
            code => {
                let slot = key::DIGITS.iter().position(|&d| d == code)?;
                if !m.shift && !m.option {
                    UserAction::Number(Number::ALL[slot])
                } else if code == key::DIGIT_ZERO
                    && m.shift
                    && event.characters.as_deref() == Some("0")
                {
                    UserAction::Number(Number::ShiftZero)
                } else {
                    return None;
                }
            }
        };
        Some(action)
    }

    pub fn resolve(&self, event: &KeyEvent, language: InputLanguage) -> UserAction {
        if let Some(logical) = event.characters_ignoring_modifiers.as_deref() {
            let logical = logical.to_lowercase();
            if let Some(action) = self.resolve_logical(&logical, event.modifiers, language) {
                return action;
            }
        }
        if let Some(action) = self.resolve_code(event) {
            return action;
        }
        match event.characters.as_deref() {
            Some(text) if is_printable(text) => self.input(text, language),
            _ => UserAction::Unknown,
        }
    }
}
