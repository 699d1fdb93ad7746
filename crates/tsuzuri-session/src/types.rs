use tsuzuri_core::composing::{input_string, InputPiece, Modifiers};

// macOS virtual key codes
pub mod key {
    pub const ENTER: u16 = 0x24;
    pub const NUMPAD_ENTER: u16 = 0x4C;
    pub const TAB: u16 = 48;
    pub const SPACE: u16 = 49;
    pub const BACKSPACE: u16 = 51;
    pub const ESCAPE: u16 = 53;
    pub const F6: u16 = 97;
    pub const F7: u16 = 98;
    pub const F8: u16 = 100;
    pub const F9: u16 = 101;
    pub const F10: u16 = 109;
    pub const EISU: u16 = 102;
    pub const KANA: u16 = 104;
    pub const LEFT: u16 = 123;
    pub const RIGHT: u16 = 124;
    pub const DOWN: u16 = 125;
    pub const UP: u16 = 126;
    pub const NUMPAD_SLASH: u16 = 0x4B;
    pub const NUMPAD_COMMA: u16 = 0x5F;
    pub const NUMPAD_PERIOD: u16 = 0x41;
    /// Numpad home/end/page/forward-delete/clear; deliberately unsupported.
    pub const NUMPAD_UNSUPPORTED: [u16; 6] = [0x73, 0x77, 0x74, 0x79, 0x75, 0x47];
    pub const DIGIT_ZERO: u16 = 29;
    /// Digit-row codes for 1..9 then 0.
    pub const DIGITS: [u16; 10] = [18, 19, 20, 21, 23, 22, 26, 28, 25, 29];
    /// Any code not otherwise mapped; used when only characters matter.
    pub const ANSI_A: u16 = 0x00;
}

/// Logical characters AppKit reports for the navigation function keys.
pub mod function_char {
    pub const HOME: char = '\u{F729}';
    pub const END: char = '\u{F72B}';
    pub const PAGE_UP: char = '\u{F72C}';
    pub const PAGE_DOWN: char = '\u{F72D}';
}

/// A raw key-down event as the host delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_code: u16,
    /// The text the key produced with modifiers applied.
    pub characters: Option<String>,
    /// The text the key would produce without modifiers (shift aside).
    pub characters_ignoring_modifiers: Option<String>,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// An event whose produced and logical characters are the same.
    pub fn new(key_code: u16, text: &str, modifiers: Modifiers) -> Self {
        KeyEvent {
            key_code,
            characters: Some(text.to_string()),
            characters_ignoring_modifiers: Some(text.to_string()),
            modifiers,
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(key::ANSI_A, text, Modifiers::NONE)
    }

    /// A key identified only by its physical code.
    pub fn code(key_code: u16, modifiers: Modifiers) -> Self {
        KeyEvent {
            key_code,
            characters: None,
            characters_ignoring_modifiers: None,
            modifiers,
        }
    }

    pub fn with_logical(mut self, logical: &str) -> Self {
        self.characters_ignoring_modifiers = Some(logical.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputLanguage {
    Japanese,
    English,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
}

/// The F6..F10 transliteration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Zero,
    /// Shift+0 on JIS keyboards, which types a literal 0 rather than a symbol.
    ShiftZero,
}

impl Number {
    pub const ALL: [Number; 11] = [
        Number::One,
        Number::Two,
        Number::Three,
        Number::Four,
        Number::Five,
        Number::Six,
        Number::Seven,
        Number::Eight,
        Number::Nine,
        Number::Zero,
        Number::ShiftZero,
    ];

    pub fn value(self) -> u8 {
        match self {
            Number::One => 1,
            Number::Two => 2,
            Number::Three => 3,
            Number::Four => 4,
            Number::Five => 5,
            Number::Six => 6,
            Number::Seven => 7,
            Number::Eight => 8,
            Number::Nine => 9,
            Number::Zero | Number::ShiftZero => 0,
        }
    }

    pub fn digit(self) -> char {
        char::from(b'0' + self.value())
    }

    pub fn input_piece(self) -> InputPiece {
        match self {
            Number::ShiftZero => InputPiece::Key {
                intention: Some('0'),
                input: '0',
                modifiers: Modifiers::SHIFT,
            },
            n => InputPiece::Character(n.digit()),
        }
    }

    pub fn input_string(self) -> String {
        self.digit().to_string()
    }
}

/// What a keystroke means, independent of the current mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Input(Vec<InputPiece>),
    Backspace,
    Enter,
    Space { prefers_full_width: bool },
    Escape,
    Tab,
    /// 英数: switch to alphabetic input.
    Eisu,
    /// かな: switch to Japanese input.
    Kana,
    Navigation(Navigation),
    Function(Function),
    Number(Number),
    EditSegment(isize),
    Suggest,
    Forget,
    TransformSelectedText,
    /// A spacing diacritic waiting for the next letter.
    DeadKey(char),
    StartUnicodeInput,
    ReconvertCommittedText,
    Unknown,
}

impl UserAction {
    pub fn input_string(pieces: &[InputPiece], prefer_intention: bool) -> String {
        input_string(pieces.iter().copied(), prefer_intention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_pieces() {
        assert_eq!(Number::Seven.input_piece(), InputPiece::Character('7'));
        assert_eq!(Number::Zero.input_string(), "0");
        assert_eq!(
            Number::ShiftZero.input_piece(),
            InputPiece::Key {
                intention: Some('0'),
                input: '0',
                modifiers: Modifiers::SHIFT
            }
        );
        assert_eq!(Number::ShiftZero.value(), 0);
        assert_eq!(
            Number::ALL.iter().map(|n| n.digit()).collect::<String>(),
            "12345678900"
        );
    }
}
