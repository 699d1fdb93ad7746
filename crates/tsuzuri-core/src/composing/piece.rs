use std::fmt;

/// Modifier keys held while a key was typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub option: bool,
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        option: false,
        command: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
    pub const CONTROL: Modifiers = Modifiers {
        control: true,
        ..Modifiers::NONE
    };
    pub const OPTION: Modifiers = Modifiers {
        option: true,
        ..Modifiers::NONE
    };
    pub const COMMAND: Modifiers = Modifiers {
        command: true,
        ..Modifiers::NONE
    };

    pub fn is_empty(self) -> bool {
        self == Modifiers::NONE
    }

    pub fn union(self, other: Modifiers) -> Modifiers {
        Modifiers {
            shift: self.shift || other.shift,
            control: self.control || other.control,
            option: self.option || other.option,
            command: self.command || other.command,
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (held, name) in [
            (self.control, "ctrl+"),
            (self.shift, "shift+"),
            (self.option, "option+"),
            (self.command, "cmd+"),
        ] {
            if held {
                f.write_str(name)?;
            }
        }
        Ok(())
    }
}

/// One typed unit of the composing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPiece {
    Character(char),
    /// A key whose semantic meaning (`intention`, e.g. a full-width
    /// punctuation mark) may differ from the raw character it produced.
    Key {
        intention: Option<char>,
        input: char,
        modifiers: Modifiers,
    },
    CompositionSeparator,
}

impl InputPiece {
    pub fn key(input: char) -> InputPiece {
        InputPiece::Key {
            intention: None,
            input,
            modifiers: Modifiers::NONE,
        }
    }

    /// The character this piece contributes to a raw input string.
    pub fn input_char(&self, prefer_intention: bool) -> Option<char> {
        match *self {
            InputPiece::Character(c) => Some(c),
            InputPiece::Key {
                intention, input, ..
            } => Some(if prefer_intention {
                intention.unwrap_or(input)
            } else {
                input
            }),
            InputPiece::CompositionSeparator => None,
        }
    }
}

/// Join pieces back into the string that was typed.
pub fn input_string(pieces: impl IntoIterator<Item = InputPiece>, prefer_intention: bool) -> String {
    pieces
        .into_iter()
        .filter_map(|p| p.input_char(prefer_intention))
        .collect()
}

/// How a piece is rendered into the convert target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputStyle {
    /// Rendered literally.
    Direct,
    /// Fed through the romaji table.
    Roman2Kana,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_string_prefers_intention_when_asked() {
        let pieces = [
            InputPiece::key('a'),
            InputPiece::Key {
                intention: Some('、'),
                input: ',',
                modifiers: Modifiers::NONE,
            },
            InputPiece::CompositionSeparator,
            InputPiece::Character('1'),
        ];
        assert_eq!(input_string(pieces, true), "a、1");
        assert_eq!(input_string(pieces, false), "a,1");
    }

    #[test]
    fn modifiers_display_and_union() {
        let m = Modifiers::CONTROL.union(Modifiers::SHIFT);
        assert_eq!(m.to_string(), "ctrl+shift+");
        assert!(Modifiers::NONE.is_empty());
        assert!(!m.is_empty());
    }
}
