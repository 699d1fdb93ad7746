//! Textual key specs such as `ctrl+shift+r`, `space` or `k`.

use tsuzuri_engine::tsuzuri_core::composing::Modifiers;
use tsuzuri_engine::tsuzuri_session::types::{function_char, key};
use tsuzuri_engine::KeyEvent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeySpecError {
    #[error("empty key spec")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// Named keys and the code each maps to.
const NAMED: &[(&str, u16)] = &[
    ("enter", key::ENTER),
    ("space", key::SPACE),
    ("tab", key::TAB),
    ("backspace", key::BACKSPACE),
    ("escape", key::ESCAPE),
    ("left", key::LEFT),
    ("right", key::RIGHT),
    ("up", key::UP),
    ("down", key::DOWN),
    ("f6", key::F6),
    ("f7", key::F7),
    ("f8", key::F8),
    ("f9", key::F9),
    ("f10", key::F10),
    ("eisu", key::EISU),
    ("kana", key::KANA),
];

/// Navigation keys AppKit reports as private-use characters.
const FUNCTION_CHARS: &[(&str, char)] = &[
    ("pageup", function_char::PAGE_UP),
    ("pagedown", function_char::PAGE_DOWN),
    ("home", function_char::HOME),
    ("end", function_char::END),
];

/// Parse `[ctrl+][shift+][option+][cmd+]<name>`.
///
/// A single character becomes a text key; digits also carry their
/// digit-row code so they resolve as candidate numbers.
pub fn parse_key_spec(spec: &str) -> Result<KeyEvent, KeySpecError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(KeySpecError::Empty);
    }
    // A bare `+` is a key, not a separator.
    let (prefix, name) = match spec.rsplit_once('+') {
        Some((prefix, "")) => (prefix.strip_suffix('+').unwrap_or(""), "+"),
        Some((prefix, name)) => (prefix, name),
        None => ("", spec),
    };

    let mut modifiers = Modifiers::NONE;
    for part in prefix.split('+').filter(|p| !p.is_empty()) {
        let flag = match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Modifiers::CONTROL,
            "shift" => Modifiers::SHIFT,
            "option" | "alt" => Modifiers::OPTION,
            "cmd" | "command" => Modifiers::COMMAND,
            _ => return Err(KeySpecError::UnknownModifier(part.to_string())),
        };
        modifiers = modifiers.union(flag);
    }

    let lower = name.to_ascii_lowercase();
    if let Some(&(_, code)) = NAMED.iter().find(|(n, _)| *n == lower) {
        return Ok(KeyEvent::code(code, modifiers));
    }
    if let Some(&(_, c)) = FUNCTION_CHARS.iter().find(|(n, _)| *n == lower) {
        return Ok(KeyEvent::new(key::ANSI_A, &c.to_string(), modifiers));
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            let code = c
                .to_digit(10)
                .map(|d| key::DIGITS[(d as usize + 9) % 10])
                .unwrap_or(key::ANSI_A);
            Ok(KeyEvent::new(code, name, modifiers))
        }
        _ => Err(KeySpecError::UnknownKey(name.to_string())),
    }
}
