//! Dead-key diacritics: option+e then a gives á.

use unicode_normalization::char::compose;

struct DeadKey {
    key: char,
    spacing: char,
    combining: char,
}

const DEAD_KEYS: &[DeadKey] = &[
    DeadKey {
        key: 'e',
        spacing: '´',
        combining: '\u{301}',
    },
    DeadKey {
        key: '`',
        spacing: '`',
        combining: '\u{300}',
    },
    DeadKey {
        key: 'i',
        spacing: 'ˆ',
        combining: '\u{302}',
    },
    DeadKey {
        key: 'u',
        spacing: '¨',
        combining: '\u{308}',
    },
    DeadKey {
        key: 'n',
        spacing: '˜',
        combining: '\u{303}',
    },
];

/// The spacing diacritic for a dead key pressed with option, if any.
pub fn dead_key_diacritic(key: char) -> Option<char> {
    DEAD_KEYS.iter().find(|d| d.key == key).map(|d| d.spacing)
}

/// Combine `diacritic` with the first character of `text` by canonical
/// composition. Returns `None` when no precomposed character exists.
pub fn attach(diacritic: char, text: &str) -> Option<String> {
    let combining = DEAD_KEYS
        .iter()
        .find(|d| d.spacing == diacritic)?
        .combining;
    let mut chars = text.chars();
    let composed = compose(chars.next()?, combining)?;
    let mut out = String::with_capacity(text.len() + 2);
    out.push(composed);
    out.extend(chars);
    Some(out)
}

/// `attach`, falling back to the diacritic followed by the text.
pub fn attach_or_literal(diacritic: char, text: &str) -> String {
    attach(diacritic, text).unwrap_or_else(|| {
        let mut out = String::with_capacity(text.len() + 2);
        out.push(diacritic);
        out.push_str(text);
        out
    })
}
