//! Kana and width transforms for Japanese text.

use unicode_normalization::char::decompose_canonical;

/// Check the full Hiragana block (U+3040..U+309F).
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Check the full Katakana block (U+30A0..U+30FF). Includes ー.
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

const KANA_OFFSET: u32 = 0x60;

/// Hiragana to katakana. Everything else (ー, ASCII, kanji) passes through.
pub fn to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'ぁ'..='ゖ' | 'ゝ' | 'ゞ' => char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Katakana to hiragana. Characters without a hiragana form pass through.
pub fn to_hiragana(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'ァ'..='ヶ' | 'ヽ' | 'ヾ' => char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

const FULL_KANA: &str = "ァアィイゥウェエォオカキクケコサシスセソタチッツテトナニヌネノハヒフヘホマミムメモャヤュユョヨラリルレロワヲンヮヵヶー・。「」、゛゜\u{3099}\u{309A}";
const HALF_KANA: &str = "ｧｱｨｲｩｳｪｴｫｵｶｷｸｹｺｻｼｽｾｿﾀﾁｯﾂﾃﾄﾅﾆﾇﾈﾉﾊﾋﾌﾍﾎﾏﾐﾑﾒﾓｬﾔｭﾕｮﾖﾗﾘﾙﾚﾛﾜｦﾝﾜｶｹｰ･｡｢｣､ﾞﾟﾞﾟ";

fn halfwidth_kana(c: char) -> Option<char> {
    let i = FULL_KANA.chars().position(|f| f == c)?;
    HALF_KANA.chars().nth(i)
}

/// Kana to half-width katakana. Voiced and semi-voiced kana split into the
/// base letter followed by ﾞ or ﾟ.
pub fn to_halfwidth_katakana(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in to_katakana(s).chars() {
        if !is_katakana(c) && halfwidth_kana(c).is_none() {
            out.push(c);
            continue;
        }
        decompose_canonical(c, |d| out.push(halfwidth_kana(d).unwrap_or(d)));
    }
    out
}

/// ASCII to full-width forms. The space becomes U+3000.
pub fn to_fullwidth_roman(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => '\u{3000}',
            '!'..='~' => char::from_u32(c as u32 + 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Full-width forms back to ASCII.
pub fn to_halfwidth_roman(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '！'..='～' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Full-width intention of an ASCII symbol typed in Japanese mode.
/// Letters, digits and non-ASCII characters have none.
pub fn h2z(c: char) -> Option<char> {
    match c {
        '-' => Some('ー'),
        '[' => Some('「'),
        ']' => Some('」'),
        '~' => Some('〜'),
        '/' => Some('・'),
        ',' => Some('、'),
        '.' => Some('。'),
        c if c.is_ascii_punctuation() => char::from_u32(c as u32 + 0xFEE0),
        _ => None,
    }
}
