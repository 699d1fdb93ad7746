//! Conversion candidates and the dictionary entries behind them.

use crate::composing::ComposingCount;

/// Left/right context id used for proper nouns (user words, shortcuts).
pub const PROPER_NOUN_CID: u16 = 1288;
/// Meaning id for "general".
pub const GENERAL_MID: u16 = 501;

/// One dictionary word with its reading in katakana.
#[derive(Debug, Clone, PartialEq)]
pub struct DictEntry {
    pub word: String,
    pub ruby: String,
    pub cid: u16,
    pub mid: u16,
    pub value: f32,
}

impl DictEntry {
    pub fn proper_noun(word: impl Into<String>, ruby: impl Into<String>, value: f32) -> Self {
        DictEntry {
            word: word.into(),
            ruby: ruby.into(),
            cid: PROPER_NOUN_CID,
            mid: GENERAL_MID,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub value: f32,
    pub composing_count: ComposingCount,
    pub last_mid: u16,
    pub data: Vec<DictEntry>,
}

impl Candidate {
    /// Build a candidate from consecutive entries.
    pub fn from_entries(data: Vec<DictEntry>, composing_count: ComposingCount) -> Self {
        Candidate {
            text: data.iter().map(|e| e.word.as_str()).collect(),
            value: data.iter().map(|e| e.value).sum(),
            composing_count,
            last_mid: data.last().map_or(0, |e| e.mid),
            data,
        }
    }

    /// A synthetic single-entry candidate, used for transliterations.
    pub fn literal(text: String, ruby: String, composing_count: ComposingCount) -> Self {
        Candidate {
            data: vec![DictEntry::proper_noun(text.clone(), ruby, 0.0)],
            text,
            value: 0.0,
            composing_count,
            last_mid: 0,
        }
    }

    /// A line of debug output shown in the debug candidate window.
    pub fn debug_message(message: &str) -> Self {
        Candidate {
            text: message.replace('\n', "\\n"),
            value: 0.0,
            composing_count: ComposingCount::SurfaceCount(0),
            last_mid: 0,
            data: Vec::new(),
        }
    }

    /// The joined reading of all entries.
    pub fn reading(&self) -> String {
        self.data.iter().map(|e| e.ruby.as_str()).collect()
    }
}
