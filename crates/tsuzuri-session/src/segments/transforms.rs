use tsuzuri_core::candidate::Candidate;
use tsuzuri_core::composing::ComposingCount;
use tsuzuri_core::engine::ConversionEngine;
use tsuzuri_core::unicode::{
    to_fullwidth_roman, to_halfwidth_katakana, to_halfwidth_roman, to_hiragana, to_katakana,
};

use super::SegmentsManager;
use crate::input_state::InputState;

/// Synthetic candidates derived from the reading or the raw roman input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transliteration {
    /// The typed roman string as is.
    Roman,
    FullWidthRoman,
    HalfWidthRoman,
    HalfWidthKatakana,
    Katakana,
    Hiragana,
}

impl Transliteration {
    /// Overlay order, top to bottom once fully revealed.
    const OVERLAY: [(Transliteration, &'static str); 5] = [
        (Transliteration::Roman, "英数"),
        (Transliteration::FullWidthRoman, "全角英数"),
        (Transliteration::HalfWidthKatakana, "半角カナ"),
        (Transliteration::Katakana, "カタカナ"),
        (Transliteration::Hiragana, "ひらがな"),
    ];

    fn apply(self, s: &str) -> String {
        match self {
            Transliteration::Roman => s.to_string(),
            Transliteration::FullWidthRoman => to_fullwidth_roman(s),
            Transliteration::HalfWidthRoman => to_halfwidth_roman(s),
            Transliteration::HalfWidthKatakana => to_halfwidth_katakana(s),
            Transliteration::Katakana => to_katakana(s),
            Transliteration::Hiragana => to_hiragana(s),
        }
    }

    pub fn uses_roman(self) -> bool {
        matches!(
            self,
            Transliteration::Roman | Transliteration::FullWidthRoman | Transliteration::HalfWidthRoman
        )
    }
}

impl<E: ConversionEngine> SegmentsManager<E> {
    pub fn transliterated_candidate(&self, state: &InputState, kind: Transliteration) -> Candidate {
        if kind.uses_roman() {
            self.modified_roman_candidate(state, |s| kind.apply(s))
        } else {
            self.modified_ruby_candidate(state, |s| kind.apply(s))
        }
    }

    /// A candidate from the selected candidate's reading while selecting,
    /// otherwise from the whole convert target.
    pub fn modified_ruby_candidate(
        &self,
        state: &InputState,
        transform: impl FnOnce(&str) -> String,
    ) -> Candidate {
        let selected = match state {
            InputState::Selecting => self.selected_candidate().map(|c| c.reading()),
            _ => None,
        };
        let (ruby, count) = match selected {
            Some(ruby) => {
                let count = ComposingCount::SurfaceCount(ruby.chars().count());
                (ruby, count)
            }
            None => (
                self.text.convert_target().to_string(),
                ComposingCount::InputCount(self.text.input().len()),
            ),
        };
        Candidate::literal(transform(&ruby), ruby, count)
    }

    /// A candidate from the raw typed string, up to the cursor while
    /// selecting.
    pub fn modified_roman_candidate(
        &self,
        state: &InputState,
        transform: impl FnOnce(&str) -> String,
    ) -> Candidate {
        let target = match state {
            InputState::Selecting => self.text.prefix_to_cursor(),
            _ => self.text.clone(),
        };
        let input = target.input_string(false);
        // The prefix may have been re-split, so count what it renders to.
        let count = ComposingCount::SurfaceCount(target.len());
        Candidate::literal(transform(&input), input, count)
    }

    pub(super) fn additional_candidates(&self) -> Vec<(Candidate, &'static str)> {
        Transliteration::OVERLAY
            .iter()
            .map(|&(kind, note)| (self.transliterated_candidate(&InputState::Selecting, kind), note))
            .collect()
    }
}
