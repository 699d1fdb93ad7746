use tsuzuri_core::candidate::Candidate;
use tsuzuri_core::engine::ConversionEngine;
use tsuzuri_core::unicode::to_hiragana;

use super::SegmentsManager;

pub const PREDICTION_LIMIT: usize = 3;

/// An inline continuation: show `display_text`, type `append_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionCandidate {
    pub display_text: String,
    pub append_text: String,
}

/// Predictions whose reading strictly extends `target`.
///
/// One trailing ASCII letter is treated as unfinished romaji and ignored.
/// At least two characters must remain.
pub fn prediction_candidates(target: &str, predictions: &[Candidate], limit: usize) -> Vec<PredictionCandidate> {
    let mut prefix = target;
    if let Some(last) = prefix.chars().last().filter(char::is_ascii_alphabetic) {
        prefix = &prefix[..prefix.len() - last.len_utf8()];
    }
    if prefix.chars().count() < 2 {
        return Vec::new();
    }
    let prefix = to_hiragana(prefix);

    predictions
        .iter()
        .filter_map(|candidate| {
            let reading = to_hiragana(&candidate.reading());
            let append = reading.strip_prefix(prefix.as_str())?;
            (!append.is_empty()).then(|| PredictionCandidate {
                display_text: candidate.text.clone(),
                append_text: append.to_string(),
            })
        })
        .take(limit)
        .collect()
}

impl<E: ConversionEngine> SegmentsManager<E> {
    pub fn request_prediction_candidates(&self) -> Vec<PredictionCandidate> {
        if !self.settings.debug.predictive_typing {
            return Vec::new();
        }
        match &self.raw {
            Some(raw) => prediction_candidates(
                self.text.convert_target(),
                &raw.prediction_results,
                PREDICTION_LIMIT,
            ),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsuzuri_core::candidate::DictEntry;
    use tsuzuri_core::composing::ComposingCount;

    fn source(text: &str, ruby: &str) -> Candidate {
        Candidate::from_entries(
            vec![DictEntry::proper_noun(text, ruby, 0.0)],
            ComposingCount::SurfaceCount(ruby.chars().count()),
        )
    }

    #[test]
    fn katakana_readings_match_hiragana_target() {
        let found = prediction_candidates("きょう", &[source("今日は", "キョウハ")], PREDICTION_LIMIT);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].append_text, "は");
    }

    #[test]
    fn empty_target_has_no_predictions() {
        assert!(prediction_candidates("", &[source("か", "か")], PREDICTION_LIMIT).is_empty());
    }

    #[test]
    fn only_one_trailing_letter_is_dropped() {
        let found = prediction_candidates("かなab", &[source("候補", "かなみ")], PREDICTION_LIMIT);
        assert!(found.is_empty());
    }
}
