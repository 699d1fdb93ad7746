use std::collections::HashSet;

use tracing::debug;

use super::{ConversionEngine, ConversionResult, ConvertRequestOptions, PredictionMode};
use crate::candidate::{Candidate, DictEntry};
use crate::composing::{ComposingCount, ComposingText};
use crate::settings::LearningType;
use crate::unicode::{to_hiragana, to_katakana};

/// Alternative forms for punctuation readings.
static PUNCTUATION_ALTERNATIVES: &[(&str, &[&str])] = &[
    ("。", &["．", "."]),
    ("、", &["，", ","]),
    ("？", &["?"]),
    ("！", &["!"]),
    ("「", &["｢", "["]),
    ("」", &["｣", "]"]),
    ("・", &["／", "/"]),
    ("〜", &["~"]),
];

const LEARNED_BONUS: f32 = 5.0;
const FALLBACK_VALUE: f32 = -30.0;
const MAX_PREDICTIONS: usize = 10;

/// A dictionary-lookup engine.
///
/// Readings are matched exactly against the katakana form of the request.
/// There is no segmentation beyond longest-prefix first clauses.
#[derive(Debug, Default)]
pub struct DictionaryEngine {
    static_entries: Vec<DictEntry>,
    dynamic_entries: Vec<DictEntry>,
    shortcuts: Vec<DictEntry>,
    pending_learning: Vec<DictEntry>,
    learned: Vec<DictEntry>,
    completed: Option<Candidate>,
    learning: Option<LearningType>,
}

impl DictionaryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with a fixed word list; readings may be hiragana.
    pub fn with_entries(entries: impl IntoIterator<Item = DictEntry>) -> Self {
        DictionaryEngine {
            static_entries: entries
                .into_iter()
                .map(|mut e| {
                    e.ruby = to_katakana(&e.ruby);
                    e
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Words remembered by committed learning.
    pub fn learned(&self) -> &[DictEntry] {
        &self.learned
    }

    pub fn completed(&self) -> Option<&Candidate> {
        self.completed.as_ref()
    }

    fn entries(&self) -> impl Iterator<Item = &DictEntry> {
        self.static_entries
            .iter()
            .chain(&self.dynamic_entries)
            .chain(&self.shortcuts)
    }

    fn score(&self, entry: &DictEntry) -> f32 {
        let uses_memory = !matches!(self.learning, Some(LearningType::Nothing));
        let learned = self
            .learned
            .iter()
            .any(|l| l.word == entry.word && l.ruby == entry.ruby);
        if uses_memory && learned {
            entry.value + LEARNED_BONUS
        } else {
            entry.value
        }
    }

    /// Candidates for entries whose reading satisfies `matches`, best first,
    /// one per surface.
    fn collect(
        &self,
        matches: impl Fn(&str) -> bool,
        composing_count: impl Fn(&DictEntry) -> ComposingCount,
    ) -> Vec<Candidate> {
        let mut found: Vec<(f32, &DictEntry)> = self
            .entries()
            .filter(|e| matches(&e.ruby))
            .map(|e| (self.score(e), e))
            .collect();
        found.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter(|(_, e)| seen.insert(e.word.clone()))
            .map(|(score, e)| {
                let mut c = Candidate::from_entries(vec![e.clone()], composing_count(e));
                c.value = score;
                c
            })
            .collect()
    }
}

fn fallback(text: String, ruby: &str, count: ComposingCount) -> Candidate {
    let mut c = Candidate::literal(text, ruby.to_string(), count);
    c.value = FALLBACK_VALUE;
    c
}

impl ConversionEngine for DictionaryEngine {
    fn request_candidates(
        &mut self,
        text: &ComposingText,
        options: &ConvertRequestOptions,
    ) -> ConversionResult {
        self.learning = Some(options.learning);
        let target = text.convert_target();
        if target.is_empty() {
            return ConversionResult::default();
        }
        let reading = to_katakana(target);
        // `text` may be a re-split copy of the buffer, so its piece count
        // does not carry over. Characters do.
        let whole = ComposingCount::SurfaceCount(target.chars().count());

        let mut main_results = self.collect(|r| r == reading, |_| whole);
        if let Some(&(_, alternatives)) = PUNCTUATION_ALTERNATIVES.iter().find(|(k, _)| *k == target) {
            for alt in alternatives {
                main_results.push(fallback(alt.to_string(), target, whole));
            }
        }
        for variant in [to_hiragana(target), reading.clone()] {
            if !main_results.iter().any(|c| c.text == variant) {
                main_results.push(fallback(variant, &reading, whole));
            }
        }

        let chars: Vec<char> = reading.chars().collect();
        let first_clause_results = (1..=chars.len())
            .rev()
            .map(|len| {
                let prefix: String = chars[..len].iter().collect();
                self.collect(|r| r == prefix, |_| ComposingCount::SurfaceCount(len))
            })
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let prediction_results = if options.japanese_prediction == PredictionMode::Disabled {
            Vec::new()
        } else {
            let mut found = self.collect(
                |r| r.len() > reading.len() && r.starts_with(&reading),
                |_| whole,
            );
            found.truncate(MAX_PREDICTIONS);
            found
        };

        debug!(
            target,
            main = main_results.len(),
            first_clause = first_clause_results.len(),
            prediction = prediction_results.len(),
            "request_candidates"
        );
        ConversionResult {
            main_results,
            first_clause_results,
            prediction_results,
        }
    }

    fn import_dynamic_user_dictionary(&mut self, entries: Vec<DictEntry>, shortcuts: Vec<DictEntry>) {
        self.dynamic_entries = entries;
        self.shortcuts = shortcuts;
    }

    fn set_completed_data(&mut self, candidate: &Candidate) {
        self.completed = Some(candidate.clone());
    }

    fn update_learning_data(&mut self, candidate: &Candidate) {
        if self.learning.unwrap_or(LearningType::InputAndOutput) == LearningType::InputAndOutput {
            self.pending_learning.extend(candidate.data.iter().cloned());
        }
    }

    fn forget_memory(&mut self, candidate: &Candidate) {
        let forget = |e: &DictEntry| {
            candidate
                .data
                .iter()
                .any(|d| d.word == e.word && d.ruby == e.ruby)
        };
        self.learned.retain(|e| !forget(e));
        self.pending_learning.retain(|e| !forget(e));
        debug!(word = %candidate.text, "forget_memory");
    }

    fn stop_composition(&mut self) {
        self.completed = None;
    }

    fn commit_update_learning_data(&mut self) {
        for entry in self.pending_learning.drain(..) {
            if !self
                .learned
                .iter()
                .any(|l| l.word == entry.word && l.ruby == entry.ruby)
            {
                self.learned.push(entry);
            }
        }
    }
}
