mod fsm;
mod segments;

use std::sync::Arc;

use tsuzuri_core::candidate::{Candidate, DictEntry};
use tsuzuri_core::composing::{ComposingText, InputPiece, InputStyle};
use tsuzuri_core::engine::{ConversionEngine, ConversionResult, ConvertRequestOptions, DictionaryEngine};
use tsuzuri_core::settings::{parse_settings_toml, Settings};

use crate::segments::{ContextSource, NoContext, SegmentsManager};

/// Every engine call, in order.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Call {
    Request {
        target: String,
        left_context: Option<String>,
        rich: bool,
    },
    Import {
        entries: usize,
        shortcuts: usize,
    },
    SetCompleted(String),
    UpdateLearning(String),
    Forget(String),
    Stop,
    CommitLearning,
}

/// A dictionary engine that records what the session asks of it.
pub(super) struct RecordingEngine {
    pub inner: DictionaryEngine,
    pub calls: Vec<Call>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        RecordingEngine {
            inner: DictionaryEngine::with_entries(test_words()),
            calls: Vec::new(),
        }
    }

    pub fn requests(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Request { .. }))
            .collect()
    }
}

impl ConversionEngine for RecordingEngine {
    fn request_candidates(&mut self, text: &ComposingText, options: &ConvertRequestOptions) -> ConversionResult {
        self.calls.push(Call::Request {
            target: text.convert_target().to_string(),
            left_context: options.left_side_context.clone(),
            rich: options.request_rich_candidates,
        });
        self.inner.request_candidates(text, options)
    }

    fn import_dynamic_user_dictionary(&mut self, entries: Vec<DictEntry>, shortcuts: Vec<DictEntry>) {
        self.calls.push(Call::Import {
            entries: entries.len(),
            shortcuts: shortcuts.len(),
        });
        self.inner.import_dynamic_user_dictionary(entries, shortcuts);
    }

    fn set_completed_data(&mut self, candidate: &Candidate) {
        self.calls.push(Call::SetCompleted(candidate.text.clone()));
        self.inner.set_completed_data(candidate);
    }

    fn update_learning_data(&mut self, candidate: &Candidate) {
        self.calls.push(Call::UpdateLearning(candidate.text.clone()));
        self.inner.update_learning_data(candidate);
    }

    fn forget_memory(&mut self, candidate: &Candidate) {
        self.calls.push(Call::Forget(candidate.text.clone()));
        self.inner.forget_memory(candidate);
    }

    fn stop_composition(&mut self) {
        self.calls.push(Call::Stop);
        self.inner.stop_composition();
    }

    fn commit_update_learning_data(&mut self) {
        self.calls.push(Call::CommitLearning);
        self.inner.commit_update_learning_data();
    }
}

pub(super) fn test_words() -> Vec<DictEntry> {
    vec![
        DictEntry::proper_noun("今日", "きょう", -10.0),
        DictEntry::proper_noun("京", "きょう", -12.0),
        DictEntry::proper_noun("今日は", "きょうは", -11.0),
        DictEntry::proper_noun("教会", "きょうかい", -13.0),
        DictEntry::proper_noun("天気", "てんき", -10.0),
        DictEntry::proper_noun("天", "てん", -12.0),
        DictEntry::proper_noun("木", "き", -9.0),
        DictEntry::proper_noun("良い", "いい", -9.0),
    ]
}

pub(super) fn settings(toml: &str) -> Arc<Settings> {
    Arc::new(parse_settings_toml(toml).unwrap())
}

pub(super) fn manager(toml: &str) -> SegmentsManager<RecordingEngine> {
    let mut m = SegmentsManager::new(RecordingEngine::new(), settings(toml));
    m.activate();
    m
}

/// Type `romaji` one key at a time.
pub(super) fn type_romaji(m: &mut SegmentsManager<RecordingEngine>, romaji: &str) {
    for c in romaji.chars() {
        m.insert_pieces(&[InputPiece::key(c)], InputStyle::Roman2Kana, &NoContext);
    }
}

/// A host whose text left of the cursor is fixed.
pub(super) struct FixedContext(pub &'static str);

impl ContextSource for FixedContext {
    fn left_context(&self, max_count: usize) -> Option<String> {
        let chars: Vec<char> = self.0.chars().collect();
        let start = chars.len().saturating_sub(max_count);
        Some(chars[start..].iter().collect())
    }
}

pub(super) fn texts(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.text.as_str()).collect()
}
