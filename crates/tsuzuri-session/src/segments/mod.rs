//! The segment manager: owns the composing buffer and the candidate lifecycle.
//!
//! Every mutation re-requests candidates from the [`ConversionEngine`]. The
//! manager also keeps the selection index, the additional-candidate overlay,
//! replace suggestions and an in-memory debug message ring.

mod marked_text;
mod prediction;
mod replace;
mod selection;
mod transforms;

pub use marked_text::{FocusState, MarkedText, MarkedTextElement};
pub use prediction::{prediction_candidates, PredictionCandidate, PREDICTION_LIMIT};
pub use selection::CandidateWindow;
pub use transforms::Transliteration;

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use tsuzuri_core::candidate::{Candidate, DictEntry};
use tsuzuri_core::composing::{ComposingElement, ComposingText, InputPiece, InputStyle};
use tsuzuri_core::date_shortcuts::{date_shortcuts, today_local};
use tsuzuri_core::engine::{
    ConversionEngine, ConversionResult, ConvertRequestOptions, PersonalizationMode,
};
use tsuzuri_core::romaji::RomajiTrie;
use tsuzuri_core::settings::{Settings, UserDictionaryEntry};
use tsuzuri_core::unicode::to_katakana;

use crate::suggestion::{SuggestionBackend, SuggestionWorker};

use selection::AdditionalCandidates;

const DEBUG_RING_CAPACITY: usize = 100;
/// Characters of left context handed to the engine.
pub const LEFT_CONTEXT_LENGTH: usize = 30;
const USER_DICTIONARY_VALUE: f32 = -5.0;

/// Read access to the text left of the insertion point in the host.
pub trait ContextSource {
    fn left_context(&self, max_count: usize) -> Option<String>;
}

/// A host without readable context.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl ContextSource for NoContext {
    fn left_context(&self, _max_count: usize) -> Option<String> {
        None
    }
}

/// The last buffer mutation; decides what live conversion shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Insert,
    Delete,
    EditSegment,
    Other,
}

pub struct SegmentsManager<E> {
    engine: E,
    settings: Arc<Settings>,
    text: ComposingText,
    raw: Option<ConversionResult>,
    did_experience_segmentation: bool,
    last_operation: Operation,
    show_candidate_window: bool,
    show_debug_window: bool,
    selection_index: Option<usize>,
    additional: AdditionalCandidates,
    personalization: Option<PersonalizationMode>,
    debug_messages: VecDeque<String>,

    replace_suggestions: Vec<Candidate>,
    suggestion_index: Option<usize>,
    suggestion_backend: Option<Arc<dyn SuggestionBackend>>,
    suggestion_worker: Option<SuggestionWorker>,
}

impl<E: ConversionEngine> SegmentsManager<E> {
    pub fn new(engine: E, settings: Arc<Settings>) -> Self {
        let table = RomajiTrie::for_settings(&settings);
        SegmentsManager {
            engine,
            settings,
            text: ComposingText::new(table),
            raw: None,
            did_experience_segmentation: false,
            last_operation: Operation::Other,
            show_candidate_window: false,
            show_debug_window: false,
            selection_index: None,
            additional: AdditionalCandidates::default(),
            personalization: None,
            debug_messages: VecDeque::with_capacity(DEBUG_RING_CAPACITY),
            replace_suggestions: Vec::new(),
            suggestion_index: None,
            suggestion_backend: None,
            suggestion_worker: None,
        }
    }

    pub fn with_suggestion_backend(mut self, backend: Arc<dyn SuggestionBackend>) -> Self {
        self.suggestion_backend = Some(backend);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Swap the settings snapshot. The romaji table follows the new settings.
    pub fn set_settings(&mut self, settings: Arc<Settings>) {
        self.text.set_table(RomajiTrie::for_settings(&settings));
        self.settings = settings;
    }

    pub fn composing_text(&self) -> &ComposingText {
        &self.text
    }

    pub fn convert_target(&self) -> &str {
        self.text.convert_target()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn raw_candidates(&self) -> Option<&ConversionResult> {
        self.raw.as_ref()
    }

    pub fn live_conversion_enabled(&self) -> bool {
        self.settings.conversion.live_conversion
    }

    /// Newest first, newlines escaped.
    pub fn debug_messages(&self) -> impl Iterator<Item = &str> {
        self.debug_messages.iter().map(String::as_str)
    }

    pub fn append_debug_message(&mut self, message: &str) {
        debug!(text = message, "debug message");
        self.debug_messages.push_front(message.replace('\n', "\\n"));
        self.debug_messages.truncate(DEBUG_RING_CAPACITY);
    }

    pub fn activate(&mut self) {
        self.show_candidate_window = false;
        self.personalization = match PersonalizationMode::from_settings(&self.settings) {
            Ok(mode) => Some(mode),
            Err(reason) => {
                self.append_debug_message(&format!("personalization unavailable: {reason}"));
                None
            }
        };
    }

    pub fn deactivate(&mut self) {
        self.engine.stop_composition();
        self.engine.commit_update_learning_data();
        self.raw = None;
        self.did_experience_segmentation = false;
        self.last_operation = Operation::Other;
        self.text.stop_composition();
        self.show_candidate_window = false;
        self.selection_index = None;
        self.additional.reset();
    }

    /// Abandon the current input.
    pub fn stop_composition(&mut self) {
        self.text.stop_composition();
        self.engine.stop_composition();
        self.raw = None;
        self.did_experience_segmentation = false;
        self.last_operation = Operation::Other;
        self.show_candidate_window = false;
        self.selection_index = None;
        self.additional.reset();
    }

    /// Leave Japanese input; the buffer itself has already been committed.
    pub fn stop_japanese_input(&mut self) {
        self.raw = None;
        self.did_experience_segmentation = false;
        self.last_operation = Operation::Other;
        self.engine.commit_update_learning_data();
        self.show_candidate_window = false;
        self.selection_index = None;
        self.additional.reset();
    }

    /// Mark a segment boundary at the conversion key.
    pub fn insert_separator(&mut self, style: InputStyle, skip_update: bool, context: &dyn ContextSource) {
        if matches!(
            self.text.input().last(),
            Some(ComposingElement {
                piece: InputPiece::CompositionSeparator,
                ..
            })
        ) {
            return;
        }
        self.text.insert_separator(style);
        self.last_operation = Operation::Insert;
        if !skip_update {
            self.update_raw(false, None, context);
        }
    }

    pub fn insert_str(&mut self, text: &str, style: InputStyle, context: &dyn ContextSource) {
        self.text.insert_str_at_cursor(text, style);
        self.after_insert(context);
    }

    pub fn insert_pieces(&mut self, pieces: &[InputPiece], style: InputStyle, context: &dyn ContextSource) {
        self.text
            .insert_at_cursor(pieces.iter().map(|&piece| ComposingElement::new(piece, style)));
        self.after_insert(context);
    }

    fn after_insert(&mut self, context: &dyn ContextSource) {
        self.last_operation = Operation::Insert;
        // Without live conversion the single-candidate window follows typing.
        self.show_candidate_window = !self.live_conversion_enabled();
        self.update_raw(false, None, context);
    }

    /// Grow (positive) or shrink (negative) the first segment.
    pub fn edit_segment(&mut self, count: isize, context: &dyn ContextSource) {
        // Start from the boundary of the candidate currently selected.
        if let Some(selected) = self.selected_candidate() {
            let mut rest = self.text.clone();
            rest.prefix_complete(selected.composing_count);
            let prefix_count = self.text.len() - rest.len();
            self.text
                .move_cursor(prefix_count as isize - self.text.cursor() as isize);
        }
        if count > 0 && self.text.is_at_end() && !self.did_experience_segmentation {
            self.text.move_cursor(count - self.text.cursor() as isize);
        } else {
            self.text.move_cursor(count);
        }
        if self.text.is_at_start() {
            self.text.move_cursor(1);
        }
        self.last_operation = Operation::EditSegment;
        self.did_experience_segmentation = true;
        self.show_candidate_window = true;
        self.selection_index = None;
        self.update_raw(false, None, context);
    }

    pub fn delete_backward(&mut self, count: usize, context: &dyn ContextSource) {
        if !self.text.is_at_end() {
            self.text
                .move_cursor(self.text.len() as isize - self.text.cursor() as isize);
            self.did_experience_segmentation = false;
        }
        self.text.delete_backward(count);
        self.last_operation = Operation::Delete;
        self.show_candidate_window = !self.live_conversion_enabled();
        self.update_raw(false, None, context);
    }

    /// Remove the selected candidate from learned memory.
    pub fn forget_memory(&mut self) {
        if let Some(selected) = self.selected_candidate() {
            self.engine.forget_memory(&selected);
            let words: Vec<&str> = selected.data.iter().map(|e| e.word.as_str()).collect();
            self.append_debug_message(&format!("forgetMemory: forget {words:?}"));
        }
    }

    /// The last line of the host's left context, leading whitespace trimmed.
    pub fn clean_left_context(&self, context: &dyn ContextSource) -> Option<String> {
        context.left_context(LEFT_CONTEXT_LENGTH).map(|left| {
            let last = left.rsplit('\n').next().unwrap_or(&left);
            last.trim_start().to_string()
        })
    }

    /// Re-request candidates and show the window.
    pub fn update(&mut self, request_rich_candidates: bool, context: &dyn ContextSource) {
        self.update_raw(request_rich_candidates, None, context);
        self.show_candidate_window = true;
    }

    /// A candidate for the leading part of the buffer was committed.
    ///
    /// `left_context` must be read from the host before the candidate text
    /// is inserted there.
    pub fn prefix_candidate_committed(&mut self, candidate: &Candidate, left_context: &str) {
        self.engine.set_completed_data(candidate);
        self.engine.update_learning_data(candidate);
        self.text.prefix_complete(candidate.composing_count);

        if !self.text.is_empty() {
            self.text
                .move_cursor(self.text.len() as isize - self.text.cursor() as isize);
            self.did_experience_segmentation = false;
            self.show_candidate_window = true;
            self.selection_index = None;
            let forced = format!("{left_context}{}", candidate.text);
            self.update_raw(true, Some(forced), &NoContext);
        }
    }

    pub fn set_candidate_window_visible(&mut self, visible: bool) {
        self.show_candidate_window = visible;
    }

    pub fn set_debug_window(&mut self, enabled: bool) {
        self.show_debug_window = enabled;
    }

    fn update_raw(
        &mut self,
        request_rich_candidates: bool,
        forced_left_context: Option<String>,
        context: &dyn ContextSource,
    ) {
        self.additional.reset();
        if self.text.is_empty() {
            self.raw = None;
            self.engine.stop_composition();
            return;
        }

        let mut dictionary = user_entries(&self.settings.user_dictionary);
        self.append_debug_message(&format!("userDictionaryCount: {}", dictionary.len()));
        let system = user_entries(&self.settings.system_user_dictionary);
        self.append_debug_message(&format!("systemUserDictionaryCount: {}", system.len()));
        dictionary.extend(system);
        self.engine
            .import_dynamic_user_dictionary(dictionary, date_shortcuts(today_local()));

        let prefix = self.text.prefix_to_cursor();
        let left_side_context = forced_left_context.or_else(|| self.clean_left_context(context));
        let mut options = ConvertRequestOptions::new(&self.settings, self.personalization.clone());
        options.request_rich_candidates = request_rich_candidates;
        options.left_side_context = left_side_context;
        let result = self.engine.request_candidates(&prefix, &options);
        debug!(
            target = prefix.convert_target(),
            main = result.main_results.len(),
            "update_raw"
        );
        self.raw = Some(result);
    }
}

fn user_entries(entries: &[UserDictionaryEntry]) -> Vec<DictEntry> {
    entries
        .iter()
        .map(|e| DictEntry::proper_noun(e.word.clone(), to_katakana(&e.reading), USER_DICTIONARY_VALUE))
        .collect()
}
