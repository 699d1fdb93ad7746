//! Reference session controller.
//!
//! Glues the key resolver, the mode state machine and the segment manager
//! together for one text field. Every keystroke runs resolver → state
//! machine → effect → mode transition, then reports what the host should
//! render.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span};

use tsuzuri_core::candidate::Candidate;
use tsuzuri_core::composing::InputStyle;
use tsuzuri_core::engine::ConversionEngine;
use tsuzuri_core::settings::Settings;
use tsuzuri_core::unicode::to_hiragana;
use tsuzuri_session::types::key;
use tsuzuri_session::{
    CandidateWindow, ClientAction, ClientActionCallback, InputLanguage, InputState, KeyEvent,
    KeyResolver, MarkedText, PredictionCandidate, ResolverConfig, SegmentsManager,
    SuggestionBackend, SuggestionEvent, Transliteration, TransitionContext, UserAction,
};

use crate::client::TextClient;

/// Two 英数 presses closer than this submit the roman text.
pub const DOUBLE_TAP_INTERVAL: Duration = Duration::from_millis(500);
/// Commit records kept for reconversion.
pub const COMMIT_HISTORY_CAPACITY: usize = 32;
/// Characters of left context sent as the suggestion prompt.
const SUGGESTION_PROMPT_LENGTH: usize = 100;
/// Inserted before asking the backend to continue the text.
const PREDICTIVE_SUGGESTION_SEED: &str = "つづき";

/// What the host should show after a keystroke.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyResponse {
    /// False when the host should handle the key itself.
    pub consumed: bool,
    pub marked_text: MarkedText,
    pub candidate_window: CandidateWindow,
    /// Inline continuations, only while composing.
    pub predictions: Vec<PredictionCandidate>,
    /// Replace suggestions, while their window is open.
    pub suggestions: Vec<String>,
}

/// A piece of text the controller committed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub text: String,
    /// Hiragana reading, when the text came from a conversion.
    pub reading: Option<String>,
}

pub struct Controller<E, T> {
    segments: SegmentsManager<E>,
    client: T,
    settings: Arc<Settings>,
    resolver: KeyResolver,
    state: InputState,
    input_language: InputLanguage,
    epoch: u64,
    history: VecDeque<CommitRecord>,
    last_tap: Option<(u16, Instant)>,
    suggestion_window_visible: bool,
}

impl<E: ConversionEngine, T: TextClient> Controller<E, T> {
    pub fn new(engine: E, client: T, settings: Arc<Settings>) -> Self {
        let resolver = KeyResolver::new(ResolverConfig::from_settings(&settings));
        Controller {
            segments: SegmentsManager::new(engine, Arc::clone(&settings)),
            client,
            settings,
            resolver,
            state: InputState::None,
            input_language: InputLanguage::Japanese,
            epoch: 0,
            history: VecDeque::with_capacity(COMMIT_HISTORY_CAPACITY),
            last_tap: None,
            suggestion_window_visible: false,
        }
    }

    pub fn with_suggestion_backend(mut self, backend: Arc<dyn SuggestionBackend>) -> Self {
        self.segments = self.segments.with_suggestion_backend(backend);
        self
    }

    pub fn segments(&self) -> &SegmentsManager<E> {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut SegmentsManager<E> {
        &mut self.segments
    }

    pub fn client(&self) -> &T {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut T {
        &mut self.client
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn input_language(&self) -> InputLanguage {
        self.input_language
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Most recent commit last.
    pub fn commit_history(&self) -> impl Iterator<Item = &CommitRecord> {
        self.history.iter()
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Swap in a new settings snapshot; takes effect on the next keystroke.
    pub fn set_settings(&mut self, settings: Arc<Settings>) {
        self.resolver = KeyResolver::new(ResolverConfig::from_settings(&settings));
        self.segments.set_settings(Arc::clone(&settings));
        self.settings = settings;
    }

    pub fn activate(&mut self) {
        self.segments.activate();
        self.state = InputState::None;
    }

    pub fn deactivate(&mut self) {
        self.segments.cancel_replace_suggestion();
        self.segments.deactivate();
        self.state = InputState::None;
        self.suggestion_window_visible = false;
    }

    /// Reset the session as if the input method had been restarted.
    /// Suggestions requested before this point are never applied.
    pub fn pseudo_restart(&mut self) {
        self.epoch += 1;
        debug!(epoch = self.epoch, "pseudo_restart");
        self.deactivate();
        self.activate();
    }

    /// The host forced a commit (focus change, mouse click).
    pub fn commit_composition(&mut self) -> KeyResponse {
        if matches!(self.state, InputState::UnicodeInput(_)) {
            // The host already committed the displayed text itself.
            self.state = InputState::None;
            return self.response(true);
        }
        if !self.segments.is_empty() {
            self.commit_marked_text();
            self.state = InputState::None;
        }
        self.response(true)
    }

    pub fn set_input_language(&mut self, language: InputLanguage) {
        self.switch_input_language(language);
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyResponse {
        self.handle_key_at(event, Instant::now())
    }

    /// [`Self::handle_key`] with an explicit timestamp for double-tap
    /// detection.
    pub fn handle_key_at(&mut self, event: &KeyEvent, now: Instant) -> KeyResponse {
        let _span = debug_span!("handle_key", ?event).entered();
        let action = self.resolver.resolve(event, self.input_language);
        debug!(?action, "resolved");

        if event.key_code == key::EISU || event.key_code == key::KANA {
            let double_tap = self.check_double_tap(event.key_code, now);
            if double_tap && event.key_code == key::EISU && !self.segments.is_empty() {
                debug!("eisu double tap");
                self.execute(
                    ClientAction::SubmitHalfWidthRomanCandidate,
                    ClientActionCallback::Transition(InputState::None),
                );
                self.switch_input_language(InputLanguage::English);
                return self.response(true);
            }
        }

        if action == UserAction::Suggest && !self.settings.suggestion_enabled() {
            self.segments
                .append_debug_message("Suggest action ignored: AI backend is off");
            return self.response(false);
        }

        let ctx = TransitionContext {
            modifiers: event.modifiers,
            input_language: self.input_language,
            live_conversion: self.settings.conversion.live_conversion,
            debug_window: self.settings.debug.debug_window,
            suggestion: self.settings.suggestion_enabled(),
        };
        let (client_action, callback) = self.state.event(&action, &ctx);
        debug!(?client_action, ?callback, state = ?self.state, "transition");
        let consumed = self.execute(client_action, callback);
        self.response(consumed)
    }

    /// Apply a finished suggestion request, if any.
    pub fn poll_suggestions(&mut self) -> Option<SuggestionEvent> {
        let event = self.segments.poll_suggestion(self.epoch)?;
        Some(self.on_suggestion_event(event))
    }

    /// Block until a suggestion request completes or `timeout` passes.
    pub fn wait_suggestions(&mut self, timeout: Duration) -> Option<SuggestionEvent> {
        let event = self.segments.wait_suggestion(self.epoch, timeout)?;
        Some(self.on_suggestion_event(event))
    }

    /// Current rendering state, without handling a key.
    pub fn snapshot(&mut self) -> KeyResponse {
        self.response(true)
    }

    fn on_suggestion_event(&mut self, event: SuggestionEvent) -> SuggestionEvent {
        if matches!(event, SuggestionEvent::Ready(_)) {
            self.suggestion_window_visible = true;
        }
        event
    }

    fn check_double_tap(&mut self, code: u16, now: Instant) -> bool {
        let double = matches!(
            self.last_tap,
            Some((last, at)) if last == code && now.saturating_duration_since(at) < DOUBLE_TAP_INTERVAL
        );
        self.last_tap = Some((code, now));
        double
    }

    fn input_style(&self) -> InputStyle {
        match self.input_language {
            InputLanguage::English => InputStyle::Direct,
            InputLanguage::Japanese => InputStyle::Roman2Kana,
        }
    }

    /// Run one client action, then apply its callback. Returns whether the
    /// key was consumed.
    fn execute(&mut self, action: ClientAction, callback: ClientActionCallback) -> bool {
        use ClientAction as A;

        let style = self.input_style();
        match action {
            A::Consume => {}
            A::Fallthrough => return false,
            A::ShowCandidateWindow => self.segments.set_candidate_window_visible(true),
            A::HideCandidateWindow => self.segments.set_candidate_window_visible(false),
            A::EnterFirstCandidatePreviewMode => {
                self.segments.insert_separator(style, false, &self.client);
                self.segments.set_candidate_window_visible(false);
            }
            A::EnterCandidateSelectionMode => {
                self.segments.insert_separator(style, true, &self.client);
                self.segments.update(true, &self.client);
            }
            A::AppendPieceToMarkedText(pieces) => {
                self.segments.insert_pieces(&pieces, style, &self.client)
            }
            A::InsertWithoutMarkedText(text) => self.client.insert_text(&text),
            A::EditSegment(count) => self.segments.edit_segment(count, &self.client),
            A::CommitMarkedText => self.commit_marked_text(),
            A::CommitMarkedTextAndAppendPieceToMarkedText(pieces) => {
                self.commit_marked_text();
                self.segments.insert_pieces(&pieces, style, &self.client);
            }
            A::CommitMarkedTextAndSelectInputLanguage(language) => {
                self.commit_marked_text();
                self.switch_input_language(language);
            }
            A::RemoveLastMarkedText => {
                self.segments.delete_backward(1, &self.client);
                self.segments.reset_selection();
                // Only a separator left.
                if self.segments.convert_target().is_empty() {
                    self.segments.stop_composition();
                }
            }
            A::StopComposition => self.segments.stop_composition(),

            A::SubmitSelectedCandidate => self.submit_selected_candidate(),
            A::SubmitHiraganaCandidate => self.submit_transliteration(Transliteration::Hiragana),
            A::SubmitKatakanaCandidate => self.submit_transliteration(Transliteration::Katakana),
            A::SubmitHalfWidthKatakanaCandidate => {
                self.submit_transliteration(Transliteration::HalfWidthKatakana)
            }
            A::SubmitFullWidthRomanCandidate => {
                self.submit_transliteration(Transliteration::FullWidthRoman)
            }
            A::SubmitHalfWidthRomanCandidate => {
                self.submit_transliteration(Transliteration::HalfWidthRoman)
            }

            A::SelectPrevCandidate => self.segments.select_prev(),
            A::SelectNextCandidate => self.segments.select_next(),
            A::SelectNumberCandidate(n) => {
                self.segments.select_number(n);
                self.submit_selected_candidate();
                self.segments.reset_selection();
            }
            A::SelectNextCandidatePage => self.segments.select_next_page(),
            A::SelectPrevCandidatePage => self.segments.select_prev_page(),
            A::SelectFirstCandidate => self.segments.select_first(),
            A::SelectLastCandidate => self.segments.select_last(),

            A::EnableDebugWindow => self.segments.set_debug_window(true),
            A::DisableDebugWindow => self.segments.set_debug_window(false),
            A::ForgetMemory => self.segments.forget_memory(),
            A::SelectInputLanguage(language) => self.switch_input_language(language),

            A::RequestPredictiveSuggestion => {
                self.segments
                    .insert_str(PREDICTIVE_SUGGESTION_SEED, style, &self.client);
                self.request_replace_suggestion();
            }
            A::AcceptPredictionCandidate => self.accept_prediction_candidate(),
            A::RequestReplaceSuggestion => self.request_replace_suggestion(),
            A::SelectNextReplaceSuggestionCandidate => self.segments.select_next_suggestion(),
            A::SelectPrevReplaceSuggestionCandidate => self.segments.select_prev_suggestion(),
            A::SubmitReplaceSuggestionCandidate => self.submit_replace_suggestion(),
            A::HideReplaceSuggestionWindow => self.suggestion_window_visible = false,

            // The accumulated digits live in the mode itself.
            A::EnterUnicodeInputMode
            | A::AppendToUnicodeInput(_)
            | A::RemoveLastUnicodeInput
            | A::CancelUnicodeInput => {}
            A::SubmitUnicodeInput(code_point) => {
                match u32::from_str_radix(&code_point, 16).ok().and_then(char::from_u32) {
                    Some(c) => self.client.insert_text(&c.to_string()),
                    None => debug!(%code_point, "ignoring invalid code point"),
                }
            }
            A::SubmitSelectedCandidateAndEnterUnicodeInputMode => {
                self.submit_selected_candidate();
                if !self.segments.is_empty() {
                    let rest = self.segments.convert_target().to_string();
                    self.client.insert_text(&rest);
                    self.segments.stop_composition();
                }
            }

            A::ReconvertCommittedText => {
                if !self.reconvert_committed_text() {
                    return false;
                }
            }
        }

        self.apply_callback(callback);
        true
    }

    fn apply_callback(&mut self, callback: ClientActionCallback) {
        match callback {
            ClientActionCallback::Fallthrough => {}
            ClientActionCallback::Transition(next) => {
                if next != InputState::ReplaceSuggestion {
                    self.suggestion_window_visible = false;
                }
                if next == InputState::None {
                    self.switch_input_language(self.input_language);
                }
                self.state = next;
            }
            conditional => {
                let current = std::mem::take(&mut self.state);
                self.state = conditional.resolve(current, self.segments.is_empty());
            }
        }
    }

    fn switch_input_language(&mut self, language: InputLanguage) {
        self.input_language = language;
        if language == InputLanguage::English {
            self.segments.stop_japanese_input();
        }
    }

    fn record_commit(&mut self, text: String, reading: Option<String>) {
        if text.is_empty() {
            return;
        }
        if self.history.len() == COMMIT_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(CommitRecord { text, reading });
    }

    fn commit_marked_text(&mut self) {
        let reading = self.segments.convert_target().to_string();
        let text = self.segments.commit_marked_text(&self.state);
        self.client.insert_text(&text);
        let reading = (!reading.is_empty()).then(|| to_hiragana(&reading));
        self.record_commit(text, reading);
    }

    fn submit_candidate(&mut self, candidate: Candidate) {
        // Read the context before the candidate lands in the host.
        let left = self
            .segments
            .clean_left_context(&self.client)
            .unwrap_or_default();
        self.client.insert_text(&candidate.text);
        self.segments.prefix_candidate_committed(&candidate, &left);
        if self.segments.is_empty() {
            self.segments.stop_composition();
        }
        let reading = candidate.reading();
        let reading = (!reading.is_empty()).then(|| to_hiragana(&reading));
        self.record_commit(candidate.text, reading);
    }

    fn submit_selected_candidate(&mut self) {
        if let Some(candidate) = self.segments.selected_candidate() {
            self.submit_candidate(candidate);
            self.segments.reset_selection();
        }
    }

    fn submit_transliteration(&mut self, kind: Transliteration) {
        // Roman variants always spell out the whole buffer.
        let state = if kind.uses_roman() {
            InputState::Composing
        } else {
            self.state.clone()
        };
        let candidate = self.segments.transliterated_candidate(&state, kind);
        self.submit_candidate(candidate);
    }

    fn accept_prediction_candidate(&mut self) {
        let predictions = self.segments.request_prediction_candidates();
        let Some(prediction) = predictions.into_iter().next() else {
            return;
        };
        let mut target = self.segments.convert_target().to_string();
        if target.chars().last().is_some_and(|c| c.is_ascii_alphabetic()) {
            target.pop();
            self.segments.delete_backward(1, &self.client);
        }
        if target.is_empty() || prediction.append_text.is_empty() {
            return;
        }
        self.segments
            .insert_str(&prediction.append_text, InputStyle::Direct, &self.client);
    }

    fn request_replace_suggestion(&mut self) {
        self.suggestion_window_visible = false;
        let prompt = self
            .client
            .left_context(SUGGESTION_PROMPT_LENGTH)
            .unwrap_or_default();
        if let Err(error) = self.segments.request_replace_suggestion(self.epoch, prompt) {
            debug!(%error, "replace suggestion not requested");
        }
    }

    fn submit_replace_suggestion(&mut self) {
        let Some(text) = self.segments.selected_suggestion().map(|c| c.text.clone()) else {
            return;
        };
        self.client.insert_text(&text);
        self.suggestion_window_visible = false;
        self.segments.stop_composition();
        self.record_commit(text, None);
    }

    /// Put the most recent commit back into the buffer when it sits right
    /// before the cursor.
    fn reconvert_committed_text(&mut self) -> bool {
        let Some(record) = self.history.back() else {
            return false;
        };
        let Some(reading) = record.reading.clone() else {
            return false;
        };
        let len = record.text.chars().count();
        if !self.segments.is_empty()
            || self.client.left_context(len).as_deref() != Some(record.text.as_str())
        {
            return false;
        }
        self.history.pop_back();
        self.client.delete_backward(len);
        self.segments.stop_composition();
        self.segments
            .insert_str(&reading, InputStyle::Direct, &self.client);
        self.segments.update(true, &self.client);
        self.segments.reset_selection();
        self.state = InputState::Selecting;
        true
    }

    fn response(&mut self, consumed: bool) -> KeyResponse {
        let marked_text = self.segments.get_current_marked_text(&self.state);
        let candidate_window = self.segments.get_current_candidate_window(&self.state);
        let predictions = if self.state == InputState::Composing {
            self.segments.request_prediction_candidates()
        } else {
            Vec::new()
        };
        let suggestions = if self.suggestion_window_visible {
            self.segments
                .replace_suggestions()
                .iter()
                .map(|c| c.text.clone())
                .collect()
        } else {
            Vec::new()
        };
        KeyResponse {
            consumed,
            marked_text,
            candidate_window,
            predictions,
            suggestions,
        }
    }
}
