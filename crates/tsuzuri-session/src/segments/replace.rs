//! AI replace suggestions for the composing text.

use std::time::{Duration, Instant};

use tracing::debug;

use tsuzuri_core::candidate::Candidate;
use tsuzuri_core::composing::ComposingCount;
use tsuzuri_core::engine::ConversionEngine;

use super::SegmentsManager;
use crate::suggestion::{
    SuggestionError, SuggestionEvent, SuggestionOutcome, SuggestionRequest, SuggestionWorker,
};

fn suggestion_candidate(text: String, target_len: usize) -> Candidate {
    Candidate {
        text,
        value: 0.0,
        composing_count: ComposingCount::SurfaceCount(target_len),
        last_mid: 0,
        data: Vec::new(),
    }
}

impl<E: ConversionEngine> SegmentsManager<E> {
    pub fn replace_suggestions(&self) -> &[Candidate] {
        &self.replace_suggestions
    }

    pub fn set_replace_suggestions(&mut self, suggestions: Vec<Candidate>) {
        self.replace_suggestions = suggestions;
        self.suggestion_index = None;
    }

    pub fn suggestion_index(&self) -> Option<usize> {
        self.suggestion_index
    }

    pub fn select_suggestion_row(&mut self, row: usize) {
        self.suggestion_index = Some(row);
    }

    pub fn select_next_suggestion(&mut self) {
        if self.replace_suggestions.is_empty() {
            return;
        }
        let last = self.replace_suggestions.len() - 1;
        self.suggestion_index = Some(self.suggestion_index.map_or(0, |i| (i + 1).min(last)));
    }

    pub fn select_prev_suggestion(&mut self) {
        if self.replace_suggestions.is_empty() {
            return;
        }
        self.suggestion_index = Some(self.suggestion_index.map_or(0, |i| i.saturating_sub(1)));
    }

    pub fn reset_suggestion_selection(&mut self) {
        self.suggestion_index = None;
    }

    pub fn selected_suggestion(&self) -> Option<&Candidate> {
        self.replace_suggestions.get(self.suggestion_index?)
    }

    /// Ask the backend for rewrites of the convert target.
    ///
    /// Any outstanding request is cancelled and the shown suggestions are
    /// cleared. The outcome is applied later by [`Self::receive_suggestion`]
    /// only if `epoch` is still current and no newer request or cancel came
    /// after it.
    pub fn request_replace_suggestion(&mut self, epoch: u64, prompt: String) -> Result<(), SuggestionError> {
        if !self.settings.suggestion_enabled() {
            self.append_debug_message("requestReplaceSuggestion: AI backend is off");
            return Err(SuggestionError::Disabled);
        }
        let Some(backend) = self.suggestion_backend.clone() else {
            self.append_debug_message("requestReplaceSuggestion: no backend configured");
            return Err(SuggestionError::Disabled);
        };
        if self.suggestion_worker.is_none() {
            let worker = SuggestionWorker::spawn(backend)
                .map_err(|e| SuggestionError::Backend(e.to_string()))?;
            self.suggestion_worker = Some(worker);
        }

        let target = self.text.convert_target().to_string();
        self.set_replace_suggestions(Vec::new());
        let request = SuggestionRequest::new(&self.settings, prompt, target);
        self.append_debug_message(&format!(
            "requestReplaceSuggestion: prompt={}, target={}, modelName={}",
            request.prompt, request.target, request.model_name
        ));
        if let Some(worker) = self.suggestion_worker.as_mut() {
            worker.submit(epoch, request);
        }
        Ok(())
    }

    pub fn cancel_replace_suggestion(&mut self) {
        if let Some(worker) = self.suggestion_worker.as_mut() {
            worker.cancel();
        }
    }

    /// Apply a finished request. Stale, superseded and cancelled outcomes
    /// change nothing.
    pub fn receive_suggestion(&mut self, outcome: SuggestionOutcome, current_epoch: u64) -> Option<SuggestionEvent> {
        if outcome.epoch != current_epoch {
            debug!(
                epoch = outcome.epoch,
                current_epoch, "dropping stale suggestion"
            );
            return None;
        }
        let latest = self
            .suggestion_worker
            .as_ref()
            .is_some_and(|w| w.is_current(outcome.generation));
        if !latest {
            debug!(generation = outcome.generation, "dropping superseded suggestion");
            return None;
        }
        match outcome.result {
            Err(SuggestionError::Cancelled) => None,
            Err(error) => {
                self.append_debug_message(&format!("suggestion request failed: {error}"));
                Some(SuggestionEvent::Failed(error.to_string()))
            }
            Ok(texts) => {
                self.append_debug_message(&format!("suggestion response: {texts:?}"));
                if texts.is_empty() {
                    return None;
                }
                let target_len = outcome.target.chars().count();
                self.set_replace_suggestions(
                    texts
                        .iter()
                        .map(|t| suggestion_candidate(t.clone(), target_len))
                        .collect(),
                );
                Some(SuggestionEvent::Ready(texts))
            }
        }
    }

    /// Drain finished requests without blocking.
    pub fn poll_suggestion(&mut self, current_epoch: u64) -> Option<SuggestionEvent> {
        loop {
            let outcome = self.suggestion_worker.as_ref()?.try_recv()?;
            if let Some(event) = self.receive_suggestion(outcome, current_epoch) {
                return Some(event);
            }
        }
    }

    /// Block until a request yields an event or `timeout` passes.
    pub fn wait_suggestion(&mut self, current_epoch: u64, timeout: Duration) -> Option<SuggestionEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let outcome = self.suggestion_worker.as_ref()?.recv_timeout(remaining)?;
            if let Some(event) = self.receive_suggestion(outcome, current_epoch) {
                return Some(event);
            }
        }
    }
}
