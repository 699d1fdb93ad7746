use std::collections::HashSet;

use tsuzuri_core::candidate::Candidate;
use tsuzuri_core::engine::ConversionEngine;

use super::SegmentsManager;
use crate::input_state::InputState;

/// What the candidate window should show.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateWindow {
    Hidden,
    /// The single live candidate while typing without live conversion.
    Composing {
        candidates: Vec<Candidate>,
        selection: usize,
    },
    Selecting {
        candidates: Vec<Candidate>,
        selection: usize,
    },
}

/// Transliteration variants revealed above the first candidate.
#[derive(Debug, Default)]
pub(super) struct AdditionalCandidates {
    pub(super) list: Vec<(Candidate, &'static str)>,
    pub(super) showing: bool,
    pub(super) count: usize,
    /// Row 0 stays on the newest revealed variant while paging up.
    pub(super) pinned: bool,
}

impl AdditionalCandidates {
    pub(super) fn reset(&mut self) {
        self.showing = false;
        self.list.clear();
        self.count = 0;
        self.pinned = false;
    }

    fn offset(&self) -> usize {
        if self.showing {
            self.count
        } else {
            0
        }
    }

    /// The revealed tail of the list, in display order.
    fn visible(&self) -> &[(Candidate, &'static str)] {
        let offset = self.offset().min(self.list.len());
        &self.list[self.list.len() - offset..]
    }
}

impl<E: ConversionEngine> SegmentsManager<E> {
    /// Conversion candidates after the first-clause policy, without overlay.
    fn raw_candidate_list(&self) -> Option<Vec<Candidate>> {
        let raw = self.raw.as_ref()?;
        if self.did_experience_segmentation {
            return Some(raw.main_results.clone());
        }
        if raw
            .first_clause_results
            .iter()
            .any(|c| self.text.is_whole(c.composing_count))
        {
            return Some(raw.main_results.clone());
        }
        let seen: HashSet<&str> = raw
            .first_clause_results
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        let mut list = raw.first_clause_results.clone();
        list.extend(
            raw.main_results
                .iter()
                .filter(|c| !seen.contains(c.text.as_str()))
                .cloned(),
        );
        Some(list)
    }

    /// The visible candidate list: revealed variants, then conversions.
    pub fn candidates(&self) -> Option<Vec<Candidate>> {
        let additional = self.additional.visible().iter().map(|(c, _)| c.clone());
        match self.raw_candidate_list() {
            Some(raw) => Some(additional.chain(raw).collect()),
            None if self.additional.showing => Some(additional.collect()),
            None => None,
        }
    }

    /// Annotation for a row of [`Self::candidates`], set for variants only.
    pub fn candidate_annotation(&self, index: usize) -> Option<&'static str> {
        self.additional.visible().get(index).map(|&(_, note)| note)
    }

    pub fn selection_index(&self) -> Option<usize> {
        self.selection_index
    }

    pub fn selected_candidate(&self) -> Option<Candidate> {
        let index = self.selection_index?;
        self.candidates()?.into_iter().nth(index)
    }

    pub fn select_next(&mut self) {
        self.additional.pinned = false;
        self.selection_index = Some(self.selection_index.map_or(0, |i| i + 1));
    }

    pub fn select_prev(&mut self) {
        let index = self.selection_index.unwrap_or(0);

        if self.additional.pinned && self.additional.showing {
            if self.additional.offset() < self.additional.list.len() {
                self.additional.count += 1;
            }
            self.selection_index = Some(0);
            return;
        }
        if index == 0 && !self.additional.showing {
            self.show_additional_if_needed();
            if self.additional.offset() > 0 {
                self.additional.pinned = true;
                self.selection_index = Some(0);
                return;
            }
        }
        if index == 0
            && self.additional.showing
            && self.additional.offset() < self.additional.list.len()
        {
            self.additional.pinned = true;
            self.additional.count += 1;
            self.selection_index = Some(0);
            return;
        }
        self.selection_index = Some(index.saturating_sub(1));
    }

    pub fn select_row(&mut self, index: usize) {
        if index != 0 {
            self.additional.pinned = false;
        }
        self.selection_index = Some(index);
    }

    pub fn reset_selection(&mut self) {
        self.selection_index = None;
        self.additional.reset();
    }

    fn page_size(&self) -> usize {
        self.settings.conversion.candidate_page_size.max(1)
    }

    fn candidate_count(&self) -> usize {
        self.candidates().map_or(0, |c| c.len())
    }

    /// First row of the page holding the selection.
    pub fn page_start(&self) -> usize {
        let index = self.selection_index.unwrap_or(0);
        index - index % self.page_size()
    }

    pub fn select_next_page(&mut self) {
        let count = self.candidate_count();
        if count == 0 {
            return;
        }
        let next = (self.page_start() + self.page_size()).min(count - 1);
        self.select_row(next);
    }

    pub fn select_prev_page(&mut self) {
        let prev = self.page_start().saturating_sub(self.page_size());
        self.select_row(prev);
    }

    pub fn select_first(&mut self) {
        self.select_row(0);
    }

    pub fn select_last(&mut self) {
        let count = self.candidate_count();
        self.select_row(count.saturating_sub(1));
    }

    /// Digit shortcut `n` (1-based) on the current page.
    pub fn select_number(&mut self, n: u8) {
        let row = self.page_start() + usize::from(n.max(1)) - 1;
        self.select_row(row);
    }

    pub(super) fn show_additional_if_needed(&mut self) {
        if self.additional.showing {
            return;
        }
        if self.text.convert_target().is_empty() {
            self.additional.reset();
            return;
        }
        self.additional.list = self.additional_candidates();
        self.additional.showing = true;
        self.additional.count = 1;
    }

    /// Whether the overlay is visible, and how many rows it has.
    pub fn additional_candidate_rows(&self) -> usize {
        self.additional.offset()
    }

    pub fn get_current_candidate_window(&mut self, state: &InputState) -> CandidateWindow {
        match state {
            InputState::None
            | InputState::Previewing
            | InputState::ReplaceSuggestion
            | InputState::AttachDiacritic(_)
            | InputState::UnicodeInput(_) => CandidateWindow::Hidden,
            InputState::Composing => {
                match self.raw.as_ref().and_then(|r| r.main_results.first()) {
                    Some(first) if !self.live_conversion_enabled() => CandidateWindow::Composing {
                        candidates: vec![first.clone()],
                        selection: 0,
                    },
                    _ => CandidateWindow::Hidden,
                }
            }
            InputState::Selecting => {
                if self.show_debug_window {
                    let candidates: Vec<Candidate> = self
                        .debug_messages
                        .iter()
                        .map(|m| Candidate::debug_message(m))
                        .collect();
                    let selection = self.clamp_selection(candidates.len());
                    return CandidateWindow::Selecting {
                        candidates,
                        selection,
                    };
                }
                match self.candidates() {
                    Some(candidates) if self.show_candidate_window && !candidates.is_empty() => {
                        let selection = self.clamp_selection(candidates.len());
                        CandidateWindow::Selecting {
                            candidates,
                            selection,
                        }
                    }
                    _ => CandidateWindow::Hidden,
                }
            }
        }
    }

    pub(super) fn clamp_selection(&mut self, len: usize) -> usize {
        let index = self.selection_index.unwrap_or(0).min(len.saturating_sub(1));
        self.selection_index = Some(index);
        index
    }
}
