use tsuzuri_core::engine::ConversionEngine;

use super::{Operation, SegmentsManager};
use crate::input_state::InputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusState {
    Focused,
    Unfocused,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkedTextElement {
    pub content: String,
    pub focus: FocusState,
}

/// The inline, not-yet-committed text shown in the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MarkedText {
    pub elements: Vec<MarkedTextElement>,
    /// Cursor position in characters, when the host should place one.
    pub selection: Option<usize>,
}

impl MarkedText {
    fn plain(content: String) -> Self {
        MarkedText {
            elements: vec![MarkedTextElement {
                content,
                focus: FocusState::None,
            }],
            selection: None,
        }
    }

    pub fn text(&self) -> String {
        self.elements.iter().map(|e| e.content.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<E: ConversionEngine> SegmentsManager<E> {
    pub fn get_current_marked_text(&mut self, state: &InputState) -> MarkedText {
        let target = self.text.convert_target().to_string();
        match state {
            InputState::None | InputState::AttachDiacritic(_) => MarkedText::default(),
            InputState::Composing => {
                let first = self.raw.as_ref().and_then(|r| r.main_results.first());
                let text = match first {
                    // After a deletion the reading is always shown.
                    _ if self.last_operation == Operation::Delete => target,
                    Some(first) if self.live_conversion_enabled() && target.chars().count() > 1 => {
                        first.text.clone()
                    }
                    _ => target,
                };
                MarkedText::plain(text)
            }
            InputState::Previewing => {
                match self.raw.as_ref().and_then(|r| r.main_results.first()) {
                    Some(full) if self.text.is_whole(full.composing_count) => {
                        MarkedText::plain(full.text.clone())
                    }
                    _ => MarkedText::plain(target),
                }
            }
            InputState::Selecting => {
                let candidates = self.candidates().unwrap_or_default();
                if candidates.is_empty() {
                    return MarkedText::plain(target);
                }
                let index = self.clamp_selection(candidates.len());
                let selected = &candidates[index];
                let mut rest = self.text.clone();
                rest.prefix_complete(selected.composing_count);
                MarkedText {
                    elements: vec![
                        MarkedTextElement {
                            content: selected.text.clone(),
                            focus: FocusState::Focused,
                        },
                        MarkedTextElement {
                            content: rest.convert_target().to_string(),
                            focus: FocusState::Unfocused,
                        },
                    ],
                    selection: Some(selected.text.chars().count()),
                }
            }
            InputState::ReplaceSuggestion => {
                match self
                    .suggestion_index
                    .and_then(|i| self.replace_suggestions.get(i))
                {
                    Some(suggestion) => MarkedText {
                        elements: vec![MarkedTextElement {
                            content: suggestion.text.clone(),
                            focus: FocusState::Focused,
                        }],
                        selection: Some(suggestion.text.chars().count()),
                    },
                    None => MarkedText::plain(target),
                }
            }
            InputState::UnicodeInput(code_point) => {
                let display = format!("U+{code_point}");
                let cursor = display.chars().count();
                MarkedText {
                    selection: Some(cursor),
                    ..MarkedText::plain(display)
                }
            }
        }
    }

    /// Commit whatever is shown and end the composition.
    pub fn commit_marked_text(&mut self, state: &InputState) -> String {
        let text = self.get_current_marked_text(state).text();
        let committed = self
            .candidates()
            .and_then(|list| list.into_iter().find(|c| c.text == text));
        if let Some(candidate) = committed {
            self.prefix_candidate_committed(&candidate, "");
        }
        self.stop_composition();
        text
    }
}
