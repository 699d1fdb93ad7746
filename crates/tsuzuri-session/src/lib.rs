//! Input-session engine: key resolution, the mode state machine and the
//! segment manager that owns the composing buffer.
//!
//! A host feeds each key event through [`KeyResolver::resolve`], hands the
//! resulting [`UserAction`] to [`InputState::event`], executes the returned
//! [`ClientAction`] against a [`SegmentsManager`], and finally applies the
//! [`ClientActionCallback`] to move to the next mode.

pub mod input_state;
pub mod key_resolver;
pub mod segments;
pub mod suggestion;
pub mod types;

#[cfg(test)]
mod tests;

pub use input_state::{ClientAction, ClientActionCallback, InputState, TransitionContext};
pub use key_resolver::{KeyResolver, ResolverConfig};
pub use segments::{
    prediction_candidates, CandidateWindow, ContextSource, FocusState, MarkedText,
    MarkedTextElement, NoContext, PredictionCandidate, SegmentsManager, Transliteration,
};
pub use suggestion::{
    CancelToken, SuggestionBackend, SuggestionError, SuggestionEvent, SuggestionOutcome,
    SuggestionRequest, SuggestionWorker,
};
pub use types::{Function, InputLanguage, KeyEvent, Navigation, Number, UserAction};
