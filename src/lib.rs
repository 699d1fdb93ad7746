//! tsuzuri: a Japanese input-session engine.
//!
//! The facade re-exports the two library crates and adds the reference
//! [`Controller`] that drives a session for one host text field.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tsuzuri_engine::{default_settings, Controller, DictionaryEngine, KeyEvent, MemoryTextClient};
//!
//! let settings = Arc::new(default_settings().clone());
//! let mut controller = Controller::new(DictionaryEngine::new(), MemoryTextClient::new(), settings);
//! controller.activate();
//! let response = controller.handle_key(&KeyEvent::text("k"));
//! assert!(response.consumed);
//! ```

pub mod client;
pub mod controller;
pub mod trace_init;

#[cfg(test)]
mod tests;

pub use tsuzuri_core;
pub use tsuzuri_session;

pub use client::{MemoryTextClient, TextClient};
pub use controller::{CommitRecord, Controller, KeyResponse, COMMIT_HISTORY_CAPACITY, DOUBLE_TAP_INTERVAL};
pub use tsuzuri_core::engine::{ConversionEngine, DictionaryEngine};
pub use tsuzuri_core::settings::{default_settings, load_settings_file, parse_settings_toml, Settings, SettingsError};
pub use tsuzuri_session::{
    CandidateWindow, InputLanguage, InputState, KeyEvent, MarkedText, SuggestionBackend,
    SuggestionEvent, UserAction,
};
