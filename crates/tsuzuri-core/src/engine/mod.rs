//! The conversion engine seam.
//!
//! The session layer drives a [`ConversionEngine`] and never looks inside it.
//! [`DictionaryEngine`] is a small in-tree implementation backed by the
//! imported user dictionary and date shortcuts.

mod dictionary;

pub use dictionary::DictionaryEngine;

use std::path::{Path, PathBuf};

use crate::candidate::{Candidate, DictEntry};
use crate::composing::ComposingText;
use crate::settings::{LearningType, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionMode {
    Disabled,
    ManualMix,
}

/// File suffixes of the personal n-gram model; all four must exist.
pub const PERSONAL_MODEL_SUFFIXES: [&str; 4] = [
    "_c_abc.marisa",
    "_r_xbx.marisa",
    "_u_abx.marisa",
    "_u_xbc.marisa",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalizationMode {
    pub base_model_prefix: Option<PathBuf>,
    pub personal_model_prefix: PathBuf,
    pub alpha: f32,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PersonalizationUnavailable {
    #[error("personalization is off")]
    Off,
    #[error("no personal model prefix configured")]
    NoModelPrefix,
    #[error("missing model file {0}")]
    MissingFile(PathBuf),
}

fn model_file(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl PersonalizationMode {
    /// Personalization for the configured level, if every model file exists.
    pub fn from_settings(settings: &Settings) -> Result<Self, PersonalizationUnavailable> {
        let alpha = settings.conversion.personalization_level.alpha();
        if alpha == 0.0 {
            return Err(PersonalizationUnavailable::Off);
        }
        let prefix = settings
            .paths
            .personal_model_prefix
            .as_deref()
            .ok_or(PersonalizationUnavailable::NoModelPrefix)?;
        for suffix in PERSONAL_MODEL_SUFFIXES {
            let path = model_file(prefix, suffix);
            if !path.exists() {
                return Err(PersonalizationUnavailable::MissingFile(path));
            }
        }
        Ok(PersonalizationMode {
            base_model_prefix: settings.paths.base_model_prefix.clone(),
            personal_model_prefix: prefix.to_path_buf(),
            alpha,
        })
    }
}

/// Per-request options derived from the settings snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequestOptions {
    pub learning: LearningType,
    pub memory_dir: Option<PathBuf>,
    pub personalization: Option<PersonalizationMode>,
    pub inference_limit: usize,
    pub request_rich_candidates: bool,
    pub japanese_prediction: PredictionMode,
    pub english_prediction: PredictionMode,
    pub left_side_context: Option<String>,
}

impl ConvertRequestOptions {
    pub fn new(settings: &Settings, personalization: Option<PersonalizationMode>) -> Self {
        let prediction = if settings.debug.predictive_typing {
            PredictionMode::ManualMix
        } else {
            PredictionMode::Disabled
        };
        ConvertRequestOptions {
            learning: settings.conversion.learning,
            memory_dir: settings.paths.memory_dir.clone(),
            personalization,
            inference_limit: settings.conversion.inference_limit,
            request_rich_candidates: false,
            japanese_prediction: prediction,
            english_prediction: prediction,
            left_side_context: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionResult {
    /// Candidates covering the whole requested text.
    pub main_results: Vec<Candidate>,
    /// Guesses for the leading segment only.
    pub first_clause_results: Vec<Candidate>,
    pub prediction_results: Vec<Candidate>,
}

pub trait ConversionEngine {
    fn request_candidates(
        &mut self,
        text: &ComposingText,
        options: &ConvertRequestOptions,
    ) -> ConversionResult;

    /// Replace the per-request dictionary overlay.
    fn import_dynamic_user_dictionary(&mut self, entries: Vec<DictEntry>, shortcuts: Vec<DictEntry>);

    fn set_completed_data(&mut self, candidate: &Candidate);
    fn update_learning_data(&mut self, candidate: &Candidate);
    fn forget_memory(&mut self, candidate: &Candidate);
    fn stop_composition(&mut self);
    fn commit_update_learning_data(&mut self);
}
