//! Session settings loaded from TOML.
//!
//! - `parse_settings_toml(toml)` overlays a user file on the embedded defaults
//! - `default_settings()` returns the `&'static Settings` built from the defaults
//! - Defaults are embedded via `include_str!("default_settings.toml")`
//!
//! A `Settings` value is a read-only snapshot: the session layer receives one
//! and never writes back to it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

/// Settings built from the embedded defaults only.
pub fn default_settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        parse_settings_toml("").expect("embedded settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("cannot read settings file: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub conversion: ConversionSettings,
    pub input: InputSettings,
    pub debug: DebugSettings,
    pub ai: AiSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub user_dictionary: Vec<UserDictionaryEntry>,
    #[serde(default)]
    pub system_user_dictionary: Vec<UserDictionaryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversionSettings {
    pub live_conversion: bool,
    pub learning: LearningType,
    pub personalization_level: PersonalizationLevel,
    pub inference_limit: usize,
    pub candidate_page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    pub punctuation_style: PunctuationStyle,
    pub type_back_slash: bool,
    pub type_half_space: bool,
    pub input_style: InputStyleSetting,
    pub keyboard_layout: KeyboardLayout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugSettings {
    pub debug_window: bool,
    pub predictive_typing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    pub backend: AiBackendPreference,
    pub model_name: String,
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathSettings {
    #[serde(default)]
    pub memory_dir: Option<PathBuf>,
    /// Path prefix of the personal n-gram model files (`<prefix>_c_abc.marisa`, ...).
    #[serde(default)]
    pub personal_model_prefix: Option<PathBuf>,
    #[serde(default)]
    pub base_model_prefix: Option<PathBuf>,
    #[serde(default)]
    pub custom_romaji_table: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserDictionaryEntry {
    pub word: String,
    pub reading: String,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningType {
    InputAndOutput,
    OnlyOutput,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalizationLevel {
    Off,
    Soft,
    Normal,
    Hard,
}

impl PersonalizationLevel {
    /// Blend weight of the personal model against the base model.
    pub fn alpha(self) -> f32 {
        match self {
            PersonalizationLevel::Off => 0.0,
            PersonalizationLevel::Soft => 0.5,
            PersonalizationLevel::Normal => 1.0,
            PersonalizationLevel::Hard => 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctuationStyle {
    /// 。、
    KutenAndToten,
    /// 。，
    KutenAndComma,
    /// ．、
    PeriodAndToten,
    /// ．，
    PeriodAndComma,
}

impl PunctuationStyle {
    pub fn comma(self) -> char {
        match self {
            PunctuationStyle::KutenAndComma | PunctuationStyle::PeriodAndComma => '，',
            PunctuationStyle::KutenAndToten | PunctuationStyle::PeriodAndToten => '、',
        }
    }

    pub fn period(self) -> char {
        match self {
            PunctuationStyle::PeriodAndToten | PunctuationStyle::PeriodAndComma => '．',
            PunctuationStyle::KutenAndToten | PunctuationStyle::KutenAndComma => '。',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStyleSetting {
    Default,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardLayout {
    Qwerty,
    Australian,
    British,
    Colemak,
    Dvorak,
    DvorakQwertyCommand,
}

impl KeyboardLayout {
    /// Identifier of the host keyboard layout to force while the IME is active.
    pub fn layout_identifier(self) -> &'static str {
        match self {
            KeyboardLayout::Qwerty => "com.apple.keylayout.US",
            KeyboardLayout::Australian => "com.apple.keylayout.Australian",
            KeyboardLayout::British => "com.apple.keylayout.British",
            KeyboardLayout::Colemak => "com.apple.keylayout.Colemak",
            KeyboardLayout::Dvorak => "com.apple.keylayout.Dvorak",
            KeyboardLayout::DvorakQwertyCommand => "com.apple.keylayout.DVORAK-QWERTYCMD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiBackendPreference {
    Off,
    FoundationModels,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Settings {
    pub fn suggestion_enabled(&self) -> bool {
        self.ai.backend != AiBackendPreference::Off
    }

    /// Whether the custom romaji table is requested. The resolver then passes
    /// ASCII symbols through untouched so the table sees them.
    pub fn preserve_ascii_symbol_keys(&self) -> bool {
        self.input.input_style == InputStyleSetting::Custom
            && self.paths.custom_romaji_table.is_some()
    }
}

/// Parse a settings file and overlay it on the embedded defaults.
pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let mut merged: toml::Table = DEFAULT_SETTINGS_TOML
        .parse()
        .map_err(|e: toml::de::Error| SettingsError::Parse(e.to_string()))?;
    let user: toml::Table = toml_str
        .parse()
        .map_err(|e: toml::de::Error| SettingsError::Parse(e.to_string()))?;
    overlay(&mut merged, user);

    let s: Settings = toml::Value::Table(merged)
        .try_into()
        .map_err(|e: toml::de::Error| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

pub fn load_settings_file(path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path)
        .map_err(|e| SettingsError::Io(format!("{}: {e}", path.display())))?;
    parse_settings_toml(&content)
}

fn overlay(base: &mut toml::Table, user: toml::Table) {
    for (key, value) in user {
        match value {
            toml::Value::Table(user_sub) => match base.get_mut(&key) {
                Some(toml::Value::Table(base_sub)) => overlay(base_sub, user_sub),
                _ => {
                    base.insert(key, toml::Value::Table(user_sub));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive_usize!(conversion.inference_limit);
    check_positive_usize!(conversion.candidate_page_size);
    if s.conversion.candidate_page_size > 9 {
        return Err(SettingsError::InvalidValue {
            field: "conversion.candidate_page_size".to_string(),
            reason: "must be at most 9 (one digit key per row)".to_string(),
        });
    }

    if s.ai.backend == AiBackendPreference::OpenAi && s.ai.endpoint.trim().is_empty() {
        return Err(SettingsError::InvalidValue {
            field: "ai.endpoint".to_string(),
            reason: "must be set when backend is openai".to_string(),
        });
    }

    for (table, entries) in [
        ("user_dictionary", &s.user_dictionary),
        ("system_user_dictionary", &s.system_user_dictionary),
    ] {
        for (i, entry) in entries.iter().enumerate() {
            if entry.word.is_empty() || entry.reading.is_empty() {
                return Err(SettingsError::InvalidValue {
                    field: format!("{table}[{i}]"),
                    reason: "word and reading must be non-empty".to_string(),
                });
            }
        }
    }

    Ok(())
}
