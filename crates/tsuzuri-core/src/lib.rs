pub mod candidate;
pub mod composing;
pub mod date_shortcuts;
pub mod diacritic;
pub mod engine;
pub mod romaji;
pub mod settings;
pub mod unicode;
