use std::fs;

use tsuzuri_engine::tsuzuri_core::date_shortcuts::{date_shortcuts, today_local};
use tsuzuri_engine::tsuzuri_core::romaji;
use tsuzuri_engine::tsuzuri_core::settings;

pub fn romaji_export() {
    print!("{}", romaji::default_toml());
}

pub fn romaji_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let map = die!(romaji::parse_romaji_toml(&content), "Error: {}");
    println!("OK: {} mappings", map.len());
}

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: live_conversion={}, candidate_page_size={}, ai.backend={:?}, user_dictionary={}",
        s.conversion.live_conversion,
        s.conversion.candidate_page_size,
        s.ai.backend,
        s.user_dictionary.len() + s.system_user_dictionary.len()
    );
}

pub fn shortcuts() {
    for entry in date_shortcuts(today_local()) {
        println!("{}\t{}\t{:.1}", entry.ruby, entry.word, entry.value);
    }
}
