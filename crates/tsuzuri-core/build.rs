const SETTINGS: &str = "src/default_settings.toml";
const ROMAJI: &str = "src/romaji/default_romaji.toml";

/// Sections every default settings file must carry.
const SETTINGS_SECTIONS: [&str; 4] = ["conversion", "input", "debug", "ai"];

fn main() {
    println!("cargo:rerun-if-changed={SETTINGS}");
    println!("cargo:rerun-if-changed={ROMAJI}");

    let settings = parse(SETTINGS, include_str!("src/default_settings.toml"));
    for section in SETTINGS_SECTIONS {
        if !settings.get(section).is_some_and(toml::Value::is_table) {
            panic!("{SETTINGS} is missing the [{section}] table");
        }
    }

    let romaji = parse(ROMAJI, include_str!("src/romaji/default_romaji.toml"));
    match romaji.get("mappings").and_then(toml::Value::as_table) {
        Some(mappings) if !mappings.is_empty() => {}
        _ => panic!("{ROMAJI} has no [mappings]"),
    }
}

fn parse(path: &str, content: &str) -> toml::Table {
    content
        .parse::<toml::Table>()
        .unwrap_or_else(|e| panic!("{path} contains invalid TOML: {e}"))
}
