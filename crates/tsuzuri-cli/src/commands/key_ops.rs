use tsuzuri_engine::tsuzuri_session::{KeyResolver, ResolverConfig};
use tsuzuri_engine::{default_settings, InputLanguage};

use crate::keyspec::parse_key_spec;

/// Print the action each key spec resolves to.
pub fn resolve(specs: &[String], english: bool) {
    let resolver = KeyResolver::new(ResolverConfig::from_settings(default_settings()));
    let language = if english {
        InputLanguage::English
    } else {
        InputLanguage::Japanese
    };
    for spec in specs {
        let event = die!(parse_key_spec(spec), "Error in `{spec}`: {}");
        println!("{spec}\t{:?}", resolver.resolve(&event, language));
    }
}
