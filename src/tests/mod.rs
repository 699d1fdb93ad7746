
use std::sync::Arc;
use std::time::Instant;

use tsuzuri_core::candidate::DictEntry;
use tsuzuri_core::composing::Modifiers;
use tsuzuri_core::engine::DictionaryEngine;
use tsuzuri_core::settings::parse_settings_toml;
use tsuzuri_session::types::key;
use tsuzuri_session::KeyEvent;

use crate::client::MemoryTextClient;
use crate::controller::{Controller, KeyResponse};

pub(crate) type TestController = Controller<DictionaryEngine, MemoryTextClient>;

pub(crate) fn words() -> Vec<DictEntry> {
    vec![
        DictEntry::proper_noun("今日", "きょう", -10.0),
        DictEntry::proper_noun("京", "きょう", -12.0),
        DictEntry::proper_noun("今日は", "きょうは", -11.0),
        DictEntry::proper_noun("教会", "きょうかい", -13.0),
        DictEntry::proper_noun("天気", "てんき", -10.0),
        DictEntry::proper_noun("木", "き", -9.0),
        DictEntry::proper_noun("書く", "かく", -9.0),
    ]
}

pub(crate) fn controller(toml: &str) -> TestController {
    let settings = Arc::new(parse_settings_toml(toml).unwrap());
    let mut c = Controller::new(
        DictionaryEngine::with_entries(words()),
        MemoryTextClient::new(),
        settings,
    );
    c.activate();
    c
}

pub(crate) fn type_text(c: &mut TestController, text: &str) -> KeyResponse {
    let mut last = None;
    for ch in text.chars() {
        last = Some(c.handle_key(&KeyEvent::text(&ch.to_string())));
    }
    last.expect("typed at least one key")
}

pub(crate) fn press(c: &mut TestController, code: u16) -> KeyResponse {
    c.handle_key(&KeyEvent::code(code, Modifiers::NONE))
}

pub(crate) fn press_shifted(c: &mut TestController, code: u16) -> KeyResponse {
    c.handle_key(&KeyEvent::code(code, Modifiers::SHIFT))
}

pub(crate) fn press_at(c: &mut TestController, code: u16, at: Instant) -> KeyResponse {
    c.handle_key_at(&KeyEvent::code(code, Modifiers::NONE), at)
}

pub(crate) fn digit(c: &mut TestController, n: usize) -> KeyResponse {
    let text = ((n % 10) as u8 + b'0') as char;
    let code = key::DIGITS[(n + 9) % 10];
    c.handle_key(&KeyEvent::new(code, &text.to_string(), Modifiers::NONE))
}

pub(crate) fn control(c: &mut TestController, logical: &str, shift: bool) -> KeyResponse {
    let modifiers = Modifiers {
        shift,
        ..Modifiers::CONTROL
    };
    c.handle_key(&KeyEvent::new(key::ANSI_A, logical, modifiers))
}
