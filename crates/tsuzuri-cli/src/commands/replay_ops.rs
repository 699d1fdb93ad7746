use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use tsuzuri_engine::{
    default_settings, load_settings_file, CandidateWindow, Controller, DictionaryEngine,
    KeyEvent, KeyResponse, MemoryTextClient, Settings,
};

use crate::keyspec::{parse_key_spec, KeySpecError};

/// Candidates printed per step in text mode.
const SHOWN_CANDIDATES: usize = 5;
const MARKED_COLUMN: usize = 16;

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    Key(String, KeyEvent),
    /// `type <text>`: one text key per character.
    Type(String),
    /// `commit`: the host forces a commit.
    Commit,
}

/// Parse a script: one key spec per line, `#` starts a comment.
pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, (usize, KeySpecError)> {
    let mut lines = Vec::new();
    for (number, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(text) = line.strip_prefix("type ") {
            lines.push(ScriptLine::Type(text.to_string()));
        } else if line == "commit" {
            lines.push(ScriptLine::Commit);
        } else {
            let event = parse_key_spec(line).map_err(|e| (number + 1, e))?;
            lines.push(ScriptLine::Key(line.to_string(), event));
        }
    }
    Ok(lines)
}

#[derive(Debug, Serialize)]
pub struct Step {
    pub key: String,
    pub consumed: bool,
    pub state: String,
    pub marked: String,
    pub candidates: Vec<String>,
    pub selection: Option<usize>,
    pub committed: String,
}

fn step(key: String, state: String, response: &KeyResponse, committed: &str) -> Step {
    let (candidates, selection) = match &response.candidate_window {
        CandidateWindow::Hidden => (Vec::new(), None),
        CandidateWindow::Composing {
            candidates,
            selection,
        }
        | CandidateWindow::Selecting {
            candidates,
            selection,
        } => (
            candidates.iter().map(|c| c.text.clone()).collect(),
            Some(*selection),
        ),
    };
    Step {
        key,
        consumed: response.consumed,
        state,
        marked: response.marked_text.text(),
        candidates,
        selection,
        committed: committed.to_string(),
    }
}

/// Run every line through a fresh controller and collect the steps.
pub fn run_script(lines: &[ScriptLine], settings: Arc<Settings>) -> Vec<Step> {
    let mut controller = Controller::new(DictionaryEngine::new(), MemoryTextClient::new(), settings);
    controller.activate();

    let mut steps = Vec::new();
    let mut record = |controller: &mut Controller<DictionaryEngine, MemoryTextClient>,
                      key: String,
                      response: KeyResponse| {
        let state = format!("{:?}", controller.state());
        steps.push(step(key, state, &response, controller.client().text()));
    };
    for line in lines {
        match line {
            ScriptLine::Key(spec, event) => {
                let response = controller.handle_key(event);
                record(&mut controller, spec.clone(), response);
            }
            ScriptLine::Type(text) => {
                for c in text.chars() {
                    let response = controller.handle_key(&KeyEvent::text(&c.to_string()));
                    record(&mut controller, c.to_string(), response);
                }
            }
            ScriptLine::Commit => {
                let response = controller.commit_composition();
                record(&mut controller, "commit".to_string(), response);
            }
        }
    }
    steps
}

fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(w)))
}

fn print_text(steps: &[Step]) {
    let key_width = steps.iter().map(|s| s.key.width()).max().unwrap_or(0);
    for s in steps {
        let candidates: Vec<String> = s
            .candidates
            .iter()
            .take(SHOWN_CANDIDATES)
            .enumerate()
            .map(|(i, c)| {
                if Some(i) == s.selection {
                    format!("[{c}]")
                } else {
                    c.clone()
                }
            })
            .collect();
        println!(
            "{} {} {:<12} {} {}",
            pad(&s.key, key_width),
            if s.consumed { "*" } else { " " },
            s.state,
            pad(&s.marked, MARKED_COLUMN),
            candidates.join(" "),
        );
    }
    if let Some(last) = steps.last() {
        println!("committed: {}", last.committed);
    }
}

pub fn replay(script: &str, settings_file: Option<&str>, json: bool) {
    let source = die!(fs::read_to_string(script), "Error reading {script}: {}");
    let lines = die!(
        parse_script(&source).map_err(|(line, e)| format!("line {line}: {e}")),
        "Error in {script}: {}"
    );
    let settings = match settings_file {
        Some(path) => die!(load_settings_file(Path::new(path)), "Error loading settings: {}"),
        None => default_settings().clone(),
    };

    let steps = run_script(&lines, Arc::new(settings));
    if json {
        for s in &steps {
            let line = die!(serde_json::to_string(s), "Error serializing step: {}");
            println!("{line}");
        }
    } else {
        print_text(&steps);
    }
}
