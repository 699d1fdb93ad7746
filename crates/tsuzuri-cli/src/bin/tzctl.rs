use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tsuzuri_cli::commands::{config_ops, key_ops, replay_ops};

#[derive(Parser)]
#[command(name = "tzctl", about = "Tsuzuri input session diagnostics")]
struct Cli {
    /// Write a JSON trace under this directory (needs the `trace` feature)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the action each key spec resolves to
    Resolve {
        /// Key specs such as `k`, `space`, `ctrl+shift+r`
        #[arg(required = true)]
        specs: Vec<String>,
        /// Resolve as if the input language were English
        #[arg(long)]
        english: bool,
    },
    /// Run a key script through a controller and show each step
    Replay {
        /// Script file: one key spec, `type <text>` or `commit` per line
        script: String,
        /// Settings TOML file (defaults when omitted)
        #[arg(long)]
        settings: Option<String>,
        /// Output JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Export or validate settings
    Settings {
        #[command(subcommand)]
        action: TomlAction,
    },
    /// Export or validate a romaji table
    Romaji {
        #[command(subcommand)]
        action: TomlAction,
    },
    /// Print today's date shortcuts
    Shortcuts,
}

#[derive(Subcommand)]
enum TomlAction {
    /// Print the embedded defaults as TOML
    Export,
    /// Check a TOML file
    Validate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Some(dir) = &cli.trace_dir {
        tsuzuri_engine::trace_init::init_tracing(dir);
    }

    match cli.command {
        Command::Resolve { specs, english } => key_ops::resolve(&specs, english),
        Command::Replay {
            script,
            settings,
            json,
        } => replay_ops::replay(&script, settings.as_deref(), json),
        Command::Settings { action } => match action {
            TomlAction::Export => config_ops::settings_export(),
            TomlAction::Validate { file } => config_ops::settings_validate(&file),
        },
        Command::Romaji { action } => match action {
            TomlAction::Export => config_ops::romaji_export(),
            TomlAction::Validate { file } => config_ops::romaji_validate(&file),
        },
        Command::Shortcuts => config_ops::shortcuts(),
    }
}
