//! Command-line interface definition for arsync.
//!
//! This module defines the CLI arguments and the handlers for listing syncs,
//! printing shell completion, and running syncs.

use crate::config;
use crate::constants::PKG_NAME;
use crate::engine::{Engine, Mode};
use crate::error::ArsyncError;
use crate::path::PathContext;
use crate::registry::{Selection, SyncRegistry};
use crate::report::Report;
use crate::sysexits;
use crate::variables;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::{self, Write};
use std::path::PathBuf;

/// Positional keyword that prints bash completion instead of running syncs.
pub const REFRESH: &str = "refresh";

const EXAMPLES: &str = "\
Examples:
  arsync                     Run all syncs
  arsync debian              Run only the 'debian' sync
  arsync debian ubuntu       Run several syncs
  arsync --list              List available syncs
  arsync -c ./arsync.conf    Use another configuration file
  arsync refresh > ~/.local/share/bash-completion/completions/arsync";

/// Run rsync operations declared in a YAML configuration file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    /// Sync names to run (default: all), or `refresh` to print bash completion.
    pub sync_names: Vec<String>,
    /// Path to the configuration file [default: ~/.config/arsync.conf]
    #[arg(short, long, env = "ARSYNC_CONFIG")]
    pub config: Option<PathBuf>,
    /// List available sync operations.
    #[arg(short, long)]
    pub list: bool,
    /// Run syncs one after another instead of all at once.
    #[arg(long)]
    pub no_parallel: bool,
    /// Show the rsync commands without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
    /// Log more details to stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        Mode {
            dry_run: self.dry_run,
            parallel: !self.no_parallel,
        }
    }

    fn is_refresh(&self) -> bool {
        self.sync_names.first().is_some_and(|name| name == REFRESH)
    }
}

/// Dispatches the parsed command line and returns the process exit code.
pub fn execute(cli: Cli) -> Result<i32> {
    if cli.is_refresh() {
        let names = match load_registry(cli.config.clone()) {
            Ok(registry) => registry.list_names(),
            Err(e) => {
                tracing::warn!("Completion will not include sync names: {e}");
                Vec::new()
            }
        };
        refresh(&names, &mut io::stdout().lock())?;
        return Ok(0);
    }

    let registry = load_registry(cli.config.clone())?;
    if cli.list {
        list(&registry, &mut io::stdout().lock())?;
        return Ok(0);
    }

    let mode = cli.mode();
    run(&registry, cli.sync_names, mode)
}

/// Loads, validates and resolves the configuration file.
pub fn load_registry(config_path: Option<PathBuf>) -> Result<SyncRegistry, ArsyncError> {
    let path = match config_path {
        Some(path) => path,
        None => config::default_path()?,
    };
    let raw = config::load(&path)?;
    let ctx = PathContext::from_env().map_err(ArsyncError::WorkingDirectory)?;
    variables::resolve(raw, &ctx)
}

/// Prints the names of all syncs.
pub fn list(registry: &SyncRegistry, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Available sync operations:").context("Failed to write sync list")?;
    for name in registry.list_names() {
        writeln!(out, "  - {name}").context("Failed to write sync list")?;
    }
    Ok(())
}

/// True for names that bash can complete without any quoting.
fn is_completion_word(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.+@,:".contains(c))
}

/// Prints a bash completion script that knows the given sync names.
///
/// `compgen -W` expands its word list, so names with shell syntax in them
/// are left out of the script.
pub fn refresh(names: &[String], out: &mut impl Write) -> Result<()> {
    let mut words = Vec::with_capacity(names.len() + 8);
    for name in names {
        if is_completion_word(name) {
            words.push(name.clone());
        } else {
            tracing::warn!("Sync '{name}' left out of completion, its name needs quoting");
        }
    }
    let completed = words.len();
    words.push(REFRESH.to_string());
    words.extend(
        [
            "--config",
            "--list",
            "--no-parallel",
            "--dry-run",
            "--verbose",
            "--help",
            "--version",
        ]
        .map(String::from),
    );
    let script = format!(
        r#"_{PKG_NAME}() {{
    local cur="${{COMP_WORDS[COMP_CWORD]}}"
    local prev="${{COMP_WORDS[COMP_CWORD-1]}}"
    case "$prev" in
        -c|--config)
            COMPREPLY=($(compgen -f -- "$cur"))
            return
            ;;
    esac
    COMPREPLY=($(compgen -W "{words}" -- "$cur"))
}}
complete -F _{PKG_NAME} {PKG_NAME}
"#,
        words = words.join(" ")
    );
    out.write_all(script.as_bytes())
        .context("Failed to write completion script")?;
    tracing::info!("Printed bash completion for {completed} sync(s)");
    Ok(())
}

/// Runs the selected syncs and prints the report.
///
/// Unknown names abort before anything is launched.
pub fn run(registry: &SyncRegistry, names: Vec<String>, mode: Mode) -> Result<i32> {
    let selection = Selection::from_names(names);
    if selection == Selection::All && registry.is_empty() {
        eprintln!("No sync operations defined in configuration");
        return Ok(sysexits::EX_FAILURE);
    }
    let specs = registry.resolve_targets(&selection)?;
    let engine = Engine::new(registry.global().clone(), mode);
    let report = Report::from_results(engine.run(specs)?);
    report.print();
    Ok(report.exit_code())
}
