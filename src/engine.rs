//! Launching rsync for each selected sync.
//!
//! Every sync becomes one child process with an explicit argument vector;
//! no shell is involved. In parallel mode all children are started at once
//! and the engine waits for every one of them. In sequential mode each child
//! must exit before the next starts. A failing child never stops the others.
//!
//! While children run, an interrupt from the terminal does not end arsync:
//! the children receive it too and are reported as interrupted. In
//! sequential mode no further sync is started after an interrupt.

use crate::config::GlobalConfig;
use crate::error::{ArsyncError, Result};
use crate::path::is_remote;
use crate::registry::SyncSpec;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::runtime::Builder;
use tokio::task::JoinHandle;

/// Private keys ssh tries by default.
const SSH_KEY_NAMES: [&str; 3] = ["id_rsa", "id_ecdsa", "id_ed25519"];

/// How the selected syncs are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Only show the commands.
    pub dry_run: bool,
    /// Start all syncs at once instead of one after another.
    pub parallel: bool,
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            dry_run: false,
            parallel: true,
        }
    }
}

/// A program and its arguments, exactly as they are passed to the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quotes `arg` for display so that it can be pasted into a POSIX shell.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@=+,%~".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// What happened to one sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// rsync exited with status 0.
    Succeeded,
    /// rsync exited with a non-zero status.
    Failed { code: i32 },
    /// rsync was terminated by a signal.
    Interrupted { signal: Option<i32> },
    /// rsync could not be started or waited on.
    LaunchFailed { reason: String },
    /// Dry run; nothing was launched.
    WouldRun,
}

impl SyncOutcome {
    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return SyncOutcome::Succeeded;
        }
        if let Some(code) = status.code() {
            return SyncOutcome::Failed { code };
        }
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;
        SyncOutcome::Interrupted { signal }
    }

    /// True for a successful run and for a dry run.
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Succeeded | SyncOutcome::WouldRun)
    }
}

/// Result of one sync.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub name: String,
    pub command: Invocation,
    pub outcome: SyncOutcome,
    pub elapsed: Duration,
    pub dry_run: bool,
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Builds and runs rsync invocations.
#[derive(Debug, Clone)]
pub struct Engine {
    global: GlobalConfig,
    mode: Mode,
    ssh_dir: Option<PathBuf>,
    interrupted: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(global: GlobalConfig, mode: Mode) -> Self {
        Self {
            global,
            mode,
            ssh_dir: dirs::home_dir().map(|home| home.join(".ssh")),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The rsync command for `spec`: flags, then source, then destination,
    /// each flag word as its own argument.
    pub fn command(&self, spec: &SyncSpec) -> Invocation {
        let flags = spec.effective_flags(&self.global);
        let mut args: Vec<String> = flags.split_whitespace().map(String::from).collect();
        args.push(spec.source.clone());
        args.push(spec.destination.clone());
        Invocation {
            program: self.global.rsync_path.clone(),
            args,
        }
    }

    /// Runs `specs` and returns one result per spec, in the same order.
    ///
    /// A runtime is only started when something is actually launched.
    pub fn run(&self, specs: Vec<SyncSpec>) -> Result<Vec<SyncResult>> {
        if self.mode.dry_run {
            return Ok(self.dry_run(&specs));
        }
        let rt = Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(ArsyncError::Runtime)?;
        Ok(rt.block_on(async {
            let watcher = self.watch_interrupts();
            let results = self.run_async(specs).await;
            if let Some(watcher) = watcher {
                watcher.abort();
            }
            results
        }))
    }

    /// Catches terminal interrupts for the lifetime of the returned task.
    ///
    /// The handler is installed before this returns, so no child can be
    /// started while arsync still has the default SIGINT disposition.
    #[cfg(unix)]
    fn watch_interrupts(&self) -> Option<JoinHandle<()>> {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(sigint) => sigint,
            Err(e) => {
                tracing::warn!("Cannot watch for interrupts: {e}");
                return None;
            }
        };
        let interrupted = Arc::clone(&self.interrupted);
        Some(tokio::spawn(async move {
            while sigint.recv().await.is_some() {
                interrupted.store(true, Ordering::SeqCst);
                tracing::warn!("Interrupted, waiting for running syncs to exit");
            }
        }))
    }

    #[cfg(not(unix))]
    fn watch_interrupts(&self) -> Option<JoinHandle<()>> {
        let interrupted = Arc::clone(&self.interrupted);
        Some(tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
                tracing::warn!("Interrupted, waiting for running syncs to exit");
            }
        }))
    }

    /// Marks the run as interrupted, as a terminal interrupt does.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Async counterpart of [`Engine::run`].
    pub async fn run_async(&self, specs: Vec<SyncSpec>) -> Vec<SyncResult> {
        if self.mode.dry_run {
            self.dry_run(&specs)
        } else if self.mode.parallel && specs.len() > 1 {
            self.run_parallel(specs).await
        } else {
            self.run_sequential(specs).await
        }
    }

    fn dry_run(&self, specs: &[SyncSpec]) -> Vec<SyncResult> {
        specs
            .iter()
            .map(|spec| SyncResult {
                name: spec.name.clone(),
                command: self.command(spec),
                outcome: SyncOutcome::WouldRun,
                elapsed: Duration::ZERO,
                dry_run: true,
            })
            .collect()
    }

    async fn run_sequential(&self, specs: Vec<SyncSpec>) -> Vec<SyncResult> {
        let mut results = Vec::with_capacity(specs.len());
        for spec in specs {
            let command = self.prepare(&spec);
            if self.is_interrupted() {
                tracing::info!("Skipping sync '{}' after interrupt", spec.name);
                results.push(SyncResult {
                    name: spec.name,
                    command,
                    outcome: SyncOutcome::Interrupted { signal: None },
                    elapsed: Duration::ZERO,
                    dry_run: false,
                });
                continue;
            }
            results.push(launch(spec.name, command).await);
        }
        results
    }

    async fn run_parallel(&self, specs: Vec<SyncSpec>) -> Vec<SyncResult> {
        // Every task is spawned before any is awaited, so all children run
        // concurrently; awaiting the handles in order restores input order.
        let handles: Vec<_> = specs
            .into_iter()
            .map(|spec| {
                let command = self.prepare(&spec);
                let name = spec.name.clone();
                let handle = tokio::spawn(launch(spec.name, command.clone()));
                (name, command, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, command, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => SyncResult {
                    name,
                    command,
                    outcome: SyncOutcome::LaunchFailed {
                        reason: format!("sync task failed: {e}"),
                    },
                    elapsed: Duration::ZERO,
                    dry_run: false,
                },
            };
            results.push(result);
        }
        results
    }

    fn prepare(&self, spec: &SyncSpec) -> Invocation {
        let command = self.command(spec);
        tracing::debug!("Command for '{}': {:?}", spec.name, command.args);
        if (is_remote(&spec.source) || is_remote(&spec.destination)) && !self.has_ssh_key() {
            tracing::warn!(
                "No SSH key found for remote sync '{}', ssh may prompt for a password",
                spec.name
            );
        }
        command
    }

    fn has_ssh_key(&self) -> bool {
        self.ssh_dir
            .as_ref()
            .is_some_and(|dir| SSH_KEY_NAMES.iter().any(|key| dir.join(key).exists()))
    }
}

/// Runs one rsync child with inherited stdio and waits for it to exit.
async fn launch(name: String, command: Invocation) -> SyncResult {
    println!("Running sync '{name}': {command}");
    let started = Instant::now();
    let status = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await;
    let elapsed = started.elapsed();

    let outcome = match status {
        Ok(status) => SyncOutcome::from_status(status),
        Err(e) => SyncOutcome::LaunchFailed {
            reason: format!("could not run {}: {e}", command.program),
        },
    };
    tracing::info!("Sync '{name}' finished after {elapsed:?}: {outcome:?}");
    SyncResult {
        name,
        command,
        outcome,
        elapsed,
        dry_run: false,
    }
}
