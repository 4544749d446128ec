//! Summary of a run: one status line per sync and the process exit code.

use crate::engine::{SyncOutcome, SyncResult};
use crate::sysexits;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Report {
    results: Vec<SyncResult>,
}

impl Report {
    pub fn from_results(results: Vec<SyncResult>) -> Self {
        Self { results }
    }

    /// Names of the syncs that did not succeed, in run order.
    pub fn failed_names(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    fn is_dry_run(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.dry_run)
    }

    /// 0 if every sync succeeded (or would run), 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.failed_names().is_empty() {
            0
        } else {
            sysexits::EX_FAILURE
        }
    }

    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dry_run() {
            writeln!(f, "Dry run mode - would execute the following:")?;
        }
        for result in &self.results {
            writeln!(f, "{}", status_line(result))?;
        }
        if self.is_dry_run() {
            return Ok(());
        }

        writeln!(
            f,
            "\nCompleted: {}/{} syncs successful",
            self.success_count(),
            self.results.len()
        )?;
        let failed = self.failed_names();
        if !failed.is_empty() {
            writeln!(f, "Failed syncs: {}", failed.join(", "))?;
            writeln!(f, "Re-run them with: arsync {}", failed.join(" "))?;
        }
        Ok(())
    }
}

fn status_line(result: &SyncResult) -> String {
    let name = &result.name;
    match &result.outcome {
        SyncOutcome::Succeeded => {
            format!("✓ {name}: Success ({})", format_elapsed(result.elapsed))
        }
        SyncOutcome::WouldRun => format!("  {name}: {}", result.command),
        SyncOutcome::Failed { code } => format!("✗ {name}: Failed with exit code {code}"),
        SyncOutcome::Interrupted { signal: Some(signal) } => {
            format!("✗ {name}: Interrupted by signal {signal}")
        }
        SyncOutcome::Interrupted { signal: None } => format!("✗ {name}: Interrupted"),
        SyncOutcome::LaunchFailed { reason } => format!("✗ {name}: Failed - {reason}"),
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}
