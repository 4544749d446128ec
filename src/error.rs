//! Error type shared by every stage that runs before a sync is launched.
//!
//! Failures of the rsync processes themselves are not errors: they are recorded
//! per sync in [`crate::engine::SyncOutcome`] and never abort sibling syncs.

use crate::sysexits;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Unified result type for the configuration and resolution stages.
pub type Result<T> = std::result::Result<T, ArsyncError>;

#[derive(Error, Debug)]
pub enum ArsyncError {
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Cannot locate the default configuration file without a home directory, pass --config")]
    NoHomeDirectory,

    #[error("Failed to read configuration file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML in configuration file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error(
        "Invalid configuration file {}:\n  - {}",
        path.display(),
        problems.join("\n  - ")
    )]
    ConfigSchema { path: PathBuf, problems: Vec<String> },

    #[error("Invalid variable definition #{index} '{entry}': expected NAME = \"value\"")]
    VariableSyntax { index: usize, entry: String },

    #[error(
        "Unknown sync name(s): {}. Available syncs: {}",
        names.join(", "),
        available.join(", ")
    )]
    UnknownSyncName {
        names: Vec<String>,
        available: Vec<String>,
    },

    #[error("Cannot resolve relative paths, the working directory is unavailable: {0}")]
    WorkingDirectory(#[source] io::Error),

    #[error("Failed to start the async runtime: {0}")]
    Runtime(#[source] io::Error),
}

impl ArsyncError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ArsyncError::ConfigNotFound { .. } | ArsyncError::NoHomeDirectory => {
                sysexits::EX_NOINPUT
            }
            ArsyncError::ConfigRead { .. } => sysexits::EX_IOERR,
            ArsyncError::ConfigParse { .. } | ArsyncError::ConfigSchema { .. } => {
                sysexits::EX_CONFIG
            }
            ArsyncError::VariableSyntax { .. } => sysexits::EX_DATAERR,
            ArsyncError::UnknownSyncName { .. } => sysexits::EX_USAGE,
            ArsyncError::WorkingDirectory(_) => sysexits::EX_OSERR,
            ArsyncError::Runtime(_) => sysexits::EX_SOFTWARE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sync_name_lists_every_name() {
        let err = ArsyncError::UnknownSyncName {
            names: vec!["debain".into(), "ubnutu".into()],
            available: vec!["debian".into(), "ubuntu".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("debain, ubnutu"));
        assert!(msg.contains("Available syncs: debian, ubuntu"));
        assert_eq!(err.exit_code(), sysexits::EX_USAGE);
    }

    #[test]
    fn test_schema_error_lists_every_problem() {
        let err = ArsyncError::ConfigSchema {
            path: PathBuf::from("/tmp/arsync.conf"),
            problems: vec!["sync 'a' is missing 'src'".into(), "sync 'b' is missing 'dest'".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/arsync.conf"));
        assert!(msg.contains("  - sync 'a' is missing 'src'"));
        assert!(msg.contains("  - sync 'b' is missing 'dest'"));
        assert_eq!(err.exit_code(), sysexits::EX_CONFIG);
    }

    #[test]
    fn test_config_not_found_exit_code() {
        let err = ArsyncError::ConfigNotFound {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.exit_code(), sysexits::EX_NOINPUT);
        assert_eq!(err.to_string(), "Configuration file not found: /nope");
    }

    #[test]
    fn test_no_home_directory_asks_for_config() {
        let err = ArsyncError::NoHomeDirectory;
        assert_eq!(err.exit_code(), sysexits::EX_NOINPUT);
        assert!(err.to_string().contains("--config"));
    }
}
