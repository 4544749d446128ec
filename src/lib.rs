//! arsync: run named rsync operations declared in a YAML file.
//!
//! The crate loads the configuration ([`config`]), substitutes `${NAME}`
//! variables and expands local paths ([`variables`], [`path`]), selects syncs
//! by name ([`registry`]), runs rsync for each ([`engine`]) and summarizes the
//! outcome ([`report`]).

pub mod commands;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod logging;
pub mod path;
pub mod registry;
pub mod report;
pub mod sysexits;
pub mod variables;

pub use error::{ArsyncError, Result};
