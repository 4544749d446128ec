//! Loading of the arsync configuration file.
//!
//! The YAML document is parsed into a generic tree first and then checked
//! section by section, so that a single error can report every structural
//! problem in the file at once. Variable substitution and path expansion
//! happen later, in [`crate::variables`].

use crate::constants::{CONFIG_NAME, DEFAULT_RSYNC_FLAGS, DEFAULT_RSYNC_PATH};
use crate::error::{ArsyncError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Settings from the `config` section that apply to every sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Flags used by syncs that do not set their own.
    pub rsync_flags: String,
    /// Program invoked for each sync.
    pub rsync_path: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rsync_flags: DEFAULT_RSYNC_FLAGS.to_string(),
            rsync_path: DEFAULT_RSYNC_PATH.to_string(),
        }
    }
}

/// One entry of the `sync` section, before variables are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSync {
    pub src: String,
    pub dest: String,
    pub rsync_flags: Option<String>,
}

/// A configuration file that has the right shape.
#[derive(Debug, Clone)]
pub struct RawConfig {
    /// Path the configuration was read from.
    pub path: PathBuf,
    /// `NAME = "value"` entries in declaration order.
    pub variables: Vec<String>,
    pub global: GlobalConfig,
    /// Sync entries in declaration order.
    pub syncs: IndexMap<String, RawSync>,
}

/// Top-level sections of the document. Unknown keys are ignored.
#[derive(Deserialize, Debug, Default)]
struct Document {
    #[serde(default)]
    variables: Option<Value>,
    #[serde(default)]
    config: Option<Value>,
    #[serde(default)]
    sync: Option<Value>,
}

/// Returns the default configuration file, `~/.config/arsync.conf`.
pub fn default_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".config").join(CONFIG_NAME))
        .ok_or(ArsyncError::NoHomeDirectory)
}

/// Reads and validates the configuration file at `path`.
pub fn load(path: &Path) -> Result<RawConfig> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ArsyncError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => ArsyncError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let config = parse(path, &text)?;
    tracing::debug!(
        "Loaded {} sync(s) and {} variable(s) from {}",
        config.syncs.len(),
        config.variables.len(),
        path.display()
    );
    Ok(config)
}

/// Parses configuration text. `path` is only used in error messages.
pub fn parse(path: &Path, text: &str) -> Result<RawConfig> {
    let value: Value = serde_yaml_ng::from_str(text).map_err(|source| ArsyncError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    let schema_error = |problems: Vec<String>| ArsyncError::ConfigSchema {
        path: path.to_path_buf(),
        problems,
    };

    let document: Document = match value {
        Value::Null => return Err(schema_error(vec!["the file is empty".into()])),
        Value::Mapping(_) => serde_yaml_ng::from_value(value)
            .map_err(|e| schema_error(vec![format!("unexpected document layout: {e}")]))?,
        _ => {
            return Err(schema_error(vec![
                "the top level must be a mapping with a 'sync' section".into(),
            ]));
        }
    };

    let mut problems = vec![];
    let variables = check_variables(document.variables.as_ref(), &mut problems);
    let global = check_global(document.config.as_ref(), &mut problems);
    let syncs = check_syncs(document.sync.as_ref(), &mut problems);

    if !problems.is_empty() {
        return Err(schema_error(problems));
    }
    Ok(RawConfig {
        path: path.to_path_buf(),
        variables,
        global,
        syncs,
    })
}

fn check_variables(value: Option<&Value>, problems: &mut Vec<String>) -> Vec<String> {
    let entries = match value {
        None | Some(Value::Null) => return vec![],
        Some(Value::Sequence(entries)) => entries,
        Some(_) => {
            problems.push("'variables' must be a list of NAME = \"value\" strings".into());
            return vec![];
        }
    };
    let mut variables = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match entry.as_str() {
            Some(s) => variables.push(s.to_string()),
            None => problems.push(format!("variables[{i}] must be a string")),
        }
    }
    variables
}

fn check_global(value: Option<&Value>, problems: &mut Vec<String>) -> GlobalConfig {
    let mut global = GlobalConfig::default();
    match value {
        None | Some(Value::Null) => {}
        Some(section) if section.is_mapping() => {
            if let Some(flags) = optional_string(section, "rsync_flags", "config", problems) {
                global.rsync_flags = flags;
            }
            if let Some(program) = optional_string(section, "rsync_path", "config", problems) {
                global.rsync_path = program;
            }
        }
        Some(_) => problems.push("'config' must be a mapping".into()),
    }
    global
}

fn check_syncs(value: Option<&Value>, problems: &mut Vec<String>) -> IndexMap<String, RawSync> {
    let mut syncs = IndexMap::new();
    let section = match value {
        None => {
            problems.push("missing required 'sync' section".into());
            return syncs;
        }
        Some(Value::Mapping(section)) => section,
        Some(_) => {
            problems.push("'sync' must be a mapping of sync names to src/dest entries".into());
            return syncs;
        }
    };

    for (key, entry) in section {
        let Some(name) = key_name(key) else {
            problems.push(format!("sync name {key:?} must be a string"));
            continue;
        };
        if !entry.is_mapping() {
            problems.push(format!("sync '{name}' must be a mapping with 'src' and 'dest'"));
            continue;
        }
        let context = format!("sync '{name}'");
        let src = required_string(entry, "src", &context, problems);
        let dest = required_string(entry, "dest", &context, problems);
        let rsync_flags = optional_string(entry, "rsync_flags", &context, problems);
        if let (Some(src), Some(dest)) = (src, dest) {
            syncs.insert(
                name,
                RawSync {
                    src,
                    dest,
                    rsync_flags,
                },
            );
        }
    }
    syncs
}

fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn required_string(
    section: &Value,
    key: &str,
    context: &str,
    problems: &mut Vec<String>,
) -> Option<String> {
    match section.get(key) {
        None | Some(Value::Null) => {
            problems.push(format!("{context} is missing '{key}'"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            problems.push(format!("{context}: '{key}' must be a string"));
            None
        }
    }
}

fn optional_string(
    section: &Value,
    key: &str,
    context: &str,
    problems: &mut Vec<String>,
) -> Option<String> {
    match section.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            problems.push(format!("{context}: '{key}' must be a string"));
            None
        }
    }
}
