use crate::config::GlobalConfig;
use crate::error::{ArsyncError, Result};
use indexmap::{IndexMap, IndexSet};

/// A sync with variables substituted and local paths expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSpec {
    /// Unique name from the `sync` section.
    pub name: String,
    /// Local absolute path or remote `host:path` spec.
    pub source: String,
    /// Local absolute path or remote `host:path` spec.
    pub destination: String,
    /// Overrides the global rsync flags when set.
    pub flags: Option<String>,
}

impl SyncSpec {
    /// Flags rsync receives for this sync.
    pub fn effective_flags<'a>(&'a self, global: &'a GlobalConfig) -> &'a str {
        self.flags.as_deref().unwrap_or(&global.rsync_flags)
    }
}

/// Which syncs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Names(Vec<String>),
}

impl Selection {
    /// An empty name list selects every sync.
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            Selection::All
        } else {
            Selection::Names(names)
        }
    }
}

/// The resolved syncs of one configuration file, in declaration order.
#[derive(Debug, Clone)]
pub struct SyncRegistry {
    global: GlobalConfig,
    specs: IndexMap<String, SyncSpec>,
}

impl SyncRegistry {
    pub fn new(global: GlobalConfig, specs: Vec<SyncSpec>) -> Self {
        let specs = specs
            .into_iter()
            .map(|spec| (spec.name.clone(), spec))
            .collect();
        Self { global, specs }
    }

    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Sync names in the order they were declared.
    pub fn list_names(&self) -> Vec<String> {
        self.specs.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&SyncSpec> {
        self.specs.get(name)
    }

    /// Looks up the selected syncs.
    ///
    /// Named syncs come back in request order, each at most once. If any
    /// name is unknown, nothing is returned and the error lists all of them.
    pub fn resolve_targets(&self, selection: &Selection) -> Result<Vec<SyncSpec>> {
        let names = match selection {
            Selection::All => return Ok(self.specs.values().cloned().collect()),
            Selection::Names(names) => names,
        };
        let requested: IndexSet<&str> = names.iter().map(String::as_str).collect();
        let unknown: Vec<String> = requested
            .iter()
            .filter(|name| !self.specs.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(ArsyncError::UnknownSyncName {
                names: unknown,
                available: self.list_names(),
            });
        }
        Ok(requested
            .into_iter()
            .filter_map(|name| self.specs.get(name).cloned())
            .collect())
    }
}
