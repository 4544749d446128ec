//! `${NAME}` substitution for sync paths.
//!
//! Variables come from the `variables` list of the configuration, written as
//! `NAME = "value"`. Substitution is a single left-to-right pass: text that a
//! variable expands to is never scanned again, so a value that itself looks
//! like `${OTHER}` stays as written.

use crate::config::RawConfig;
use crate::error::{ArsyncError, Result};
use crate::path::PathContext;
use crate::registry::{SyncRegistry, SyncSpec};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid variable token regex"));

/// Variable names and values in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    vars: IndexMap<String, String>,
}

impl VariableTable {
    /// Builds the table from `NAME = "value"` entries.
    ///
    /// The entry is split on its first `=`. Whitespace around both halves and
    /// quotes around the value are removed. A later entry with the same name
    /// replaces the earlier value.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut vars = IndexMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let entry = entry.as_ref();
            let syntax_error = || ArsyncError::VariableSyntax {
                index,
                entry: entry.to_string(),
            };
            let (name, value) = entry.split_once('=').ok_or_else(syntax_error)?;
            let name = name.trim();
            if name.is_empty() {
                return Err(syntax_error());
            }
            let value = value.trim().trim_matches(['"', '\'']);
            vars.insert(name.to_string(), value.to_string());
        }
        Ok(Self { vars })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replaces every `${NAME}` in `text`. Unknown names are kept verbatim.
    pub fn substitute<'a>(&self, text: &'a str) -> Cow<'a, str> {
        TOKEN.replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            match self.get(name) {
                Some(value) => value.to_string(),
                None => {
                    tracing::warn!("Variable ${{{name}}} is not defined");
                    caps[0].to_string()
                }
            }
        })
    }
}

/// Turns a validated configuration into the registry of runnable syncs:
/// variables are substituted into every `src`/`dest`, then local paths are
/// expanded against `ctx`.
pub fn resolve(raw: RawConfig, ctx: &PathContext) -> Result<SyncRegistry> {
    let table = VariableTable::parse(&raw.variables)?;
    let specs = raw
        .syncs
        .into_iter()
        .map(|(name, sync)| {
            let source = ctx.normalize(&table.substitute(&sync.src));
            let destination = ctx.normalize(&table.substitute(&sync.dest));
            tracing::debug!("Resolved sync '{name}': {source} -> {destination}");
            SyncSpec {
                name,
                source,
                destination,
                flags: sync.rsync_flags,
            }
        })
        .collect();
    Ok(SyncRegistry::new(raw.global, specs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use std::path::{Path, PathBuf};

    fn ctx() -> PathContext {
        PathContext {
            home: Some(PathBuf::from("/home/alice")),
            cwd: PathBuf::from("/work"),
        }
    }

    fn table(entries: &[&str]) -> VariableTable {
        VariableTable::parse(entries).unwrap()
    }

    #[test]
    fn test_parse_entries() {
        let t = table(&[r#"HOST = "10.0.0.1""#, "USER='bob'", "EMPTY = \"\"", "EQ = a=b"]);
        assert_eq!(t.len(), 4);
        assert_eq!(t.get("HOST"), Some("10.0.0.1"));
        assert_eq!(t.get("USER"), Some("bob"));
        assert_eq!(t.get("EMPTY"), Some(""));
        assert_eq!(t.get("EQ"), Some("a=b"));
        assert_eq!(t.get("MISSING"), None);
    }

    #[test]
    fn test_parse_without_equals_fails() {
        let err = VariableTable::parse(&["GOOD = 1", "BROKEN \"value\""]).unwrap_err();
        match err {
            ArsyncError::VariableSyntax { index, entry } => {
                assert_eq!(index, 1);
                assert_eq!(entry, "BROKEN \"value\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_name_fails() {
        assert!(VariableTable::parse(&[" = \"x\""]).is_err());
    }

    #[test]
    fn test_later_definition_wins() {
        let t = table(&["A = 1", "A = 2"]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("A"), Some("2"));
    }

    #[test]
    fn test_substitute_all_occurrences() {
        let t = table(&["H = host", "D = data"]);
        assert_eq!(t.substitute("${H}:/${D}/${H}/${D}"), "host:/data/host/data");
    }

    #[test]
    fn test_unknown_token_left_verbatim() {
        let t = table(&["H = host"]);
        assert_eq!(t.substitute("${H}:/${NOPE}/x"), "host:/${NOPE}/x");
    }

    #[test]
    fn test_empty_value() {
        let t = table(&["PREFIX = \"\""]);
        assert_eq!(t.substitute("/srv${PREFIX}/www"), "/srv/www");
    }

    #[test]
    fn test_single_pass_not_recursive() {
        let t = table(&["A = \"${B}\"", "B = deep"]);
        assert_eq!(t.substitute("/x/${A}"), "/x/${B}");
    }

    #[test]
    fn test_text_without_tokens_unchanged() {
        let t = table(&["A = 1"]);
        assert!(matches!(t.substitute("/plain/$A/{A}"), Cow::Borrowed("/plain/$A/{A}")));
    }

    #[test]
    fn test_substitute_resolved_text_is_stable() {
        let t = table(&["H = host", "P = /var/www"]);
        let once = t.substitute("${H}:${P}").into_owned();
        assert_eq!(t.substitute(&once), once);
    }

    #[test]
    fn test_resolve_example_config() {
        let raw = config::parse(
            Path::new("t.conf"),
            r#"
variables: ["HOST = \"10.0.0.1\""]
sync:
  web: {src: "${HOST}:/var/www", dest: "/backup/web"}
"#,
        )
        .unwrap();
        let registry = resolve(raw, &ctx()).unwrap();
        let web = registry.get("web").unwrap();
        assert_eq!(web.source, "10.0.0.1:/var/www");
        assert_eq!(web.destination, "/backup/web");
        assert_eq!(web.flags, None);
    }

    #[test]
    fn test_resolve_normalizes_local_paths_after_substitution() {
        let raw = config::parse(
            Path::new("t.conf"),
            r#"
variables:
  - BASE = "~/backups"
  - NAS = "me@nas"
sync:
  docs:
    src: "${BASE}/docs/"
    dest: "${NAS}:~/docs"
  rel:
    src: "data/../photos"
    dest: "${BASE}"
    rsync_flags: "-a"
"#,
        )
        .unwrap();
        let registry = resolve(raw, &ctx()).unwrap();
        let docs = registry.get("docs").unwrap();
        assert_eq!(docs.source, "/home/alice/backups/docs/");
        assert_eq!(docs.destination, "me@nas:~/docs");
        let rel = registry.get("rel").unwrap();
        assert_eq!(rel.source, "/work/photos");
        assert_eq!(rel.destination, "/home/alice/backups");
        assert_eq!(rel.flags.as_deref(), Some("-a"));
    }

    #[test]
    fn test_resolve_variable_syntax_error() {
        let raw = config::parse(
            Path::new("t.conf"),
            "variables: [\"NOEQUALS\"]\nsync:\n  a: {src: /a, dest: /b}\n",
        )
        .unwrap();
        assert!(matches!(
            resolve(raw, &ctx()),
            Err(ArsyncError::VariableSyntax { index: 0, .. })
        ));
    }
}
