use std::io;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Returns true if `path` names a remote rsync location such as `host:/srv`
/// or `user@host:/srv`.
///
/// Any colon marks a path as remote, so Windows drive paths are not supported.
pub fn is_remote(path: &str) -> bool {
    path.contains(':')
}

/// The directories a local path is resolved against.
#[derive(Debug, Clone)]
pub struct PathContext {
    pub home: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl PathContext {
    /// Captures the invoking user's home directory and the current working directory.
    pub fn from_env() -> io::Result<Self> {
        Ok(Self {
            home: dirs::home_dir(),
            cwd: std::env::current_dir()?,
        })
    }

    /// Expands a local path: a leading `~` becomes the home directory, a
    /// relative path is joined onto the working directory, and `.`/`..`
    /// components are removed. Remote paths are returned unchanged.
    ///
    /// A trailing `/` is kept because rsync gives it meaning.
    pub fn normalize(&self, input: &str) -> String {
        if is_remote(input) {
            return input.to_string();
        }
        let expanded = self.expand_home(input);
        let path = Path::new(&expanded);

        let abs_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        let mut cleaned = abs_path.clean().to_string_lossy().into_owned();
        if input.ends_with('/') && !cleaned.ends_with('/') {
            cleaned.push('/');
        }
        cleaned
    }

    fn expand_home(&self, input: &str) -> String {
        if let Some(home) = &self.home {
            let home = home.to_string_lossy();
            if input == "~" {
                return home.into_owned();
            }
            if let Some(rest) = input.strip_prefix("~/") {
                return format!("{}/{}", home.trim_end_matches('/'), rest);
            }
        }
        // `${HOME}/~/dir` style values leave a stray `~` component behind.
        if input.starts_with('/') && input.contains("/~/") {
            return input.replace("/~/", "/");
        }
        input.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PathContext {
        PathContext {
            home: Some(PathBuf::from("/home/alice")),
            cwd: PathBuf::from("/work/dir"),
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("host:/var/www"));
        assert!(is_remote("user@host:/var/www"));
        assert!(is_remote("host:"));
        assert!(!is_remote("/var/www"));
        assert!(!is_remote("relative/dir"));
    }

    #[test]
    fn test_remote_paths_untouched() {
        let ctx = ctx();
        assert_eq!(ctx.normalize("host:~/data"), "host:~/data");
        assert_eq!(ctx.normalize("user@host:rel/../x"), "user@host:rel/../x");
    }

    #[test]
    fn test_tilde_expansion() {
        let ctx = ctx();
        assert_eq!(ctx.normalize("~"), "/home/alice");
        assert_eq!(ctx.normalize("~/Documents"), "/home/alice/Documents");
        assert_eq!(ctx.normalize("~/Documents/"), "/home/alice/Documents/");
    }

    #[test]
    fn test_relative_made_absolute() {
        let ctx = ctx();
        assert_eq!(ctx.normalize("backup"), "/work/dir/backup");
        assert_eq!(ctx.normalize("./backup/../other"), "/work/dir/other");
        assert_eq!(ctx.normalize("../up"), "/work/up");
    }

    #[test]
    fn test_absolute_cleaned() {
        let ctx = ctx();
        assert_eq!(ctx.normalize("/backup/web"), "/backup/web");
        assert_eq!(ctx.normalize("/backup/./web//x/.."), "/backup/web");
        assert_eq!(ctx.normalize("/home/alice/~/music"), "/home/alice/music");
    }

    #[test]
    fn test_no_home_directory() {
        let ctx = PathContext {
            home: None,
            cwd: PathBuf::from("/work"),
        };
        assert_eq!(ctx.normalize("~/x"), "/work/~/x");
    }

    #[test]
    fn test_normalize_is_stable() {
        let ctx = ctx();
        for input in ["~/a/b/", "rel", "/abs/../x", "h:/r"] {
            let once = ctx.normalize(input);
            assert_eq!(ctx.normalize(&once), once);
        }
    }
}
