/// Package name.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
/// Default configuration file name, looked up under `~/.config`.
pub const CONFIG_NAME: &str = "arsync.conf";
/// Flags passed to rsync when neither the sync nor the `config` section sets any.
pub const DEFAULT_RSYNC_FLAGS: &str = "-avPh";
/// Program invoked for every sync unless `config.rsync_path` says otherwise.
pub const DEFAULT_RSYNC_PATH: &str = "rsync";
