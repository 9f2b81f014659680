//! System-wide constants and default paths.

use std::path::PathBuf;

/// Application name; the data directory is `.<APP_NAME>` under the home
/// directory.
pub const APP_NAME: &str = "devyard";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "dyd";

/// Host directory under which per-app staging directories are created.
pub const DEFAULT_HOST_STAGING_ROOT: &str = "/cp";

/// Mount point of the staging directory inside every app container.
pub const CONTAINER_STAGING_DIR: &str = "/cp";

/// Default host root for managed repository checkouts.
pub const DEFAULT_REPOS_DIR: &str = "/etc/devyard/repos";

/// Run-state directory inside app containers.
pub const CONTAINER_RUN_STATE_DIR: &str = "/var/run/devyard";

/// Sentinel file marking that a container has completed its first start.
pub const FIRST_START_SENTINEL: &str = "docker_first_time_started";

/// Placeholder command that keeps an app container alive when the app
/// declares no commands of its own.
pub const KEEPALIVE_COMMAND: &str = "tail -f /dev/null";

/// Tag appended to image references that carry none.
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Extension of spec, config, and port-map files.
pub const SPEC_EXTENSION: &str = "yml";

/// File name of the user configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Returns the per-user data directory, `$HOME/.devyard`.
///
/// Falls back to the current directory when no home is set.
pub fn data_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_or_else(|_| PathBuf::from("."), PathBuf::from)
        .join(format!(".{APP_NAME}"))
}

/// Returns the default configuration file path.
pub fn default_config_file() -> PathBuf {
    data_dir().join(CONFIG_FILE_NAME)
}
