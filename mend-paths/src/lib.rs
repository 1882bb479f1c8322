//! XDG Base Directory paths for mend.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths. This matches tools like gh, docker, kubectl.

use std::path::PathBuf;

/// Get the mend config directory.
///
/// Returns `$XDG_CONFIG_HOME/mend` if set, otherwise `~/.config/mend`.
/// This is where the config file lives.
///
/// # Examples
///
/// ```
/// use mend_paths::config_dir;
///
/// let config = config_dir();
/// let config_file = config.join("mend.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("mend")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/mend")
    } else {
        PathBuf::from(".config/mend")
    }
}

/// Get the mend data directory.
///
/// Returns `$XDG_DATA_HOME/mend` if set, otherwise `~/.local/share/mend`.
/// This is where persistent data like the context id is stored.
///
/// # Examples
///
/// ```
/// use mend_paths::data_dir;
///
/// let data = data_dir();
/// let context_id = data.join("context_id");
/// ```
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("mend")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share/mend")
    } else {
        PathBuf::from(".local/share/mend")
    }
}
