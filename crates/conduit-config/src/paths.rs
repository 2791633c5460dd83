//! Platform-specific paths for configuration and modules.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/conduit/` (Linux), `~/Library/Application Support/conduit/` (macOS), `%APPDATA%\conduit\` (Windows)
//! - **User modules**: `<user config>/modules/`
//! - **System modules**: `/usr/lib/conduit/modules/` (Linux), `/Library/Application Support/conduit/modules/` (macOS)
//!
//! # Example
//!
//! ```rust,no_run
//! use conduit_config::paths;
//!
//! if let Some(path) = paths::find_config(None) {
//!     println!("Using config: {:?}", path);
//! }
//! ```

use conduit_modules::BUILTIN_PREFIX;
use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "conduit";

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "conduit.toml";

/// Subdirectory name for modules.
const MODULES_SUBDIR: &str = "modules";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path in the user config directory.
pub fn default_config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Returns the user-specific module directory.
pub fn user_modules_dir() -> PathBuf {
    user_config_dir().join(MODULES_SUBDIR)
}

/// Returns the system-wide module directory.
pub fn system_modules_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/usr/lib").join(APP_NAME).join(MODULES_SUBDIR)
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support")
            .join(APP_NAME)
            .join(MODULES_SUBDIR)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(MODULES_SUBDIR)
    }
}

/// Find a configuration file.
///
/// Searches in the following order:
/// 1. `explicit`, if given and it is a file
/// 2. [`default_config_file`]
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }
    let default = default_config_file();
    default.is_file().then_some(default)
}

/// Resolve a module path from a configuration file.
///
/// `builtin:` names and absolute paths are returned unchanged. A bare file
/// name is looked up in the user module directory, then the system one;
/// if neither has it the name is returned as given so the loader reports
/// the failure.
pub fn resolve_module_path(path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if path.starts_with(BUILTIN_PREFIX) || candidate.is_absolute() {
        return candidate;
    }
    [user_modules_dir(), system_modules_dir()]
        .into_iter()
        .map(|dir| dir.join(path))
        .find(|p| p.is_file())
        .unwrap_or(candidate)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::io(crate::FileAction::CreateDir, &dir, e))?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dirs_mention_app() {
        assert!(user_config_dir().to_string_lossy().contains("conduit"));
        assert!(system_modules_dir().to_string_lossy().contains("conduit"));
        assert!(user_modules_dir().ends_with("modules"));
        assert!(default_config_file().ends_with(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_find_config_explicit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(find_config(Some(&path)), Some(path.clone()));
        assert_eq!(find_config(Some(&temp_dir.path().join("missing.toml"))), None);
    }

    #[test]
    fn test_resolve_module_path_passthrough() {
        assert_eq!(resolve_module_path("builtin:chain"), PathBuf::from("builtin:chain"));
        assert_eq!(
            resolve_module_path("/opt/mod/libx.so"),
            PathBuf::from("/opt/mod/libx.so")
        );
        assert_eq!(
            resolve_module_path("libnot_installed_12345.so"),
            PathBuf::from("libnot_installed_12345.so")
        );
    }
}
