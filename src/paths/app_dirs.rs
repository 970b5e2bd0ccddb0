/**
 * App Directories Module
 *
 * All files are stored under the platform config directory:
 * - macOS: ~/Library/Application Support/com.subtitle-translator/
 * - Windows: %APPDATA%/com.subtitle-translator/
 * - Linux: ~/.config/com.subtitle-translator/
 */
use std::path::{Path, PathBuf};

/// Bundle identifier for the app
pub const BUNDLE_ID: &str = "com.subtitle-translator";

/// Get the app data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join(BUNDLE_ID))
        .ok_or_else(|| "無法確定應用配置目錄".to_string())
}

/// Get the config file path
///
/// Returns: {app_data_dir}/config.toml
pub fn get_config_path() -> Result<PathBuf, String> {
    Ok(get_app_data_dir()?.join("config.toml"))
}

/// Get the persisted settings file path
///
/// Returns: {app_data_dir}/settings.toml
pub fn get_settings_path() -> Result<PathBuf, String> {
    Ok(get_app_data_dir()?.join("settings.toml"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir_exists(path: &Path) -> Result<(), String> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| format!("無法創建目錄 {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Initialize the app directory
///
/// Should be called before opening a file-backed settings store.
pub fn init_app_dirs() -> Result<PathBuf, String> {
    let dir = get_app_data_dir()?;
    ensure_dir_exists(&dir)?;
    log::info!("[Paths] App directory initialized: {:?}", dir);
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_path_lives_under_bundle_dir() {
        if let Ok(path) = get_settings_path() {
            assert!(path.to_string_lossy().contains(BUNDLE_ID));
            assert!(path.ends_with("settings.toml"));
        }
    }

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let tmp = tempfile::TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
