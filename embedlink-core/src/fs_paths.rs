use std::path::PathBuf;

pub trait AppPaths: Send + Sync {
    fn config_dir(&self) -> PathBuf;
    fn settings_file(&self) -> PathBuf {
        self.config_dir().join("settings.json")
    }
    fn preferences_file(&self) -> PathBuf {
        self.config_dir().join("preferences.json")
    }
}

pub struct DesktopPaths;

impl AppPaths for DesktopPaths {
    fn config_dir(&self) -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("embedlink"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
