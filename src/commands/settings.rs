use std::path::Path;

use crate::models::settings::AppSettings;
use crate::storage::config;
use crate::storage::preferences::{
    save_overrides, stored_overrides, PreferenceOverrides, PreferenceStore,
};

pub fn get_settings(path: &Path) -> AppSettings {
    config::load_settings(path)
}

pub fn update_settings(path: &Path, partial: &str) -> anyhow::Result<AppSettings> {
    let updated = config::update_settings(path, partial)?;
    tracing::info!("Settings updated at {}", path.display());
    Ok(updated)
}

pub fn reset_settings(path: &Path) -> anyhow::Result<AppSettings> {
    config::reset_settings(path)
}

/// Stores the given preference keys; keys left unset keep their stored value
/// or, if never stored, the defaults of whichever site is resolved.
pub fn set_preferences(
    store: &dyn PreferenceStore,
    overrides: &PreferenceOverrides,
) -> anyhow::Result<PreferenceOverrides> {
    save_overrides(store, overrides)?;
    tracing::info!("Preferences updated");
    Ok(stored_overrides(store))
}

pub fn show_preferences(store: &dyn PreferenceStore) -> PreferenceOverrides {
    stored_overrides(store)
}
