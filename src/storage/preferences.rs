use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use serde::Serialize;

use crate::models::settings::{
    PreferredQuality, UserPreference, PREF_LANG_KEY, PREF_QUALITY_KEY, PREF_SERVER_KEY,
};

/// Ranking keys set by one layer; `None` defers to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreferenceOverrides {
    pub quality: Option<PreferredQuality>,
    pub server: Option<String>,
    pub language: Option<String>,
}

impl PreferenceOverrides {
    pub fn apply(&self, mut preference: UserPreference) -> UserPreference {
        if let Some(quality) = self.quality {
            preference.preferred_quality = quality;
        }
        if let Some(server) = &self.server {
            preference.preferred_server = server.clone();
        }
        if let Some(language) = &self.language {
            preference.preferred_language = Some(language.clone());
        }
        preference
    }
}

pub trait PreferenceStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Flat string map persisted as a JSON object.
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonPreferenceStore {
    pub fn open(path: &Path) -> Self {
        let values = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(map) => Some(map),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt preferences at {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        }
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

/// Reads the three ranking keys, falling back to `defaults` for each one
/// that is missing, blank or unparseable.
pub fn load_preference(store: &dyn PreferenceStore, defaults: &UserPreference) -> UserPreference {
    let read = |key: &str| store.get_string(key).filter(|v| !v.trim().is_empty());

    let preferred_quality = read(PREF_QUALITY_KEY)
        .and_then(|raw| match raw.parse::<PreferredQuality>() {
            Ok(q) => Some(q),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        })
        .unwrap_or(defaults.preferred_quality);

    UserPreference {
        preferred_quality,
        preferred_server: read(PREF_SERVER_KEY).unwrap_or_else(|| defaults.preferred_server.clone()),
        preferred_language: read(PREF_LANG_KEY).or_else(|| defaults.preferred_language.clone()),
    }
}

/// Writes only the keys the overrides set, so unset keys keep deferring
/// to whichever site defaults apply at load time.
pub fn save_overrides(store: &dyn PreferenceStore, overrides: &PreferenceOverrides) -> anyhow::Result<()> {
    if let Some(quality) = overrides.quality {
        store.set_string(PREF_QUALITY_KEY, quality.token())?;
    }
    if let Some(server) = &overrides.server {
        store.set_string(PREF_SERVER_KEY, server)?;
    }
    if let Some(language) = &overrides.language {
        store.set_string(PREF_LANG_KEY, language)?;
    }
    Ok(())
}

/// The keys currently held by the store, without any defaults filled in.
pub fn stored_overrides(store: &dyn PreferenceStore) -> PreferenceOverrides {
    let read = |key: &str| store.get_string(key).filter(|v| !v.trim().is_empty());
    PreferenceOverrides {
        quality: read(PREF_QUALITY_KEY).and_then(|raw| raw.parse().ok()),
        server: read(PREF_SERVER_KEY),
        language: read(PREF_LANG_KEY),
    }
}
