use std::path::Path;

use anyhow::Context;

use crate::models::settings::AppSettings;

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(path: &Path) -> AppSettings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return AppSettings::default(),
    };
    match serde_json::from_str::<AppSettings>(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Ignoring corrupt settings at {}: {}", path.display(), e);
            AppSettings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Applies a partial JSON document on top of the stored settings and saves the result.
pub fn update_settings(path: &Path, partial: &str) -> anyhow::Result<AppSettings> {
    let current = load_settings(path);
    let patch: serde_json::Value =
        serde_json::from_str(partial).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;
    let mut current_val = serde_json::to_value(&current)?;
    merge_json(&mut current_val, &patch);
    let updated: AppSettings =
        serde_json::from_value(current_val).map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
    save_settings(path, &updated)?;
    Ok(updated)
}

pub fn reset_settings(path: &Path) -> anyhow::Result<AppSettings> {
    let defaults = AppSettings::default();
    save_settings(path, &defaults)?;
    Ok(defaults)
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            let nested = value.is_object() && base_obj.get(key).is_some_and(|v| v.is_object());
            match base_obj.get_mut(key) {
                Some(existing) if nested => merge_json(existing, value),
                _ => {
                    base_obj.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("settings.json"));
        assert_eq!(settings.resolver.max_concurrent_extractions, 8);
        assert_eq!(settings.resolver.decrypt_endpoint, "https://embed69.org/api/decrypt");
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_settings(&path).resolver.request_timeout_secs, 120);
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = AppSettings::default();
        settings.resolver.decrypt_endpoint = "http://127.0.0.1:9/api/decrypt".into();
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).resolver.decrypt_endpoint, "http://127.0.0.1:9/api/decrypt");
    }

    #[test]
    fn partial_update_merges_nested_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let updated = update_settings(
            &path,
            r#"{"proxy":{"enabled":true,"host":"10.0.0.1"},"resolver":{"max_concurrent_extractions":2}}"#,
        )
        .unwrap();
        assert!(updated.proxy.enabled);
        assert_eq!(updated.proxy.port, 8080);
        assert_eq!(updated.resolver.request_timeout_secs, 120);
        assert_eq!(updated.resolver.max_concurrent_extractions, 2);
        assert_eq!(load_settings(&path).resolver.max_concurrent_extractions, 2);
    }

    #[test]
    fn invalid_patch_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(update_settings(&path, r#"{"resolver":{"max_concurrent_extractions":"many"}}"#).is_err());
        assert!(!path.exists());
    }
}
