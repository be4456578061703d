use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const PREF_QUALITY_KEY: &str = "preferred_quality";
pub const PREF_SERVER_KEY: &str = "preferred_server";
pub const PREF_LANG_KEY: &str = "preferred_lang";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PreferredQuality {
    #[default]
    #[serde(rename = "1080")]
    P1080,
    #[serde(rename = "720")]
    P720,
    #[serde(rename = "480")]
    P480,
    #[serde(rename = "360")]
    P360,
}

impl PreferredQuality {
    pub const ALL: [PreferredQuality; 4] = [
        PreferredQuality::P1080,
        PreferredQuality::P720,
        PreferredQuality::P480,
        PreferredQuality::P360,
    ];

    /// Token searched for in a candidate's quality tag.
    pub fn token(&self) -> &'static str {
        match self {
            PreferredQuality::P1080 => "1080",
            PreferredQuality::P720 => "720",
            PreferredQuality::P480 => "480",
            PreferredQuality::P360 => "360",
        }
    }
}

impl fmt::Display for PreferredQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for PreferredQuality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().trim_end_matches(['p', 'P']);
        PreferredQuality::ALL
            .iter()
            .copied()
            .find(|q| q.token() == token)
            .ok_or_else(|| anyhow::anyhow!("Unsupported quality: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
    #[serde(default)]
    pub preferred_quality: PreferredQuality,
    #[serde(default = "default_server")]
    pub preferred_server: String,
    #[serde(default)]
    pub preferred_language: Option<String>,
}

fn default_server() -> String {
    "Voe".into()
}

impl Default for UserPreference {
    fn default() -> Self {
        Self {
            preferred_quality: PreferredQuality::default(),
            preferred_server: default_server(),
            preferred_language: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_decrypt_endpoint")]
    pub decrypt_endpoint: String,
    #[serde(default = "default_max_concurrent_extractions")]
    pub max_concurrent_extractions: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

pub fn default_decrypt_endpoint() -> String {
    "https://embed69.org/api/decrypt".into()
}

fn default_max_concurrent_extractions() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".into()
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            decrypt_endpoint: default_decrypt_endpoint(),
            max_concurrent_extractions: default_max_concurrent_extractions(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_type")]
    pub proxy_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_proxy_type() -> String {
    "http".into()
}

fn default_proxy_port() -> u16 {
    8080
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            proxy_type: default_proxy_type(),
            host: String::new(),
            port: default_proxy_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

fn default_schema_version() -> u32 {
    1
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            resolver: ResolverSettings::default(),
            proxy: ProxySettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_parses_with_or_without_suffix() {
        assert_eq!("720".parse::<PreferredQuality>().unwrap(), PreferredQuality::P720);
        assert_eq!("480p".parse::<PreferredQuality>().unwrap(), PreferredQuality::P480);
        assert!("240".parse::<PreferredQuality>().is_err());
    }

    #[test]
    fn quality_serializes_as_bare_token() {
        let json = serde_json::to_string(&PreferredQuality::P360).unwrap();
        assert_eq!(json, "\"360\"");
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"schema_version":1,"resolver":{"max_concurrent_extractions":2}}"#)
                .unwrap();
        assert_eq!(settings.resolver.max_concurrent_extractions, 2);
        assert_eq!(settings.resolver.decrypt_endpoint, default_decrypt_endpoint());
        assert!(!settings.proxy.enabled);
    }

    #[test]
    fn default_proxy_matches_field_defaults() {
        let proxy = AppSettings::default().proxy;
        assert_eq!(proxy.proxy_type, "http");
        assert_eq!(proxy.port, 8080);
        let parsed: ProxySettings = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.port, proxy.port);
        assert_eq!(parsed.proxy_type, proxy.proxy_type);
    }

    #[test]
    fn missing_schema_version_defaults_to_one() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"resolver":{"request_timeout_secs":30}}"#).unwrap();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.resolver.request_timeout_secs, 30);
    }
}
