use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub url: String,
    pub label: String,
    pub quality: String,
}

impl VideoCandidate {
    /// Builds a candidate whose ranking tag is its display label.
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            url: url.into(),
            quality: label.clone(),
            label,
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    /// Returns a copy whose label and quality tag both start with `prefix`.
    pub fn prefixed(&self, prefix: &str) -> Self {
        let apply = |text: &str| {
            if text.starts_with(prefix) {
                text.to_string()
            } else {
                format!("{}{}", prefix, text)
            }
        };
        Self {
            url: self.url.clone(),
            label: apply(&self.label),
            quality: apply(&self.quality),
        }
    }
}

/// Language tag to candidate URLs, in discovery order per language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedLinkSet {
    links: BTreeMap<String, Vec<String>>,
}

impl ResolvedLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the language's bucket, creating it on first use.
    pub fn extend_language<I>(&mut self, language: &str, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut urls = urls.into_iter().peekable();
        if urls.peek().is_none() {
            return;
        }
        self.links
            .entry(language.to_string())
            .or_default()
            .extend(urls);
    }

    pub fn merge(&mut self, other: ResolvedLinkSet) {
        for (language, urls) in other.links {
            self.extend_language(&language, urls);
        }
    }

    pub fn get(&self, language: &str) -> Option<&[String]> {
        self.links.get(language).map(|v| v.as_slice())
    }

    pub fn contains_language(&self, language: &str) -> bool {
        self.links.contains_key(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn url_count(&self) -> usize {
        self.links.values().map(|v| v.len()).sum()
    }
}

impl IntoIterator for ResolvedLinkSet {
    type Item = (String, Vec<String>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

/// One language group from a page's `dataLink` script.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedManifestEntry {
    #[serde(rename = "video_language")]
    pub language: String,
    #[serde(rename = "sortedEmbeds", default)]
    pub embeds: Vec<Option<ManifestEmbed>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestEmbed {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub servername: Option<String>,
}

impl EmbedManifestEntry {
    /// Non-blank embed links, in manifest order.
    pub fn links(&self) -> Vec<String> {
        self.embeds
            .iter()
            .flatten()
            .filter_map(|e| e.link.as_deref())
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecryptRequest {
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecryptResponse {
    pub success: bool,
    #[serde(default)]
    pub links: Vec<DecryptedLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecryptedLink {
    pub index: i64,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_set_merges_same_language() {
        let mut set = ResolvedLinkSet::new();
        set.extend_language("LAT", vec!["a".to_string()]);
        set.extend_language("LAT", vec!["b".to_string()]);
        assert_eq!(set.get("LAT").unwrap(), ["a", "b"]);
    }

    #[test]
    fn link_set_never_stores_empty_bucket() {
        let mut set = ResolvedLinkSet::new();
        set.extend_language("SUB", Vec::new());
        assert!(!set.contains_language("SUB"));
        assert!(set.is_empty());
    }

    #[test]
    fn link_set_merge_keeps_duplicates() {
        let mut a = ResolvedLinkSet::new();
        a.extend_language("LAT", vec!["x".to_string()]);
        let mut b = ResolvedLinkSet::new();
        b.extend_language("LAT", vec!["x".to_string()]);
        b.extend_language("SUB", vec!["y".to_string()]);
        a.merge(b);
        assert_eq!(a.get("LAT").unwrap().len(), 2);
        assert_eq!(a.url_count(), 3);
    }

    #[test]
    fn manifest_entry_skips_blank_and_null_links() {
        let entry: EmbedManifestEntry = serde_json::from_str(
            r#"{"video_language":"LAT","sortedEmbeds":[{"link":"enc1"},null,{"link":"  "},{"servername":"voe"},{"link":"enc2"}]}"#,
        )
        .unwrap();
        assert_eq!(entry.links(), vec!["enc1", "enc2"]);
    }

    #[test]
    fn manifest_entry_requires_language() {
        let parsed = serde_json::from_str::<EmbedManifestEntry>(r#"{"sortedEmbeds":[]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn decrypt_response_tolerates_missing_links() {
        let resp: DecryptResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.links.is_empty());
    }

    #[test]
    fn prefixed_does_not_double_prefix() {
        let c = VideoCandidate::new("https://cdn/v.m3u8", "LAT Voe:720p");
        let p = c.prefixed("LAT Voe:");
        assert_eq!(p.label, "LAT Voe:720p");
        let q = VideoCandidate::new("https://cdn/v.m3u8", "720p").prefixed("LAT Voe:");
        assert_eq!(q.label, "LAT Voe:720p");
        assert_eq!(q.quality, "LAT Voe:720p");
    }
}
