use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};

use crate::core::fetcher::Fetcher;
use crate::embeds::traits::EmbedDecoder;
use crate::models::events::{FailureKind, Outcome, ResolutionEvent, Stage};
use crate::models::media::{DecryptRequest, DecryptResponse, EmbedManifestEntry, ResolvedLinkSet};

const MARKER: &str = "dataLink";

static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
static ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"dataLink\s*=\s*([^;]*)").unwrap());

/// Decodes pages carrying a `dataLink = [...]` manifest whose links are
/// resolved through the remote decrypt endpoint, one call per entry.
pub struct EmbedDataDecoder {
    fetcher: Arc<dyn Fetcher>,
    decrypt_endpoint: String,
}

impl EmbedDataDecoder {
    pub fn new(fetcher: Arc<dyn Fetcher>, decrypt_endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            decrypt_endpoint: decrypt_endpoint.into(),
        }
    }

    fn find_manifest_script(html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        doc.select(&SCRIPT_SELECTOR)
            .map(|el| el.text().collect::<String>())
            .find(|text| text.contains(MARKER))
    }

    fn manifest_literal(script: &str) -> Option<&str> {
        let literal = ASSIGNMENT_RE.captures(script)?.get(1)?.as_str().trim();
        if literal.is_empty() {
            return None;
        }
        Some(literal)
    }

    async fn decrypt(&self, links: Vec<String>) -> Result<DecryptResponse, ResolutionEvent> {
        let body = serde_json::to_value(DecryptRequest { links }).map_err(|e| {
            ResolutionEvent::new(Stage::DataLink, FailureKind::Decode, &self.decrypt_endpoint, e.to_string())
        })?;
        let text = self
            .fetcher
            .post_json(&self.decrypt_endpoint, &body)
            .await
            .map_err(|e| {
                ResolutionEvent::new(
                    Stage::DataLink,
                    FailureKind::Remote,
                    &self.decrypt_endpoint,
                    format!("decrypt request failed: {}", e),
                )
            })?;
        serde_json::from_str::<DecryptResponse>(&text).map_err(|e| {
            ResolutionEvent::new(
                Stage::DataLink,
                FailureKind::Decode,
                &self.decrypt_endpoint,
                format!("invalid decrypt response: {}", e),
            )
        })
    }

    /// Decodes a manifest already fetched from `page_url`.
    pub async fn decode_html(&self, page_url: &str, html: &str) -> Outcome<ResolvedLinkSet> {
        let mut outcome: Outcome<ResolvedLinkSet> = Outcome::default();

        let Some(script) = Self::find_manifest_script(html) else {
            outcome.record(ResolutionEvent::new(
                Stage::DataLink,
                FailureKind::AbsentFeature,
                page_url,
                "dataLink not found in page",
            ));
            return outcome;
        };

        let entries: Vec<serde_json::Value> = match Self::manifest_literal(&script)
            .ok_or_else(|| "dataLink has no assigned value".to_string())
            .and_then(|literal| serde_json::from_str(literal).map_err(|e| e.to_string()))
        {
            Ok(entries) => entries,
            Err(message) => {
                outcome.record(ResolutionEvent::new(
                    Stage::DataLink,
                    FailureKind::Decode,
                    page_url,
                    format!("unreadable manifest: {}", message),
                ));
                return outcome;
            }
        };

        tracing::debug!("[datalink] {} manifest entries in {}", entries.len(), page_url);

        for (index, raw) in entries.into_iter().enumerate() {
            let entry = match serde_json::from_value::<EmbedManifestEntry>(raw) {
                Ok(entry) => entry,
                Err(e) => {
                    outcome.record(ResolutionEvent::new(
                        Stage::DataLink,
                        FailureKind::Decode,
                        page_url,
                        format!("manifest entry {} skipped: {}", index, e),
                    ));
                    continue;
                }
            };

            let links = entry.links();
            if links.is_empty() {
                tracing::debug!("[datalink] entry {} ({}) has no links", index, entry.language);
                continue;
            }

            match self.decrypt(links).await {
                Ok(response) if response.success => {
                    let resolved = response
                        .links
                        .into_iter()
                        .map(|l| l.link)
                        .filter(|l| !l.trim().is_empty());
                    outcome.value.extend_language(&entry.language, resolved);
                }
                Ok(_) => outcome.record(ResolutionEvent::new(
                    Stage::DataLink,
                    FailureKind::Remote,
                    page_url,
                    format!("decrypt rejected entry {} ({})", index, entry.language),
                )),
                Err(event) => outcome.record(event),
            }
        }

        tracing::info!(
            "[datalink] {} links in {} languages from {}",
            outcome.value.url_count(),
            outcome.value.languages().count(),
            page_url
        );
        outcome
    }
}

#[async_trait]
impl EmbedDecoder for EmbedDataDecoder {
    fn name(&self) -> &str {
        "datalink"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("embed69")
    }

    async fn decode(&self, page_url: &str) -> Outcome<ResolvedLinkSet> {
        match self.fetcher.get_text(page_url).await {
            Ok(html) => self.decode_html(page_url, &html).await,
            Err(e) => {
                let mut outcome = Outcome::default();
                outcome.record(ResolutionEvent::new(
                    Stage::DataLink,
                    FailureKind::Remote,
                    page_url,
                    format!("fetch failed: {}", e),
                ));
                outcome
            }
        }
    }
}
