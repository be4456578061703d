use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::core::fetcher::Fetcher;
use crate::extractors::stream_label;
use crate::extractors::traits::VideoExtractor;
use crate::models::media::VideoCandidate;

static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());

pub struct WolfStreamExtractor {
    fetcher: Arc<dyn Fetcher>,
}

impl WolfStreamExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    fn extract_media_url(html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let script = doc
            .select(&SCRIPT_SELECTOR)
            .map(|el| el.text().collect::<String>())
            .find(|text| text.contains("sources"))?;
        let (_, rest) = script.split_once("{file:\"")?;
        let url = rest.split('"').next()?;
        if url.is_empty() {
            return None;
        }
        Some(url.to_string())
    }
}

#[async_trait]
impl VideoExtractor for WolfStreamExtractor {
    fn name(&self) -> &str {
        "wolfstream"
    }

    async fn videos_from_url(&self, url: &str, prefix: &str) -> anyhow::Result<Vec<VideoCandidate>> {
        let html = self.fetcher.get_text(url).await?;
        let Some(media_url) = Self::extract_media_url(&html) else {
            tracing::debug!("[wolfstream] no sources script in {}", url);
            return Ok(Vec::new());
        };
        let label = stream_label(prefix, &media_url);
        Ok(vec![VideoCandidate::new(media_url, label)])
    }
}
