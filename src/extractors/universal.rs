use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use crate::core::fetcher::Fetcher;
use crate::extractors::stream_label;
use crate::extractors::traits::VideoExtractor;
use crate::models::media::VideoCandidate;

static MEDIA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?:(?:\\?/){2}(?:[^"'\s<>\\]|\\/)+?\.(?:m3u8|mp4)(?:\?(?:[^"'\s<>\\]|\\/)*)?"#)
        .unwrap()
});

/// Fallback for hosts without a dedicated extractor: scans the page for media URLs.
pub struct UniversalExtractor {
    fetcher: Arc<dyn Fetcher>,
}

impl UniversalExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    fn find_media_urls(html: &str) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for m in MEDIA_URL_RE.find_iter(html) {
            let url = m.as_str().replace("\\/", "/");
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }
}

#[async_trait]
impl VideoExtractor for UniversalExtractor {
    fn name(&self) -> &str {
        "universal"
    }

    async fn videos_from_url(&self, url: &str, prefix: &str) -> anyhow::Result<Vec<VideoCandidate>> {
        let html = self.fetcher.get_text(url).await?;
        let videos = Self::find_media_urls(&html)
            .into_iter()
            .map(|media| {
                let label = stream_label(prefix, &media);
                VideoCandidate::new(media, label)
            })
            .collect::<Vec<_>>();
        tracing::debug!("[universal] {} media urls in {}", videos.len(), url);
        Ok(videos)
    }
}
