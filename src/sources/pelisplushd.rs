use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};

use crate::core::classifier::{ProviderClassifier, DEFAULT_RULES};
use crate::core::fetcher::Fetcher;
use crate::models::events::{FailureKind, Outcome, ResolutionEvent, Stage};
use crate::models::settings::UserPreference;
use crate::sources::traits::SiteSource;

pub const BASE_URL: &str = "https://pelisplushd.bz";

static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
static OPTION_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'(https?://[^']*)'").unwrap());

pub struct PelisPlusHd {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl PelisPlusHd {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_base_url(fetcher, BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<dyn Fetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Player options live in an inline script assigning `video[1] = '...'`, `video[2] = ...`.
    fn option_urls(html: &str) -> Option<Vec<String>> {
        let doc = Html::parse_document(html);
        let script = doc
            .select(&SCRIPT_SELECTOR)
            .map(|el| el.text().collect::<String>())
            .find(|text| text.contains("video[1] = "))?;
        Some(
            OPTION_URL_RE
                .captures_iter(&script)
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl SiteSource for PelisPlusHd {
    fn name(&self) -> &str {
        "pelisplushd"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("pelisplushd")
    }

    async fn embed_pages(&self, episode_url: &str) -> Outcome<Vec<String>> {
        let mut outcome = Outcome::new(Vec::new());
        let html = match self.fetcher.get_text(episode_url).await {
            Ok(html) => html,
            Err(e) => {
                outcome.record(ResolutionEvent::new(
                    Stage::Source,
                    FailureKind::Remote,
                    episode_url,
                    format!("fetch failed: {}", e),
                ));
                return outcome;
            }
        };

        match Self::option_urls(&html) {
            Some(urls) => {
                tracing::debug!("[source] pelisplushd: {} player options", urls.len());
                outcome.value = urls;
            }
            None => outcome.record(ResolutionEvent::new(
                Stage::Source,
                FailureKind::AbsentFeature,
                episode_url,
                "no player options script",
            )),
        }
        outcome
    }

    fn classifier(&self) -> ProviderClassifier {
        ProviderClassifier::new(DEFAULT_RULES)
    }

    fn default_preference(&self) -> UserPreference {
        UserPreference::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetcher::testing::FakeFetcher;

    const EPISODE: &str = "https://pelisplushd.bz/serie/show/temporada/1/capitulo/2";

    const PAGE: &str = r#"<html><body>
        <script>var x = 'https://ads.example/skip';</script>
        <script>
          var video = [];
          video[1] = 'https://embed69.org/f/tt001-1x2';
          video[2] = 'https://re.sololatino.net/embed.php?id=55';
        </script></body></html>"#;

    #[tokio::test]
    async fn collects_player_options_in_order() {
        let fetcher = Arc::new(FakeFetcher::new().page(EPISODE, PAGE));
        let outcome = PelisPlusHd::new(fetcher).embed_pages(EPISODE).await;
        assert_eq!(
            outcome.value,
            vec![
                "https://embed69.org/f/tt001-1x2",
                "https://re.sololatino.net/embed.php?id=55"
            ]
        );
        assert!(outcome.events.is_empty());
    }

    #[tokio::test]
    async fn page_without_options_is_absent_feature() {
        let fetcher = Arc::new(FakeFetcher::new().page(EPISODE, "<html><script>var a;</script></html>"));
        let outcome = PelisPlusHd::new(fetcher).embed_pages(EPISODE).await;
        assert!(outcome.value.is_empty());
        assert_eq!(outcome.events[0].kind, FailureKind::AbsentFeature);
    }

    #[tokio::test]
    async fn fetch_failure_is_remote_event() {
        let fetcher = Arc::new(FakeFetcher::new().failing_page(EPISODE, "HTTP 503"));
        let outcome = PelisPlusHd::new(fetcher).embed_pages(EPISODE).await;
        assert!(outcome.value.is_empty());
        assert_eq!(outcome.events[0].kind, FailureKind::Remote);
        assert_eq!(outcome.events[0].stage, Stage::Source);
    }

    #[test]
    fn defaults_prefer_voe_at_1080() {
        let source = PelisPlusHd::new(Arc::new(FakeFetcher::new()));
        let pref = source.default_preference();
        assert_eq!(pref.preferred_server, "Voe");
        assert_eq!(pref.preferred_quality.token(), "1080");
        assert_eq!(source.base_url(), BASE_URL);
    }
}
