use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use crate::core::classifier::{ProviderClassifier, SOLOLATINO_RULES};
use crate::core::fetcher::Fetcher;
use crate::models::events::{FailureKind, Outcome, ResolutionEvent, Stage};
use crate::models::settings::UserPreference;
use crate::sources::traits::SiteSource;

pub const BASE_URL: &str = "https://sololatino.net";

static PLAYER_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-type=["'](.+?)["'] data-post=["'](.+?)["'] data-nume=["'](.+?)["']"#).unwrap()
});
static IFRAME_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<iframe class='[^']+' src='([^']+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlayerOption {
    kind: String,
    post: String,
    nume: String,
}

pub struct SoloLatino {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl SoloLatino {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_base_url(fetcher, BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<dyn Fetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn ajax_url(&self) -> String {
        format!("{}/wp-admin/admin-ajax.php", self.base_url)
    }

    fn player_options(html: &str) -> Vec<PlayerOption> {
        PLAYER_OPTION_RE
            .captures_iter(html)
            .map(|c| PlayerOption {
                kind: c[1].to_string(),
                post: c[2].to_string(),
                nume: c[3].to_string(),
            })
            .collect()
    }

    fn iframe_src(response: &str) -> Option<String> {
        IFRAME_SRC_RE
            .captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    async fn player_iframe(&self, option: &PlayerOption, episode_url: &str) -> Result<String, ResolutionEvent> {
        let ajax_url = self.ajax_url();
        let form = [
            ("action", "doo_player_ajax"),
            ("post", option.post.as_str()),
            ("nume", option.nume.as_str()),
            ("type", option.kind.as_str()),
        ];
        let response = self
            .fetcher
            .post_form(&ajax_url, &form, episode_url)
            .await
            .map_err(|e| {
                ResolutionEvent::new(
                    Stage::Source,
                    FailureKind::Remote,
                    &ajax_url,
                    format!("player option {} failed: {}", option.nume, e),
                )
            })?;
        Self::iframe_src(&response).ok_or_else(|| {
            ResolutionEvent::new(
                Stage::Source,
                FailureKind::Decode,
                &ajax_url,
                format!("player option {} returned no iframe", option.nume),
            )
        })
    }
}

#[async_trait]
impl SiteSource for SoloLatino {
    fn name(&self) -> &str {
        "sololatino"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("sololatino.net") && !url.contains("re.sololatino.net")
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

        let options = Self::player_options(&html);
        if options.is_empty() {
            outcome.record(ResolutionEvent::new(
                Stage::Source,
                FailureKind::AbsentFeature,
                episode_url,
                "no player options on page",
            ));
            return outcome;
        }

        for option in &options {
            match self.player_iframe(option, episode_url).await {
                Ok(src) => outcome.value.push(src),
                Err(event) => outcome.record(event),
            }
        }
        tracing::debug!(
            "[source] sololatino: {}/{} player options resolved",
            outcome.value.len(),
            options.len()
        );
        outcome
    }

    fn classifier(&self) -> ProviderClassifier {
        ProviderClassifier::new(SOLOLATINO_RULES)
    }

    fn default_preference(&self) -> UserPreference {
        UserPreference {
            preferred_server: "StreamWish".into(),
            preferred_language: Some("LAT".into()),
            ..UserPreference::default()
        }
    }
}
