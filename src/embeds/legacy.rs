use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::core::fetcher::Fetcher;
use crate::core::link_patterns::{extract_links, ONCLICK_PATTERNS};
use crate::embeds::traits::EmbedDecoder;
use crate::models::events::{FailureKind, Outcome, ResolutionEvent, Stage};
use crate::models::media::ResolvedLinkSet;

static LAT_ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".OD_LAT > li").unwrap());
static SUB_ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".OD_SUB > li").unwrap());

/// Language buckets on the older player page, in extraction order.
fn buckets() -> [(&'static str, &'static Selector); 2] {
    [("LAT", &*LAT_ITEMS), ("SUB", &*SUB_ITEMS)]
}

pub struct LegacyEmbedDecoder {
    fetcher: Arc<dyn Fetcher>,
}

impl LegacyEmbedDecoder {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Walks both language buckets and runs every onclick handler through
    /// the link patterns. Buckets with no links are left out of the set.
    pub fn decode_html(page_url: &str, html: &str) -> Outcome<ResolvedLinkSet> {
        let doc = Html::parse_document(html);
        let mut outcome: Outcome<ResolvedLinkSet> = Outcome::default();
        let mut seen_items = 0usize;

        for (language, selector) in buckets() {
            let mut links = Vec::new();
            for item in doc.select(selector) {
                seen_items += 1;
                let Some(onclick) = item.value().attr("onclick") else {
                    continue;
                };
                let extraction = extract_links(&ONCLICK_PATTERNS, onclick);
                for failure in extraction.failures {
                    outcome.record(ResolutionEvent::new(
                        Stage::Legacy,
                        FailureKind::Decode,
                        page_url,
                        format!("{} item ({}): {}", language, failure.pattern, failure.message),
                    ));
                }
                links.extend(extraction.links);
            }
            tracing::debug!("[legacy] {} links for {}", links.len(), language);
            outcome.value.extend_language(language, links);
        }

        if seen_items == 0 {
            outcome.record(ResolutionEvent::new(
                Stage::Legacy,
                FailureKind::AbsentFeature,
                page_url,
                "no language buckets on page",
            ));
        }
        outcome
    }
}

#[async_trait]
impl EmbedDecoder for LegacyEmbedDecoder {
    fn name(&self) -> &str {
        "legacy"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("re.sololatino.net")
    }

    async fn decode(&self, page_url: &str) -> Outcome<ResolvedLinkSet> {
        match self.fetcher.get_text(page_url).await {
            Ok(html) => Self::decode_html(page_url, &html),
            Err(e) => {
                let mut outcome = Outcome::default();
                outcome.record(ResolutionEvent::new(
                    Stage::Legacy,
                    FailureKind::Remote,
                    page_url,
                    format!("fetch failed: {}", e),
                ));
                outcome
            }
        }
    }
}
