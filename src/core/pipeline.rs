use std::sync::Arc;

use crate::core::dispatcher::VideoResolutionDispatcher;
use crate::core::ranker::StreamRanker;
use crate::core::registry::ExtractorRegistry;
use crate::embeds::find_decoder;
use crate::embeds::traits::EmbedDecoder;
use crate::models::events::Outcome;
use crate::models::media::{ResolvedLinkSet, VideoCandidate};
use crate::models::settings::UserPreference;
use crate::sources::traits::SiteSource;

/// Episode page to ranked streams for one site.
pub struct VideoListResolver {
    source: Arc<dyn SiteSource>,
    decoders: Vec<Arc<dyn EmbedDecoder>>,
    dispatcher: VideoResolutionDispatcher,
}

impl VideoListResolver {
    pub fn new(
        source: Arc<dyn SiteSource>,
        decoders: Vec<Arc<dyn EmbedDecoder>>,
        registry: Arc<ExtractorRegistry>,
        max_concurrent: usize,
    ) -> Self {
        let dispatcher = VideoResolutionDispatcher::new(registry, source.classifier(), max_concurrent);
        Self {
            source,
            decoders,
            dispatcher,
        }
    }

    pub fn source(&self) -> &dyn SiteSource {
        self.source.as_ref()
    }

    /// Decodes every embed page the episode references, merged by language.
    pub async fn embed_links(&self, episode_url: &str) -> Outcome<ResolvedLinkSet> {
        let mut outcome: Outcome<ResolvedLinkSet> = Outcome::default();
        let pages = outcome.absorb(self.source.embed_pages(episode_url).await);

        for page in &pages {
            let Some(decoder) = find_decoder(&self.decoders, page) else {
                tracing::debug!("[source] {}: no decoder for {}", self.source.name(), page);
                continue;
            };
            let links = outcome.absorb(decoder.decode(page).await);
            outcome.value.merge(links);
        }
        outcome
    }

    pub async fn video_list(
        &self,
        episode_url: &str,
        preference: &UserPreference,
    ) -> Outcome<Vec<VideoCandidate>> {
        let mut outcome = self.embed_links(episode_url).await;
        let links = std::mem::take(&mut outcome.value);
        tracing::info!(
            "[source] {}: {} embed links in {} languages",
            self.source.name(),
            links.url_count(),
            links.languages().count()
        );

        let candidates = outcome.absorb(self.dispatcher.resolve_set(&links).await);
        let ranked = StreamRanker::rank(candidates, preference);
        tracing::info!("[source] {}: {} streams for {}", self.source.name(), ranked.len(), episode_url);
        Outcome::with_events(ranked, outcome.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetcher::testing::FakeFetcher;
    use crate::core::fetcher::Fetcher;
    use crate::embeds::default_decoders;
    use crate::extractors::traits::VideoExtractor;
    use crate::models::events::{FailureKind, Stage};
    use crate::models::providers::ProviderId;
    use crate::sources::pelisplushd::PelisPlusHd;
    use async_trait::async_trait;

    const EPISODE: &str = "https://pelisplushd.bz/serie/show/temporada/1/capitulo/1";
    const EMBED69: &str = "https://embed69.org/f/tt77-1x1";
    const LEGACY: &str = "https://re.sololatino.net/embed.php?id=77";

    struct Labelled(&'static str);

    #[async_trait]
    impl VideoExtractor for Labelled {
        fn name(&self) -> &str {
            self.0
        }

        async fn videos_from_url(&self, url: &str, prefix: &str) -> anyhow::Result<Vec<VideoCandidate>> {
            Ok(vec![VideoCandidate::new(format!("{}#play", url), format!("{}{}", prefix, self.0))])
        }
    }

    fn episode_page() -> String {
        format!(
            "<script>video[1] = '{}'; video[2] = '{}'; video[3] = 'https://unknown.example/x';</script>",
            EMBED69, LEGACY
        )
    }

    fn fetcher() -> Arc<FakeFetcher> {
        let manifest = r#"[{"video_language":"LAT","sortedEmbeds":[{"link":"enc-voe"}]},
                          {"video_language":"SUB","sortedEmbeds":[{"link":"enc-bad"}]}]"#;
        Arc::new(
            FakeFetcher::new()
                .page(EPISODE, &episode_page())
                .page(EMBED69, &format!("<script>const dataLink = {};</script>", manifest))
                .page(
                    LEGACY,
                    r#"<ul class="OD_SUB"><li onclick="go_to_player('https://streamwish.to/e/w1')">w</li></ul>"#,
                )
                .on_post(|_, body| {
                    if body.contains("enc-voe") {
                        Ok(r#"{"success":true,"links":[{"index":0,"link":"https://voe.sx/e/v1"}]}"#.into())
                    } else {
                        Ok(r#"{"success":false}"#.into())
                    }
                }),
        )
    }

    fn resolver(fetcher: Arc<FakeFetcher>) -> VideoListResolver {
        let mut registry = ExtractorRegistry::new();
        registry.register(ProviderId::Voe, Arc::new(Labelled("720p")));
        registry.register(ProviderId::StreamWish, Arc::new(Labelled("1080p")));
        let shared: Arc<dyn Fetcher> = fetcher;
        VideoListResolver::new(
            Arc::new(PelisPlusHd::new(shared.clone())),
            default_decoders(shared, "https://embed69.org/api/decrypt"),
            Arc::new(registry),
            4,
        )
    }

    #[tokio::test]
    async fn episode_resolves_through_both_decoders() {
        let resolver = resolver(fetcher());
        let links = resolver.embed_links(EPISODE).await;
        assert_eq!(links.value.get("LAT").unwrap(), ["https://voe.sx/e/v1"]);
        assert_eq!(links.value.get("SUB").unwrap(), ["https://streamwish.to/e/w1"]);
        assert_eq!(links.events.len(), 1);
        assert_eq!(links.events[0].stage, Stage::DataLink);
    }

    #[tokio::test]
    async fn video_list_is_ranked_by_preference() {
        let resolver = resolver(fetcher());
        let pref = UserPreference {
            preferred_server: "Voe".into(),
            ..UserPreference::default()
        };
        let outcome = resolver.video_list(EPISODE, &pref).await;
        let labels: Vec<_> = outcome.value.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["LAT Voe:720p", "SUB StreamWish:1080p"]);
        assert!(outcome.events.iter().all(|e| e.kind == FailureKind::Remote));
    }

    #[tokio::test]
    async fn unreachable_episode_yields_empty_list_with_event() {
        let resolver = resolver(Arc::new(FakeFetcher::new()));
        let outcome = resolver.video_list(EPISODE, &UserPreference::default()).await;
        assert!(outcome.value.is_empty());
        assert_eq!(outcome.events[0].stage, Stage::Source);
    }
}
