use std::sync::Arc;

use serde::Serialize;

use crate::core::classifier::ProviderClassifier;
use crate::embeds::find_decoder;
use crate::models::events::{Outcome, ResolutionEvent};
use crate::models::media::{ResolvedLinkSet, VideoCandidate};
use crate::models::providers::ProviderId;
use crate::models::settings::UserPreference;
use crate::sources::traits::SiteSource;
use crate::sources::{source_by_name, source_for_url};
pub use crate::storage::preferences::PreferenceOverrides;
use crate::storage::preferences::{load_preference, PreferenceStore};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub site: String,
    pub episode_url: String,
    pub preference: UserPreference,
    pub streams: Vec<VideoCandidate>,
    pub events: Vec<ResolutionEvent>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyReport {
    pub url: String,
    pub provider: ProviderId,
    pub routed_url: String,
}

fn pick_source(
    state: &AppState,
    site: Option<&str>,
    url: &str,
) -> anyhow::Result<Arc<dyn SiteSource>> {
    match site {
        Some(name) => source_by_name(name, state.fetcher.clone()),
        None => source_for_url(url, state.fetcher.clone())
            .ok_or_else(|| anyhow::anyhow!("No site handles {}, pass --site", url)),
    }
}

pub async fn resolve_episode(
    state: &AppState,
    store: &dyn PreferenceStore,
    site: Option<&str>,
    episode_url: &str,
    overrides: &PreferenceOverrides,
) -> anyhow::Result<ResolveReport> {
    let source = pick_source(state, site, episode_url)?;
    let preference = overrides.apply(load_preference(store, &source.default_preference()));
    let resolver = state.resolver(source.clone());

    let outcome = resolver.video_list(episode_url, &preference).await;
    Ok(ResolveReport {
        site: source.name().to_string(),
        episode_url: episode_url.to_string(),
        preference,
        streams: outcome.value,
        events: outcome.events,
    })
}

pub async fn decode_embed(state: &AppState, embed_url: &str) -> anyhow::Result<Outcome<ResolvedLinkSet>> {
    let decoder = find_decoder(&state.decoders, embed_url)
        .ok_or_else(|| anyhow::anyhow!("No decoder handles {}", embed_url))?;
    Ok(decoder.decode(embed_url).await)
}

pub fn classify_url(state: &AppState, site: Option<&str>, url: &str) -> anyhow::Result<ClassifyReport> {
    let classifier = match site {
        Some(name) => source_by_name(name, state.fetcher.clone())?.classifier(),
        None => ProviderClassifier::default(),
    };
    let route = classifier.route(url);
    Ok(ClassifyReport {
        url: url.to_string(),
        provider: route.provider,
        routed_url: route.url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetcher::testing::FakeFetcher;
    use crate::models::settings::{AppSettings, PreferredQuality};
    use crate::storage::preferences::JsonPreferenceStore;

    const EPISODE: &str = "https://sololatino.net/episodios/show-1x1/";
    const EMBED: &str = "https://embed69.org/f/tt5-1x1";
    const WOLF: &str = "https://wolfstream.tv/embed-k1.html";

    fn state() -> AppState {
        let fetcher = FakeFetcher::new()
            .page(
                EPISODE,
                r#"<li data-type="tv" data-post="10" data-nume="1">Opcion</li>"#,
            )
            .page(EMBED, r#"<script>var dataLink = [{"video_language":"LAT","sortedEmbeds":[{"link":"w"}]}];</script>"#)
            .page(
                WOLF,
                r#"<script>jwplayer().setup({sources: [{file:"https://cdn.wolf/hls/720p/index.m3u8"}]});</script>"#,
            )
            .on_post(|url, _| {
                if url.ends_with("admin-ajax.php") {
                    Ok(format!("<iframe class='metaframe' src='{}'></iframe>", EMBED))
                } else {
                    Ok(format!(r#"{{"success":true,"links":[{{"index":0,"link":"{}"}}]}}"#, WOLF))
                }
            });
        AppState::with_fetcher(AppSettings::default(), Arc::new(fetcher))
    }

    #[tokio::test]
    async fn resolves_episode_with_site_inferred_from_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::open(&dir.path().join("prefs.json"));
        let report = resolve_episode(&state(), &store, None, EPISODE, &PreferenceOverrides::default())
            .await
            .unwrap();

        assert_eq!(report.site, "sololatino");
        assert_eq!(report.preference.preferred_server, "StreamWish");
        assert_eq!(report.streams.len(), 1);
        assert_eq!(report.streams[0].label, "LAT Universal:720p");
        assert_eq!(report.streams[0].url, "https://cdn.wolf/hls/720p/index.m3u8");
        assert!(report.events.is_empty());
    }

    #[tokio::test]
    async fn overrides_win_over_site_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::open(&dir.path().join("prefs.json"));
        let overrides = PreferenceOverrides {
            quality: Some(PreferredQuality::P720),
            server: Some("WolfStream".into()),
            language: None,
        };
        let report = resolve_episode(&state(), &store, Some("sololatino"), EPISODE, &overrides)
            .await
            .unwrap();
        assert_eq!(report.preference.preferred_quality, PreferredQuality::P720);
        assert_eq!(report.preference.preferred_server, "WolfStream");
        assert_eq!(report.preference.preferred_language.as_deref(), Some("LAT"));
    }

    #[tokio::test]
    async fn unknown_site_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::open(&dir.path().join("prefs.json"));
        let result = resolve_episode(
            &state(),
            &store,
            None,
            "https://example.com/ep/1",
            &PreferenceOverrides::default(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn decode_runs_matching_decoder_only() {
        let outcome = decode_embed(&state(), EMBED).await.unwrap();
        assert_eq!(outcome.value.get("LAT").unwrap(), [WOLF]);
        assert!(decode_embed(&state(), "https://voe.sx/e/1").await.is_err());
    }

    #[test]
    fn classify_uses_site_table_when_given() {
        let state = state();
        let default = classify_url(&state, None, "https://streamvid.net/e/9").unwrap();
        assert_eq!(default.provider, ProviderId::Universal);
        let solo = classify_url(&state, Some("sololatino"), "https://streamvid.net/e/9").unwrap();
        assert_eq!(solo.provider, ProviderId::VidHide);
        assert_eq!(solo.routed_url, "https://streamvid.net/e/9");
        let vidhide = classify_url(&state, None, "https://filelions.to/v/abc").unwrap();
        assert_eq!(vidhide.routed_url, "https://callistanise.com/v/abc");
    }
}
