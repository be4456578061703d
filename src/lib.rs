use std::sync::Arc;

use crate::core::classifier::ProviderClassifier;
use crate::core::dispatcher::VideoResolutionDispatcher;
use crate::core::fetcher::{Fetcher, HttpFetcher};
use crate::core::pipeline::VideoListResolver;
use crate::core::registry::ExtractorRegistry;
use crate::embeds::traits::EmbedDecoder;
use crate::models::providers::ProviderId;
use crate::models::settings::AppSettings;
use crate::sources::traits::SiteSource;

pub mod commands;
pub mod core;
pub mod embeds;
pub mod extractors;
pub mod models;
pub mod sources;
pub mod storage;

/// Extractors shipped with the crate. Providers without one resolve through
/// the universal extractor.
pub fn build_registry(fetcher: Arc<dyn Fetcher>) -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register(
        ProviderId::WolfStream,
        Arc::new(extractors::wolfstream::WolfStreamExtractor::new(fetcher.clone())),
    );
    registry.register(
        ProviderId::Universal,
        Arc::new(extractors::universal::UniversalExtractor::new(fetcher)),
    );
    registry
}

pub struct AppState {
    pub settings: AppSettings,
    pub fetcher: Arc<dyn Fetcher>,
    pub registry: Arc<ExtractorRegistry>,
    pub decoders: Vec<Arc<dyn EmbedDecoder>>,
}

impl AppState {
    pub fn new(settings: AppSettings) -> anyhow::Result<Self> {
        let client = crate::core::http_client::build_client(&settings.resolver, &settings.proxy)?;
        Ok(Self::with_fetcher(settings, Arc::new(HttpFetcher::new(client))))
    }

    pub fn with_fetcher(settings: AppSettings, fetcher: Arc<dyn Fetcher>) -> Self {
        let registry = Arc::new(build_registry(fetcher.clone()));
        let decoders = embeds::default_decoders(fetcher.clone(), &settings.resolver.decrypt_endpoint);
        Self {
            settings,
            fetcher,
            registry,
            decoders,
        }
    }

    pub fn dispatcher(&self, classifier: ProviderClassifier) -> VideoResolutionDispatcher {
        VideoResolutionDispatcher::new(
            self.registry.clone(),
            classifier,
            self.settings.resolver.max_concurrent_extractions,
        )
    }

    pub fn resolver(&self, source: Arc<dyn SiteSource>) -> VideoListResolver {
        VideoListResolver::new(
            source,
            self.decoders.clone(),
            self.registry.clone(),
            self.settings.resolver.max_concurrent_extractions,
        )
    }
}
