use std::collections::HashMap;
use std::sync::Arc;

use crate::models::providers::ProviderId;

use crate::extractors::traits::VideoExtractor;

/// Provider id to extractor instance, built once at startup.
pub struct ExtractorRegistry {
    extractors: HashMap<ProviderId, Arc<dyn VideoExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    pub fn register(&mut self, provider: ProviderId, extractor: Arc<dyn VideoExtractor>) {
        if self.extractors.insert(provider, extractor).is_some() {
            tracing::debug!("Replaced extractor for {}", provider);
        }
    }

    pub fn get(&self, provider: ProviderId) -> Option<Arc<dyn VideoExtractor>> {
        self.extractors.get(&provider).cloned()
    }

    /// The provider's extractor, or the universal one when it has none.
    pub fn find_extractor(&self, provider: ProviderId) -> Option<(ProviderId, Arc<dyn VideoExtractor>)> {
        if let Some(extractor) = self.get(provider) {
            return Some((provider, extractor));
        }
        self.get(ProviderId::Universal)
            .map(|extractor| (ProviderId::Universal, extractor))
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.extractors.contains_key(p))
            .collect()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::VideoCandidate;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl VideoExtractor for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn videos_from_url(&self, _url: &str, _prefix: &str) -> anyhow::Result<Vec<VideoCandidate>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn unregistered_provider_falls_back_to_universal() {
        let mut registry = ExtractorRegistry::new();
        registry.register(ProviderId::Universal, Arc::new(Named("universal")));
        let (provider, extractor) = registry.find_extractor(ProviderId::Voe).unwrap();
        assert_eq!(provider, ProviderId::Universal);
        assert_eq!(extractor.name(), "universal");
    }

    #[test]
    fn registered_provider_wins() {
        let mut registry = ExtractorRegistry::new();
        registry.register(ProviderId::Universal, Arc::new(Named("universal")));
        registry.register(ProviderId::Voe, Arc::new(Named("voe")));
        let (provider, extractor) = registry.find_extractor(ProviderId::Voe).unwrap();
        assert_eq!(provider, ProviderId::Voe);
        assert_eq!(extractor.name(), "voe");
    }

    #[test]
    fn empty_registry_finds_nothing() {
        assert!(ExtractorRegistry::new().find_extractor(ProviderId::Filemoon).is_none());
    }

    #[test]
    fn providers_listed_in_canonical_order() {
        let mut registry = ExtractorRegistry::new();
        registry.register(ProviderId::Universal, Arc::new(Named("u")));
        registry.register(ProviderId::Voe, Arc::new(Named("v")));
        assert_eq!(registry.providers(), vec![ProviderId::Voe, ProviderId::Universal]);
    }
}
