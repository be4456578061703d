use async_trait::async_trait;

use crate::core::classifier::ProviderClassifier;
use crate::models::events::Outcome;
use crate::models::settings::UserPreference;

/// A catalogue site whose episode pages point at embed pages.
#[async_trait]
pub trait SiteSource: Send + Sync {
    fn name(&self) -> &str;
    fn base_url(&self) -> &str;
    fn can_handle(&self, url: &str) -> bool;
    /// Embed page URLs referenced by the episode, in page order.
    async fn embed_pages(&self, episode_url: &str) -> Outcome<Vec<String>>;
    fn classifier(&self) -> ProviderClassifier;
    fn default_preference(&self) -> UserPreference;
}
