use async_trait::async_trait;

use crate::models::media::VideoCandidate;

/// A provider-specific resolver turning an embed URL into playable streams.
///
/// `prefix` is the label every returned candidate should start with. An empty
/// result means the provider had no stream for this URL.
#[async_trait]
pub trait VideoExtractor: Send + Sync {
    fn name(&self) -> &str;
    async fn videos_from_url(&self, url: &str, prefix: &str) -> anyhow::Result<Vec<VideoCandidate>>;
}
