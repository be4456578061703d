use async_trait::async_trait;

use crate::models::events::Outcome;
use crate::models::media::ResolvedLinkSet;

/// Turns an embed page into language-grouped candidate URLs.
///
/// Decoders never fail: anything that goes wrong is reported through the
/// outcome's events and the page simply yields fewer links.
#[async_trait]
pub trait EmbedDecoder: Send + Sync {
    fn name(&self) -> &str;
    fn can_handle(&self, url: &str) -> bool;
    async fn decode(&self, page_url: &str) -> Outcome<ResolvedLinkSet>;
}
