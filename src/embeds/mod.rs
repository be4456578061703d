pub mod data_link;
pub mod legacy;
pub mod traits;

use std::sync::Arc;

use crate::core::fetcher::Fetcher;
use traits::EmbedDecoder;

/// Decoders in lookup order; the first whose host marker matches wins.
pub fn default_decoders(
    fetcher: Arc<dyn Fetcher>,
    decrypt_endpoint: &str,
) -> Vec<Arc<dyn EmbedDecoder>> {
    vec![
        Arc::new(data_link::EmbedDataDecoder::new(fetcher.clone(), decrypt_endpoint)),
        Arc::new(legacy::LegacyEmbedDecoder::new(fetcher)),
    ]
}

pub fn find_decoder<'a>(
    decoders: &'a [Arc<dyn EmbedDecoder>],
    url: &str,
) -> Option<&'a Arc<dyn EmbedDecoder>> {
    decoders.iter().find(|d| d.can_handle(url))
}
