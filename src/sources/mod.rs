pub mod pelisplushd;
pub mod sololatino;
pub mod traits;

use std::sync::Arc;

use crate::core::fetcher::Fetcher;
use traits::SiteSource;

pub const SITE_NAMES: [&str; 2] = ["pelisplushd", "sololatino"];

pub fn source_by_name(name: &str, fetcher: Arc<dyn Fetcher>) -> anyhow::Result<Arc<dyn SiteSource>> {
    match name.trim().to_lowercase().as_str() {
        "pelisplushd" => Ok(Arc::new(pelisplushd::PelisPlusHd::new(fetcher))),
        "sololatino" => Ok(Arc::new(sololatino::SoloLatino::new(fetcher))),
        other => Err(anyhow::anyhow!(
            "Unknown site '{}', expected one of: {}",
            other,
            SITE_NAMES.join(", ")
        )),
    }
}

/// Picks the site from the episode URL's host.
pub fn source_for_url(url: &str, fetcher: Arc<dyn Fetcher>) -> Option<Arc<dyn SiteSource>> {
    SITE_NAMES
        .iter()
        .filter_map(|name| source_by_name(name, fetcher.clone()).ok())
        .find(|source| source.can_handle(url))
}
