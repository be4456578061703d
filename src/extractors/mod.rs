use std::sync::LazyLock;

use regex::Regex;

pub mod traits;
pub mod universal;
pub mod wolfstream;

static URL_RESOLUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^0-9](2160|1440|1080|720|480|360|240)p?[^0-9]").unwrap());

/// `{prefix}{N}p` when the URL names a resolution, otherwise the container kind.
pub fn stream_label(prefix: &str, media_url: &str) -> String {
    if let Some(height) = URL_RESOLUTION_RE
        .captures(media_url)
        .and_then(|c| c.get(1))
    {
        return format!("{}{}p", prefix, height.as_str());
    }
    let kind = if media_url.contains(".m3u8") { "HLS" } else { "MP4" };
    format!("{}{}", prefix, kind)
}
