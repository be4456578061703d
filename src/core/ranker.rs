use std::cmp::Reverse;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::media::VideoCandidate;
use crate::models::settings::UserPreference;

static RESOLUTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)p").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    language: bool,
    server: bool,
    quality: bool,
    resolution: u32,
}

pub fn resolution_of(tag: &str) -> u32 {
    RESOLUTION_RE
        .captures(tag)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

pub struct StreamRanker;

impl StreamRanker {
    fn key(candidate: &VideoCandidate, preference: &UserPreference) -> RankKey {
        let tag = candidate.quality.as_str();
        let server = preference.preferred_server.trim().to_lowercase();
        RankKey {
            language: preference
                .preferred_language
                .as_deref()
                .is_some_and(|lang| !lang.is_empty() && tag.contains(lang)),
            server: !server.is_empty() && tag.to_lowercase().contains(&server),
            quality: tag.contains(preference.preferred_quality.token()),
            resolution: resolution_of(tag),
        }
    }

    /// Highest priority first; candidates with equal keys keep their order.
    pub fn rank(mut candidates: Vec<VideoCandidate>, preference: &UserPreference) -> Vec<VideoCandidate> {
        candidates.sort_by_cached_key(|c| Reverse(Self::key(c, preference)));
        candidates
    }
}
