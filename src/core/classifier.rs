use crate::models::providers::ProviderId;

/// An ordered marker group routing URLs to one provider.
#[derive(Debug)]
pub struct ProviderRule {
    pub provider: ProviderId,
    pub markers: &'static [&'static str],
    /// Host the media id is re-played against before extraction.
    pub mirror_host: Option<&'static str>,
}

impl ProviderRule {
    fn matches(&self, lowered_url: &str) -> bool {
        self.markers.iter().any(|m| lowered_url.contains(m))
    }
}

pub const VIDHIDE_MIRROR: &str = "https://callistanise.com";

pub static DEFAULT_RULES: &[ProviderRule] = &[
    ProviderRule {
        provider: ProviderId::Voe,
        markers: &["voe"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::Uqload,
        markers: &["uqload"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::Mp4Upload,
        markers: &["mp4upload"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::WolfStream,
        markers: &["wolfstream"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::Filemoon,
        markers: &["filemoon", "moonplayer", "bysedikamoum"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::VidHide,
        markers: &["dintezuvio", "filelions", "vidhide", "anime7u"],
        mirror_host: Some(VIDHIDE_MIRROR),
    },
    ProviderRule {
        provider: ProviderId::StreamWish,
        markers: &["streamwish", "wish", "hglink", "hgplaycdn", "iplayerhls"],
        mirror_host: None,
    },
];

pub static SOLOLATINO_RULES: &[ProviderRule] = &[
    ProviderRule {
        provider: ProviderId::Voe,
        markers: &["voe"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::Uqload,
        markers: &["uqload"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::Mp4Upload,
        markers: &["mp4upload"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::StreamWish,
        markers: &["streamwish", "wish", "hglink"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::Filemoon,
        markers: &["filemoon", "moonplayer", "bysedikamoum"],
        mirror_host: None,
    },
    ProviderRule {
        provider: ProviderId::VidHide,
        markers: &["streamhide", "streamvid", "vidhide", "dintezuvio"],
        mirror_host: None,
    },
];

/// Where a URL should be sent and with which address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub provider: ProviderId,
    pub url: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderClassifier {
    rules: &'static [ProviderRule],
}

impl Default for ProviderClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}

impl ProviderClassifier {
    pub const fn new(rules: &'static [ProviderRule]) -> Self {
        Self { rules }
    }

    pub fn rule_for(&self, url: &str) -> Option<&'static ProviderRule> {
        let lowered = url.to_lowercase();
        self.rules.iter().find(|r| r.matches(&lowered))
    }

    pub fn classify(&self, url: &str) -> ProviderId {
        self.rule_for(url)
            .map(|r| r.provider)
            .unwrap_or(ProviderId::Universal)
    }

    pub fn route(&self, url: &str) -> Route {
        match self.rule_for(url) {
            Some(rule) => Route {
                provider: rule.provider,
                url: match rule.mirror_host {
                    Some(host) => mirror_url(url, host),
                    None => url.to_string(),
                },
            },
            None => Route {
                provider: ProviderId::Universal,
                url: url.to_string(),
            },
        }
    }
}

/// Rewrites `url` to `{host}/v/{last path segment}`.
pub fn mirror_url(url: &str, host: &str) -> String {
    let media_id = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(|s| s.to_string()))
        })
        .unwrap_or_else(|| url.rsplit('/').next().unwrap_or(url).to_string());
    format!("{}/v/{}", host.trim_end_matches('/'), media_id)
}
