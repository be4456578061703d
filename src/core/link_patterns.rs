use std::sync::LazyLock;

use anyhow::anyhow;
use base64::Engine;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    Raw,
    Base64Utf8,
}

pub struct LinkPattern {
    pub name: &'static str,
    pub regex: &'static LazyLock<Regex>,
    pub post: PostProcess,
}

static VAST_PLAYER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"go_to_playerVast\('(.+?)'").unwrap());
static PLAYER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"go_to_player\('(.+?)'").unwrap());
static PHP_BRIDGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.php\?link=(.+?)&servidor=").unwrap());

/// Patterns tried against every `onclick` handler, in this order.
pub static ONCLICK_PATTERNS: [LinkPattern; 3] = [
    LinkPattern {
        name: "vast_player",
        regex: &VAST_PLAYER_RE,
        post: PostProcess::Raw,
    },
    LinkPattern {
        name: "player",
        regex: &PLAYER_RE,
        post: PostProcess::Raw,
    },
    LinkPattern {
        name: "php_bridge",
        regex: &PHP_BRIDGE_RE,
        post: PostProcess::Base64Utf8,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    pub pattern: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub links: Vec<String>,
    pub failures: Vec<PatternFailure>,
}

pub fn decode_base64_text(payload: &str) -> anyhow::Result<String> {
    let payload = payload.trim();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(payload))
        .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(payload))
        .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload))
        .map_err(|e| anyhow!("invalid base64 payload: {}", e))?;
    String::from_utf8(bytes).map_err(|e| anyhow!("decoded payload is not UTF-8: {}", e))
}

impl LinkPattern {
    fn apply(&self, text: &str) -> Option<anyhow::Result<String>> {
        let captured = self.regex.captures(text)?.get(1)?.as_str();
        Some(match self.post {
            PostProcess::Raw => Ok(captured.to_string()),
            PostProcess::Base64Utf8 => decode_base64_text(captured),
        })
    }
}

/// Runs every pattern independently; one handler can yield up to one link per pattern.
pub fn extract_links(patterns: &[LinkPattern], text: &str) -> Extraction {
    let mut extraction = Extraction::default();
    for pattern in patterns {
        match pattern.apply(text) {
            None => {}
            Some(Ok(link)) if link.trim().is_empty() => {}
            Some(Ok(link)) => extraction.links.push(link),
            Some(Err(e)) => extraction.failures.push(PatternFailure {
                pattern: pattern.name,
                message: e.to_string(),
            }),
        }
    }
    extraction
}
