use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Voe,
    Uqload,
    Mp4Upload,
    WolfStream,
    Filemoon,
    VidHide,
    StreamWish,
    Universal,
}

impl ProviderId {
    pub const ALL: [ProviderId; 8] = [
        ProviderId::Voe,
        ProviderId::Uqload,
        ProviderId::Mp4Upload,
        ProviderId::WolfStream,
        ProviderId::Filemoon,
        ProviderId::VidHide,
        ProviderId::StreamWish,
        ProviderId::Universal,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ProviderId::Voe => "voe",
            ProviderId::Uqload => "uqload",
            ProviderId::Mp4Upload => "mp4upload",
            ProviderId::WolfStream => "wolfstream",
            ProviderId::Filemoon => "filemoon",
            ProviderId::VidHide => "vidhide",
            ProviderId::StreamWish => "streamwish",
            ProviderId::Universal => "universal",
        }
    }

    /// Server name shown to the user and matched by the preferred-server setting.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Voe => "Voe",
            ProviderId::Uqload => "Uqload",
            ProviderId::Mp4Upload => "Mp4Upload",
            ProviderId::WolfStream => "WolfStream",
            ProviderId::Filemoon => "Filemoon",
            ProviderId::VidHide => "VidHide",
            ProviderId::StreamWish => "StreamWish",
            ProviderId::Universal => "Universal",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .iter()
            .copied()
            .find(|p| p.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", s))
    }
}
