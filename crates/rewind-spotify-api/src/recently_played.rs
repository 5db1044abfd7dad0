use serde::Deserialize;
use serde::Serialize;

use crate::track::Track;

/// One page of `GET /me/player/recently-played`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentlyPlayedPage {
    pub items: Vec<PlayHistory>,
    pub next: Option<String>,
    pub cursors: Option<Cursors>,
    pub limit: Option<i64>,
    pub href: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayHistory {
    pub track: Track,
    pub played_at: String,
    pub context: Option<serde_json::Value>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cursors {
    pub after: Option<String>,
    pub before: Option<String>,
}

/// The response as received, next to its typed view.
///
/// `raw` is what gets dumped back to the user; `page` drives the track list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentlyPlayed {
    pub raw: serde_json::Value,
    pub page: RecentlyPlayedPage,
}

impl RecentlyPlayed {
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        let page = serde_json::from_value(raw.clone())?;
        Ok(RecentlyPlayed { raw, page })
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.page.items.iter().map(|item| &item.track)
    }
}
