pub mod client;
pub mod normalize;
pub mod pubapi;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{DefaultOnError, serde_as};

// ---------------------------------------------------------------------------
// Domain types — display-ready view model, independent of the PubAPI wire format
// ---------------------------------------------------------------------------

/// Directory filter: the federation titles the directory endpoint knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Title {
    #[default]
    Gm,
    Wgm,
    Im,
    Wim,
    Fm,
    Wfm,
    Nm,
    Wnm,
    Cm,
    Wcm,
}

impl Title {
    pub const ALL: [Title; 10] = [
        Title::Gm,
        Title::Wgm,
        Title::Im,
        Title::Wim,
        Title::Fm,
        Title::Wfm,
        Title::Nm,
        Title::Wnm,
        Title::Cm,
        Title::Wcm,
    ];

    /// Path segment used by `/pub/titled/{title}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Title::Gm => "GM",
            Title::Wgm => "WGM",
            Title::Im => "IM",
            Title::Wim => "WIM",
            Title::Fm => "FM",
            Title::Wfm => "WFM",
            Title::Nm => "NM",
            Title::Wnm => "WNM",
            Title::Cm => "CM",
            Title::Wcm => "WCM",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Title::Gm => "Grandmasters",
            Title::Wgm => "Woman Grandmasters",
            Title::Im => "International Masters",
            Title::Wim => "Woman International Masters",
            Title::Fm => "FIDE Masters",
            Title::Wfm => "Woman FIDE Masters",
            Title::Nm => "National Masters",
            Title::Wnm => "Woman National Masters",
            Title::Cm => "Candidate Masters",
            Title::Wcm => "Woman Candidate Masters",
        }
    }

    /// Case-insensitive lookup by abbreviation ("gm", "WIM", ...).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    /// Cycles through [`Title::ALL`], wrapping back to GM.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Player identity and account metadata, as served by `/pub/player/{username}`.
///
/// Only `username` is required; a profile without it is a parse failure. Every
/// other field degrades to absent (or zero) when missing or mistyped.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerProfile {
    /// Case-preserved for display. Compare via [`PlayerProfile::viewer_key`].
    pub username: String,
    /// Zero when the payload omits it.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub player_id: u64,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub url: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub title: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub status: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub avatar: Option<String>,
    /// Resource URL (e.g. `.../pub/country/US`), resolved to a name by the aggregator.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub country: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub location: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub joined: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub last_online: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub league: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub verified: bool,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub is_streamer: bool,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub twitch_url: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub youtube_url: Option<String>,
}

impl PlayerProfile {
    /// Lowercased username used to locate the player's side in game records.
    pub fn viewer_key(&self) -> String {
        self.username.to_lowercase()
    }

    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined.and_then(epoch_to_utc)
    }

    pub fn last_online_at(&self) -> Option<DateTime<Utc>> {
        self.last_online.and_then(epoch_to_utc)
    }

    /// (label, url) pairs; empty unless the account is flagged as a streamer.
    pub fn streaming_links(&self) -> Vec<(&'static str, &str)> {
        if !self.is_streamer {
            return Vec::new();
        }
        [("Twitch", &self.twitch_url), ("YouTube", &self.youtube_url)]
            .into_iter()
            .filter_map(|(label, url)| url.as_deref().filter(|u| !u.is_empty()).map(|u| (label, u)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Rapid,
    Blitz,
    Bullet,
}

impl GameMode {
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Rapid => "rapid",
            GameMode::Blitz => "blitz",
            GameMode::Bullet => "bullet",
        }
    }
}

/// Rating and record snapshot for one game mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStat {
    pub mode: GameMode,
    pub last: Option<u32>,
    pub best: Option<u32>,
    pub win: Option<u32>,
    pub loss: Option<u32>,
    pub draw: Option<u32>,
}

impl ModeStat {
    pub fn has_any_field(&self) -> bool {
        self.last.is_some()
            || self.best.is_some()
            || self.win.is_some()
            || self.loss.is_some()
            || self.draw.is_some()
    }
}

/// The viewed player's side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn label(&self) -> &'static str {
        match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        }
    }
}

/// Outcome from the viewed player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl GameResult {
    pub fn short_label(&self) -> &'static str {
        match self {
            GameResult::Win => "W",
            GameResult::Loss => "L",
            GameResult::Draw => "D",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OngoingGame {
    pub url: String,
    pub opponent: String,
    pub color: PieceColor,
    pub time_class: Option<String>,
    /// Move deadline, epoch seconds.
    pub move_by: Option<i64>,
}

impl OngoingGame {
    pub fn move_by_at(&self) -> Option<DateTime<Utc>> {
        self.move_by.and_then(epoch_to_utc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedGame {
    pub url: String,
    pub opponent: String,
    pub color: PieceColor,
    pub result: GameResult,
    pub time_class: Option<String>,
    pub time_control: Option<String>,
    /// Epoch seconds.
    pub end_time: Option<i64>,
}

impl FinishedGame {
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.end_time.and_then(epoch_to_utc)
    }
}

/// Present only when at least one of the two lists is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameLists {
    pub ongoing: Option<Vec<OngoingGame>>,
    pub recent: Option<Vec<FinishedGame>>,
}

/// Everything the profile page shows, assembled fresh per request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileData {
    pub player: PlayerProfile,
    pub country_name: Option<String>,
    pub stats: Option<Vec<ModeStat>>,
    pub games: Option<GameLists>,
}

impl ProfileData {
    pub fn ongoing(&self) -> &[OngoingGame] {
        self.games
            .as_ref()
            .and_then(|g| g.ongoing.as_deref())
            .unwrap_or_default()
    }

    pub fn recent(&self) -> &[FinishedGame] {
        self.games
            .as_ref()
            .and_then(|g| g.recent.as_deref())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> &[ModeStat] {
        self.stats.as_deref().unwrap_or_default()
    }
}

fn epoch_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
