/// Wire types for the chess.com published-data API.
/// Endpoints: https://api.chess.com/pub/...
///
/// Every field is treated as possibly absent or mistyped: scalars fall back to
/// `None` and list entries that do not fit the record shape become default
/// records in place, so list positions always match the upstream payload.
use serde::Deserialize;
use serde_json::Value;
use serde_with::{DefaultOnError, serde_as};

/// `/pub/titled/{title}`
#[derive(Deserialize, Default, Debug)]
pub struct TitledPlayersResponse {
    pub players: Vec<String>,
}

/// `/pub/player/{username}/stats`
#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct StatsResponse {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub chess_rapid: Option<ModeRecord>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub chess_blitz: Option<ModeRecord>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub chess_bullet: Option<ModeRecord>,
}

#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct ModeRecord {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub last: Option<RatingSnapshot>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub best: Option<RatingSnapshot>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub record: Option<WinLossRecord>,
}

#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct RatingSnapshot {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub date: Option<i64>,
}

#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct WinLossRecord {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub win: Option<u32>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub loss: Option<u32>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub draw: Option<u32>,
}

/// `/pub/player/{username}/games` — daily games still in progress.
#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct CurrentGamesResponse {
    /// A non-array value is read as an empty list.
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub games: Vec<CurrentGame>,
}

#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct CurrentGame {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub url: String,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub time_class: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub move_by: Option<i64>,
    /// Profile reference: a bare URL or an object carrying `@id`/`url`.
    #[serde(default)]
    pub white: Value,
    #[serde(default)]
    pub black: Value,
}

/// `/pub/player/{username}/games/archives` — one URL per monthly period, oldest first.
#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct ArchivesResponse {
    /// Kept as raw values: only a string in the last position names a period.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub archives: Vec<Value>,
}

/// One archive period, e.g. `/pub/player/{username}/games/2024/02`.
#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct ArchiveGamesResponse {
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub games: Vec<ArchivedGame>,
}

#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct ArchivedGame {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub url: String,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub time_class: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub time_control: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub white: Option<ArchivedPlayer>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub black: Option<ArchivedPlayer>,
}

#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct ArchivedPlayer {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub username: Option<String>,
    /// "win", "checkmated", "resigned", "timeout", "agreed", ...
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub result: Option<String>,
}

/// `/pub/country/{iso}`
#[serde_as]
#[derive(Deserialize, Default, Debug, Clone)]
pub struct CountryResponse {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
}
