use crate::normalize::{normalize_ongoing_games, normalize_recent_games, normalize_stats};
use crate::pubapi::{
    ArchiveGamesResponse, ArchivesResponse, CountryResponse, CurrentGamesResponse, StatsResponse,
    TitledPlayersResponse,
};
use crate::{GameLists, PlayerProfile, ProfileData, Title};
use log::debug;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://api.chess.com";

/// Client for the chess.com published-data API.
#[derive(Debug, Clone)]
pub struct ChessApi {
    client: Client,
    base_url: String,
}

impl Default for ChessApi {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Status(StatusCode, String),
    Parsing(reqwest::Error, String),
    InvalidUsername(String),
    InvalidBaseUrl(String),
    Cancelled,
}

impl ApiError {
    /// HTTP status of a non-success response, if that is what failed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status(status, _) => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status(status, url) => write!(f, "HTTP {} for {url}", status.as_u16()),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::InvalidUsername(name) => write!(f, "Invalid username: {name:?}"),
            ApiError::InvalidBaseUrl(url) => write!(f, "Invalid base URL: {url:?}"),
            ApiError::Cancelled => write!(f, "Request cancelled"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl ChessApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another deployment of the API (or a test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("gmtui/", env!("CARGO_PKG_VERSION"), " (terminal player directory)"))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the usernames holding `title`, sorted case-insensitively.
    pub async fn fetch_titled_players(&self, title: Title) -> ApiResult<Vec<String>> {
        let url = format!("{}/pub/titled/{}", self.base_url, title.as_str());
        let raw: TitledPlayersResponse = self.get(&url, None).await?;
        debug!("directory {}: {} players", title.as_str(), raw.players.len());
        Ok(sort_players(raw.players))
    }

    /// Build the profile page view model for `username`.
    ///
    /// The profile, stats, current-games and archive-index lookups are issued
    /// together. Only the profile is required: its failure fails the call, while
    /// any failure in the other lookups (or in the follow-up country and archive
    /// period fetches) just leaves that part of the result empty.
    ///
    /// `cancel` reaches every outbound request; once it fires the call returns
    /// [`ApiError::Cancelled`].
    pub async fn fetch_profile_data(
        &self,
        username: &str,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ProfileData> {
        let username = username.trim();
        if username.is_empty() || username.contains('/') {
            return Err(ApiError::InvalidUsername(username.to_owned()));
        }

        let player_url = self.player_url(username)?.to_string();
        let stats_url = format!("{player_url}/stats");
        let games_url = format!("{player_url}/games");
        let archives_url = format!("{player_url}/games/archives");

        let (profile, stats, current_games, archives) = tokio::join!(
            self.get::<PlayerProfile>(&player_url, cancel),
            self.get_optional::<StatsResponse>(&stats_url, cancel),
            self.get_optional::<CurrentGamesResponse>(&games_url, cancel),
            self.get_optional::<ArchivesResponse>(&archives_url, cancel),
        );
        let player = profile?;
        let viewer = player.viewer_key();

        let (country_name, latest_archive) = tokio::join!(
            self.fetch_country_name(player.country.as_deref(), cancel),
            self.fetch_latest_archive(archives, cancel),
        );

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ApiError::Cancelled);
        }

        let stats = normalize_stats(stats.as_ref());
        let ongoing = normalize_ongoing_games(current_games.as_ref(), &viewer);
        let recent = normalize_recent_games(latest_archive.as_ref(), &viewer);
        debug!(
            "profile {username}: country={} stats={} ongoing={} recent={}",
            country_name.is_some(),
            stats.is_some(),
            ongoing.is_some(),
            recent.is_some()
        );

        let games = (ongoing.is_some() || recent.is_some()).then_some(GameLists { ongoing, recent });
        Ok(ProfileData {
            player,
            country_name,
            stats,
            games,
        })
    }

    async fn fetch_country_name(
        &self,
        country_url: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> Option<String> {
        let url = country_url.filter(|u| !u.is_empty())?;
        self.get_optional::<CountryResponse>(url, cancel)
            .await?
            .name
    }

    /// Only the most recent period is read; earlier ones are never merged in.
    /// A last entry that is not a non-empty string means no recent games.
    async fn fetch_latest_archive(
        &self,
        index: Option<ArchivesResponse>,
        cancel: Option<&CancellationToken>,
    ) -> Option<ArchiveGamesResponse> {
        let index = index?;
        let url = index.archives.last()?.as_str().filter(|u| !u.is_empty())?;
        self.get_optional(url, cancel).await
    }

    /// `{base}/pub/player/{username}` with the username percent-encoded as one segment.
    fn player_url(&self, username: &str) -> ApiResult<Url> {
        let invalid = || ApiError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["pub", "player", username]);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        until_cancelled(cancel, async {
            let response = self
                .client
                .get(url)
                .header(ACCEPT, "application/json")
                .header(CACHE_CONTROL, "no-cache")
                .send()
                .await
                .map_err(|e| ApiError::Network(e, url.to_owned()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::Status(status, url.to_owned()));
            }
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned()))
        })
        .await
    }

    /// Like [`Self::get`], but any failure degrades to `None`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: Option<&CancellationToken>,
    ) -> Option<T> {
        match self.get(url, cancel).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("optional lookup skipped: {e}");
                None
            }
        }
    }
}

async fn until_cancelled<T>(
    cancel: Option<&CancellationToken>,
    request: impl Future<Output = ApiResult<T>>,
) -> ApiResult<T> {
    let Some(token) = cancel else {
        return request.await;
    };
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ApiError::Cancelled),
        result = request => result,
    }
}

fn sort_players(mut players: Vec<String>) -> Vec<String> {
    players.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    players
}
