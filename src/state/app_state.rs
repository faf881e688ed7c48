use crate::app::MenuItem;
use chesscom_api::{ProfileData, Title};
use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Directory state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DirectoryState {
    pub title: Title,
    /// Sorted as received from the API client.
    pub players: Vec<String>,
    pub loaded: bool,
    /// Index into `visible_players()`, not `players`.
    pub selected: usize,
    pub filter: String,
    pub filtering: bool,
}

impl DirectoryState {
    pub fn load(&mut self, title: Title, players: Vec<String>) {
        self.title = title;
        self.players = players;
        self.loaded = true;
        self.selected = 0;
    }

    /// Switch title; the list is cleared until the new directory arrives.
    pub fn cycle_title(&mut self) -> Title {
        self.title = self.title.next();
        self.players.clear();
        self.loaded = false;
        self.selected = 0;
        self.title
    }

    pub fn visible_players(&self) -> Vec<&str> {
        let needle = self.filter.trim().to_lowercase();
        self.players
            .iter()
            .map(String::as_str)
            .filter(|p| needle.is_empty() || p.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn selected_player(&self) -> Option<String> {
        self.visible_players()
            .get(self.selected)
            .map(|p| p.to_string())
    }

    pub fn select_next(&mut self, step: usize) {
        let max = self.visible_players().len().saturating_sub(1);
        self.selected = (self.selected + step).min(max);
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.selected = 0;
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.selected = 0;
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.filtering = false;
        self.selected = 0;
    }
}

// ---------------------------------------------------------------------------
// Profile state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub enum ProfileStatus {
    #[default]
    Idle,
    Loading { username: String },
    Loaded(Box<ProfileData>),
    Failed { username: String, message: String },
}

#[derive(Debug, Default)]
pub struct ProfileState {
    pub status: ProfileStatus,
    pub scroll_offset: u16,
}

impl ProfileState {
    pub fn start_loading(&mut self, username: String) {
        self.status = ProfileStatus::Loading { username };
        self.scroll_offset = 0;
    }

    /// Username of the page being shown or loaded.
    pub fn username(&self) -> Option<&str> {
        match &self.status {
            ProfileStatus::Idle => None,
            ProfileStatus::Loading { username } | ProfileStatus::Failed { username, .. } => {
                Some(username.as_str())
            }
            ProfileStatus::Loaded(data) => Some(data.player.username.as_str()),
        }
    }

    /// Responses for a profile other than the one being loaded are stale.
    pub fn is_awaiting(&self, username: &str) -> bool {
        matches!(
            &self.status,
            ProfileStatus::Loading { username: pending } if pending.eq_ignore_ascii_case(username)
        )
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, ProfileStatus::Loading { .. })
    }

    pub fn data(&self) -> Option<&ProfileData> {
        match &self.status {
            ProfileStatus::Loaded(data) => Some(&**data),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub directory: DirectoryState,
    pub profile: ProfileState,
    /// Wall clock as of the last tick; only used for elapsed-time display.
    pub now: DateTime<Utc>,
}

impl AppState {
    pub fn new(title: Title) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            last_error: None,
            directory: DirectoryState { title, ..Default::default() },
            profile: ProfileState::default(),
            now: Utc::now(),
        }
    }
}
