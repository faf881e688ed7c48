use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, ProfileStatus};
use chesscom_api::{ProfileData, Title};
use chrono::{DateTime, Utc};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Directory,
    Profile,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let app = Self::with_settings(AppSettings::load());

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            state: AppState::new(settings.title),
            settings,
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_directory_loaded(&mut self, title: Title, players: Vec<String>) {
        if title != self.state.directory.title {
            return;
        }
        self.state.last_error = None;
        self.state.directory.load(title, players);
    }

    pub fn on_profile_loaded(&mut self, username: &str, data: Box<ProfileData>) {
        if !self.state.profile.is_awaiting(username) {
            return;
        }
        self.state.profile.status = ProfileStatus::Loaded(data);
    }

    pub fn on_profile_failed(&mut self, username: String, message: String) {
        if !self.state.profile.is_awaiting(&username) {
            return;
        }
        self.state.profile.status = ProfileStatus::Failed { username, message };
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    pub fn on_clock_tick(&mut self, now: DateTime<Utc>) {
        self.state.now = now;
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Directory navigation
    // -----------------------------------------------------------------------

    pub fn directory_down(&mut self, step: usize) {
        self.state.directory.select_next(step);
    }

    pub fn directory_up(&mut self, step: usize) {
        self.state.directory.select_prev(step);
    }

    /// Returns the newly selected title so the caller can request its directory.
    pub fn cycle_title(&mut self) -> Title {
        self.state.last_error = None;
        self.state.directory.clear_filter();
        self.state.directory.cycle_title()
    }

    pub fn start_filter(&mut self) {
        self.state.directory.filtering = true;
    }

    /// Leaves filter input mode but keeps the current filter applied.
    pub fn finish_filter(&mut self) {
        self.state.directory.filtering = false;
    }

    /// Returns the username to load if a player is selected.
    /// Switches to the Profile tab as a side-effect.
    pub fn open_selected_player(&mut self) -> Option<String> {
        let username = self.state.directory.selected_player()?;
        self.open_profile(username.clone());
        Some(username)
    }

    pub fn open_profile(&mut self, username: String) {
        self.state.profile.start_loading(username);
        self.update_tab(MenuItem::Profile);
    }

    /// Username to reload on the profile page, restarting its load.
    pub fn reload_profile(&mut self) -> Option<String> {
        let username = self.state.profile.username()?.to_string();
        self.state.profile.start_loading(username.clone());
        Some(username)
    }

    /// Returns true if a profile load was still in flight and should be cancelled.
    pub fn back_to_directory(&mut self) -> bool {
        let was_loading = self.state.profile.is_loading();
        self.state.profile.status = ProfileStatus::Idle;
        self.update_tab(MenuItem::Directory);
        was_loading
    }

    pub fn profile_scroll_down(&mut self) {
        self.state.profile.scroll_offset = self.state.profile.scroll_offset.saturating_add(1);
    }

    pub fn profile_scroll_up(&mut self) {
        self.state.profile.scroll_offset = self.state.profile.scroll_offset.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chesscom_api::PlayerProfile;

    fn app_with_players(players: &[&str]) -> App {
        let mut app = App::with_settings(AppSettings::default());
        app.on_directory_loaded(Title::Gm, players.iter().map(|p| p.to_string()).collect());
        app
    }

    fn profile(username: &str) -> Box<ProfileData> {
        Box::new(ProfileData {
            player: PlayerProfile {
                username: username.to_string(),
                player_id: 1,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn opening_a_player_switches_to_profile_tab() {
        let mut app = app_with_players(&["hikaru", "magnuscarlsen"]);
        app.directory_down(1);

        assert_eq!(app.open_selected_player().as_deref(), Some("magnuscarlsen"));
        assert_eq!(app.state.active_tab, MenuItem::Profile);
        assert!(app.state.profile.is_awaiting("magnuscarlsen"));
    }

    #[test]
    fn stale_profile_responses_are_ignored() {
        let mut app = app_with_players(&["hikaru", "magnuscarlsen"]);
        app.open_profile("hikaru".into());
        app.open_profile("magnuscarlsen".into());

        app.on_profile_loaded("hikaru", profile("Hikaru"));
        assert!(app.state.profile.data().is_none());

        app.on_profile_loaded("MagnusCarlsen", profile("MagnusCarlsen"));
        assert_eq!(
            app.state.profile.data().map(|d| d.player.username.as_str()),
            Some("MagnusCarlsen")
        );
    }

    #[test]
    fn leaving_a_loading_profile_requests_cancel() {
        let mut app = app_with_players(&["hikaru"]);
        app.open_profile("hikaru".into());

        assert!(app.back_to_directory());
        assert_eq!(app.state.active_tab, MenuItem::Directory);

        // A late response for the abandoned page changes nothing.
        app.on_profile_loaded("hikaru", profile("Hikaru"));
        assert!(app.state.profile.data().is_none());
        assert!(!app.back_to_directory());
    }

    #[test]
    fn profile_failure_is_kept_for_display() {
        let mut app = app_with_players(&["nobody"]);
        app.open_profile("nobody".into());
        app.on_profile_failed("nobody".into(), "HTTP 404 for u".into());

        match &app.state.profile.status {
            ProfileStatus::Failed { username, message } => {
                assert_eq!(username, "nobody");
                assert_eq!(message, "HTTP 404 for u");
            }
            other => panic!("unexpected status: {other:?}"),
        }
        assert_eq!(app.reload_profile().as_deref(), Some("nobody"));
        assert!(app.state.profile.is_loading());
    }

    #[test]
    fn directory_for_previous_title_is_dropped() {
        let mut app = app_with_players(&["hikaru"]);
        assert_eq!(app.cycle_title(), Title::Wgm);

        app.on_directory_loaded(Title::Gm, vec!["late".into()]);
        assert!(!app.state.directory.loaded);

        app.on_directory_loaded(Title::Wgm, vec!["hou_yifan".into()]);
        assert_eq!(app.state.directory.players, vec!["hou_yifan"]);
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app_with_players(&["hikaru"]);
        app.open_profile("hikaru".into());
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Profile);
    }
}
