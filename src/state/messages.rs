use crate::state::network::LoadingState;
use chesscom_api::{ProfileData, Title};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadDirectory { title: Title },
    /// Supersedes (and cancels) any profile load still in flight.
    LoadProfile { username: String },
    CancelProfile,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    DirectoryLoaded { title: Title, players: Vec<String> },
    ProfileLoaded { username: String, data: Box<ProfileData> },
    ProfileFailed { username: String, message: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Once per second; drives the last-online clock.
    ClockTick,
}
