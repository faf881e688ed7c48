use crate::state::messages::{NetworkRequest, NetworkResponse};
use chesscom_api::Title;
use chesscom_api::client::{ApiError, ChessApi};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: ChessApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    spinner: Spinner,
    /// Token of the profile load currently in flight, if any.
    profile_load: Option<CancellationToken>,
}

impl NetworkWorker {
    pub fn new(
        client: ChessApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            spinner: Spinner {
                responses: responses.clone(),
                in_flight: Arc::new(AtomicUsize::new(0)),
            },
            requests,
            responses,
            profile_load: None,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            match request {
                NetworkRequest::LoadDirectory { title } => {
                    tokio::spawn(load_directory(
                        self.client.clone(),
                        self.spinner.clone(),
                        self.responses.clone(),
                        title,
                    ));
                }
                NetworkRequest::LoadProfile { username } => {
                    self.cancel_profile_load();
                    let token = CancellationToken::new();
                    self.profile_load = Some(token.clone());
                    tokio::spawn(load_profile(
                        self.client.clone(),
                        self.spinner.clone(),
                        self.responses.clone(),
                        username,
                        token,
                    ));
                }
                NetworkRequest::CancelProfile => self.cancel_profile_load(),
            }
        }
        self.cancel_profile_load();
    }

    fn cancel_profile_load(&mut self) {
        if let Some(token) = self.profile_load.take() {
            token.cancel();
        }
    }
}

async fn load_directory(
    client: ChessApi,
    spinner: Spinner,
    responses: mpsc::Sender<NetworkResponse>,
    title: Title,
) {
    debug!("loading {} directory", title.as_str());
    spinner.start().await;
    let result = client.fetch_titled_players(title).await;
    spinner.stop(result.is_ok()).await;

    let response = match result {
        Ok(players) => NetworkResponse::DirectoryLoaded { title, players },
        Err(err) => NetworkResponse::Error { message: err.to_string() },
    };
    send(&responses, response).await;
}

async fn load_profile(
    client: ChessApi,
    spinner: Spinner,
    responses: mpsc::Sender<NetworkResponse>,
    username: String,
    cancel: CancellationToken,
) {
    debug!("loading profile for {username}");
    spinner.start().await;
    let result = client.fetch_profile_data(&username, Some(&cancel)).await;
    let failed = matches!(&result, Err(e) if !matches!(e, ApiError::Cancelled));
    spinner.stop(!failed).await;

    let response = match result {
        Ok(data) => NetworkResponse::ProfileLoaded { username, data: Box::new(data) },
        Err(ApiError::Cancelled) => {
            debug!("profile load for {username} cancelled");
            return;
        }
        Err(err) => NetworkResponse::ProfileFailed { username, message: err.to_string() },
    };
    send(&responses, response).await;
}

async fn send(responses: &mpsc::Sender<NetworkResponse>, response: NetworkResponse) {
    if let Err(e) = responses.send(response).await {
        error!("Failed to send network response: {e}");
    }
}

/// Loading indicator shared by concurrent loads; spins while any is in flight.
#[derive(Clone)]
struct Spinner {
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

impl Spinner {
    async fn start(&self) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            return;
        }

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop(&self, is_ok: bool) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
