use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

const PAGE_STEP: usize = 10;

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if key_event.code == Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    // Filter input swallows printable keys until Enter or Esc.
    if guard.state.active_tab == MenuItem::Directory && guard.state.directory.filtering {
        match key_event.code {
            KeyCode::Enter => guard.finish_filter(),
            KeyCode::Esc => guard.state.directory.clear_filter(),
            KeyCode::Backspace => guard.state.directory.pop_filter(),
            KeyCode::Down => guard.directory_down(1),
            KeyCode::Up => guard.directory_up(1),
            Char(c) => guard.state.directory.push_filter(c),
            _ => {}
        }
        return;
    }

    let mut request = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc | KeyCode::Backspace, _) => guard.exit_help(),

        // Directory navigation
        (MenuItem::Directory, Char('j') | KeyCode::Down, _) => guard.directory_down(1),
        (MenuItem::Directory, Char('k') | KeyCode::Up, _) => guard.directory_up(1),
        (MenuItem::Directory, KeyCode::PageDown, _) => guard.directory_down(PAGE_STEP),
        (MenuItem::Directory, KeyCode::PageUp, _) => guard.directory_up(PAGE_STEP),
        (MenuItem::Directory, Char('/'), _) => guard.start_filter(),
        (MenuItem::Directory, KeyCode::Esc, _) => guard.state.directory.clear_filter(),
        (MenuItem::Directory, Char('t'), _) => {
            let title = guard.cycle_title();
            request = Some(NetworkRequest::LoadDirectory { title });
        }
        (MenuItem::Directory, Char('r'), _) => {
            let title = guard.state.directory.title;
            request = Some(NetworkRequest::LoadDirectory { title });
        }
        (MenuItem::Directory, KeyCode::Enter, _) => {
            if let Some(username) = guard.open_selected_player() {
                request = Some(NetworkRequest::LoadProfile { username });
            }
        }

        // Profile page
        (MenuItem::Profile, Char('j') | KeyCode::Down, _) => guard.profile_scroll_down(),
        (MenuItem::Profile, Char('k') | KeyCode::Up, _) => guard.profile_scroll_up(),
        (MenuItem::Profile, Char('r'), _) => {
            if let Some(username) = guard.reload_profile() {
                request = Some(NetworkRequest::LoadProfile { username });
            }
        }
        (MenuItem::Profile, KeyCode::Esc | KeyCode::Backspace, _) => {
            if guard.back_to_directory() {
                request = Some(NetworkRequest::CancelProfile);
            }
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}
