use tui::backend::Backend;
use tui::buffer::Buffer;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Tabs, Widget};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::stat_cards::{self, StatCards};
use crate::state::app_state::ProfileStatus;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::format::{DASH, fmt_date, fmt_datetime, format_count, format_elapsed, or_dash};
use crate::ui::layout::LayoutAreas;
use chesscom_api::{FinishedGame, GameResult, OngoingGame, PlayerProfile, ProfileData};
use chrono::{DateTime, Utc};

static TABS: &[&str; 2] = &["Directory", "Profile"];

const SOURCE_LABEL: &str = "chess.com";
const DEFAULT_TIME_CLASS: &str = "daily";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Directory => draw_directory(f, layout.main, app),
            MenuItem::Profile => draw_profile(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        log::error!("Failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab = match app.state.active_tab {
        MenuItem::Help => app.state.previous_tab,
        other => other,
    };
    let tab_index = match tab {
        MenuItem::Profile => 1,
        _ => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

fn draw_directory(f: &mut Frame, area: Rect, app: &App) {
    let directory = &app.state.directory;
    let block = default_border(Color::White).title(format!(" {} ", directory.title.as_str()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, key_legend, filter_line, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let count = if directory.loaded {
        format!("{} players", format_count(directory.players.len() as u64))
    } else {
        DASH.to_string()
    };
    let header_text = format!(
        "Chess {} · Source: {SOURCE_LABEL} · {count}",
        directory.title.label()
    );
    f.render_widget(
        Paragraph::new(header_text).style(Style::default().add_modifier(Modifier::BOLD)),
        header,
    );
    f.render_widget(
        Paragraph::new("Keys: j/k=move  Enter=open  /=filter  t=title  r=reload  ?=help  q=quit")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    if directory.filtering || !directory.filter.is_empty() {
        let (text, style) = if directory.filtering {
            (format!("/{}_", directory.filter), Style::default().fg(Color::Yellow))
        } else {
            (
                format!("/{}  (Esc clears)", directory.filter),
                Style::default().fg(Color::Gray),
            )
        };
        f.render_widget(Paragraph::new(text).style(style), filter_line);
    }

    if !directory.loaded {
        let msg = if let Some(err) = app.state.last_error.as_deref() {
            format!("Directory load failed:\n{err}\n\nr retry")
        } else {
            format!("Loading {}...", directory.title.label())
        };
        draw_centered(f, content, msg);
        return;
    }

    let visible = directory.visible_players();
    if visible.is_empty() {
        let msg = if directory.players.is_empty() {
            "No players listed".to_string()
        } else {
            format!("No players match \"{}\"", directory.filter)
        };
        draw_centered(f, content, msg);
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|p| ListItem::new(*p)).collect();
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(directory.selected));
    f.render_stateful_widget(list, content, &mut state);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

fn draw_profile(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(" Profile ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let now = app.state.now;
    let profile = &mut app.state.profile;
    match &profile.status {
        ProfileStatus::Idle => {
            draw_centered(f, inner, "Select a player in the directory and press Enter".to_string())
        }
        ProfileStatus::Loading { username } => {
            draw_centered(f, inner, format!("Loading {username}..."))
        }
        ProfileStatus::Failed { username, message } => {
            let lines = vec![
                Line::from(Span::styled(
                    format!("Couldn't load {username}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(message.as_str()),
                Line::from(""),
                Line::from(Span::styled(
                    "Esc back to list · r retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        }
        ProfileStatus::Loaded(data) => {
            let page = render_profile_page(data, now, inner.width);
            let max_scroll = page.area.height.saturating_sub(inner.height);
            profile.scroll_offset = profile.scroll_offset.min(max_scroll);
            blit(&page, profile.scroll_offset, inner, f.buffer_mut());
        }
    }
}

/// Lays the whole page out in an off-screen buffer so the stat cards scroll with the text.
fn render_profile_page(data: &ProfileData, now: DateTime<Utc>, width: u16) -> Buffer {
    let header = header_lines(&data.player, now);
    let ongoing = ongoing_lines(data.ongoing());
    let recent = recent_lines(data.recent());
    let details = details_lines(&data.player, data.country_name.as_deref());

    let stats = data.stats();
    let cards_height = stat_cards::required_height(stats.len(), width);
    let summary_heading = if stats.is_empty() { 0 } else { 1 };

    let height = header.len() as u16
        + ongoing.len() as u16
        + summary_heading
        + cards_height
        + recent.len() as u16
        + details.len() as u16;
    let mut buf = Buffer::empty(Rect::new(0, 0, width, height));

    let mut y = 0;
    for lines in [header, ongoing] {
        y = render_lines(lines, y, &mut buf);
    }
    if !stats.is_empty() {
        y = render_lines(vec![section_heading("Summary")], y, &mut buf);
        StatCards { stats }.render(Rect::new(0, y, width, cards_height), &mut buf);
        y += cards_height;
    }
    for lines in [recent, details] {
        y = render_lines(lines, y, &mut buf);
    }

    buf
}

fn render_lines(lines: Vec<Line<'static>>, y: u16, buf: &mut Buffer) -> u16 {
    let height = lines.len() as u16;
    if height > 0 {
        let area = Rect::new(0, y, buf.area.width, height);
        Paragraph::new(lines).render(area, buf);
    }
    y + height
}

/// Copy rows `scroll..` of `page` into `target`, clipped to `area`.
fn blit(page: &Buffer, scroll: u16, area: Rect, target: &mut Buffer) {
    let rows = page.area.height.saturating_sub(scroll).min(area.height);
    let cols = page.area.width.min(area.width);
    for dy in 0..rows {
        for dx in 0..cols {
            target[(area.x + dx, area.y + dy)] = page[(dx, scroll + dy)].clone();
        }
    }
}

fn header_lines(player: &PlayerProfile, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);

    let mut name_line = vec![Span::styled(
        player.username.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(title) = player.title.as_deref().filter(|t| !t.is_empty()) {
        name_line.push(Span::raw(" "));
        name_line.push(Span::styled(
            format!("[{title}]"),
            Style::default().fg(Color::Yellow),
        ));
    }
    if player.verified {
        name_line.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
    }

    let mut sub_line = Vec::new();
    if let Some(name) = player.name.as_deref().filter(|n| !n.is_empty()) {
        sub_line.push(Span::styled(name.to_string(), Style::default().fg(Color::Gray)));
    }
    if let Some(last_online) = player.last_online_at() {
        if !sub_line.is_empty() {
            sub_line.push(Span::styled(" | ", dim));
        }
        sub_line.push(Span::styled("Last active: ", dim));
        sub_line.push(Span::raw(format_elapsed(last_online, now)));
    }

    vec![
        Line::from(Span::styled("← Back to list (Esc)", dim)),
        Line::from(""),
        Line::from(name_line),
        Line::from(sub_line),
    ]
}

fn section_heading(label: &str) -> Line<'static> {
    Line::from(Span::styled(
        label.to_uppercase(),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    ))
}

fn ongoing_lines(games: &[OngoingGame]) -> Vec<Line<'static>> {
    if games.is_empty() {
        return Vec::new();
    }
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = vec![Line::from(""), section_heading("Ongoing")];
    for game in games {
        lines.push(opponent_line(&game.opponent, None));
        lines.push(Line::from(Span::styled(
            format!(
                "  {} · as {}",
                game.time_class.as_deref().unwrap_or(DEFAULT_TIME_CLASS),
                game.color.label()
            ),
            dim,
        )));
        if let Some(move_by) = game.move_by_at() {
            lines.push(Line::from(Span::styled(
                format!("  move by {}", fmt_datetime(move_by)),
                dim,
            )));
        }
        lines.push(Line::from(Span::styled(format!("  {}", game.url), dim)));
    }
    lines
}

fn recent_lines(games: &[FinishedGame]) -> Vec<Line<'static>> {
    if games.is_empty() {
        return Vec::new();
    }
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = vec![Line::from(""), section_heading("Recent Games")];
    for game in games {
        lines.push(opponent_line(&game.opponent, Some(game.result)));

        let mut kind: Vec<&str> = Vec::new();
        if let Some(time_class) = game.time_class.as_deref() {
            kind.push(time_class);
        }
        if let Some(time_control) = game.time_control.as_deref() {
            kind.push(time_control);
        }
        let as_color = format!("as {}", game.color.label());
        kind.push(&as_color);
        lines.push(Line::from(Span::styled(format!("  {}", kind.join(" · ")), dim)));

        if game.ended_at().is_some() {
            lines.push(Line::from(Span::styled(
                format!("  ended {}", fmt_date(game.end_time)),
                dim,
            )));
        }
        lines.push(Line::from(Span::styled(format!("  {}", game.url), dim)));
    }
    lines
}

fn opponent_line(opponent: &str, result: Option<GameResult>) -> Line<'static> {
    let mut spans = vec![
        Span::raw("vs. "),
        Span::styled(opponent.to_string(), Style::default().add_modifier(Modifier::BOLD)),
    ];
    if let Some(result) = result {
        let color = match result {
            GameResult::Win => Color::Green,
            GameResult::Loss => Color::Red,
            GameResult::Draw => Color::Gray,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{}]", result.short_label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn details_lines(player: &PlayerProfile, country_name: Option<&str>) -> Vec<Line<'static>> {
    let mut rows: Vec<(&str, String)> = vec![
        (
            "Status",
            player
                .status
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(DASH)
                .to_string(),
        ),
        ("Followers", or_dash(player.followers.map(format_count))),
        ("Joined", fmt_date(player.joined)),
        ("Country", or_dash(country_name)),
    ];
    if let Some(location) = player.location.as_deref().filter(|l| !l.is_empty()) {
        rows.push(("Location", location.to_string()));
    }
    if let Some(league) = player.league.as_deref().filter(|l| !l.is_empty()) {
        rows.push(("League", league.to_string()));
    }
    let links = player.streaming_links();
    if !links.is_empty() {
        let text = links
            .iter()
            .map(|(label, url)| format!("{label} {url}"))
            .collect::<Vec<_>>()
            .join("  ");
        rows.push(("Streaming", text));
    }

    let mut lines = vec![Line::from(""), section_heading("Details")];
    lines.extend(rows.into_iter().map(|(label, value)| {
        Line::from(vec![
            Span::styled(format!("{label:<10} "), Style::default().fg(Color::DarkGray)),
            Span::raw(value),
        ])
    }));
    lines
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bindings = [
        ("j / k, ↓ / ↑", "move selection or scroll"),
        ("PgDn / PgUp", "move ten players"),
        ("Enter", "open the selected player's profile"),
        ("Esc / Backspace", "back to the directory"),
        ("/", "filter the directory"),
        ("t", "cycle the title filter"),
        ("r", "reload the directory or profile"),
        ("f", "toggle full screen"),
        ("\"", "toggle the log pane"),
        ("?", "this help"),
        ("q / Ctrl-C", "quit"),
    ];
    let lines: Vec<Line> = bindings
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:<18}"), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_centered(f: &mut Frame, area: Rect, msg: String) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chesscom_api::{GameLists, GameMode, ModeStat, PieceColor};

    fn page_text(buf: &Buffer) -> Vec<String> {
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn sample() -> ProfileData {
        ProfileData {
            player: PlayerProfile {
                username: "Hikaru".into(),
                player_id: 15448422,
                title: Some("GM".into()),
                name: Some("Hikaru Nakamura".into()),
                followers: Some(1_234_567),
                last_online: Some(1_700_000_000),
                ..Default::default()
            },
            country_name: Some("United States".into()),
            stats: Some(vec![ModeStat {
                mode: GameMode::Blitz,
                last: Some(3300),
                best: None,
                win: Some(10),
                loss: None,
                draw: None,
            }]),
            games: Some(GameLists {
                ongoing: Some(vec![OngoingGame {
                    url: "https://www.chess.com/game/daily/1".into(),
                    opponent: "opponent".into(),
                    color: PieceColor::Black,
                    time_class: None,
                    move_by: None,
                }]),
                recent: None,
            }),
        }
    }

    #[test]
    fn profile_page_sections_in_order() {
        let now = DateTime::from_timestamp(1_700_003_723, 0).unwrap();
        let page = page_text(&render_profile_page(&sample(), now, 80));

        let position = |needle: &str| {
            page.iter()
                .position(|l| l.contains(needle))
                .unwrap_or_else(|| panic!("missing {needle:?} in {page:#?}"))
        };

        assert!(page[2].starts_with("Hikaru [GM]"));
        assert!(page[3].contains("Hikaru Nakamura | Last active: 01:02:03"));
        assert!(position("ONGOING") < position("SUMMARY"));
        assert!(position("SUMMARY") < position("DETAILS"));
        assert!(page[position("ONGOING") + 2].contains("daily · as black"));
        assert!(page[position("Followers")].contains("1,234,567"));
        assert!(page[position("Country")].contains("United States"));
        assert!(page[position("Status")].contains(DASH));
        assert!(!page.iter().any(|l| l.contains("RECENT GAMES")));
        assert!(!page.iter().any(|l| l.contains("Streaming")));
    }

    #[test]
    fn blit_clips_to_scroll_window() {
        let mut page = Buffer::empty(Rect::new(0, 0, 4, 3));
        page.set_string(0, 0, "aaaa", Style::default());
        page.set_string(0, 1, "bbbb", Style::default());
        page.set_string(0, 2, "cccc", Style::default());

        let area = Rect::new(1, 1, 4, 5);
        let mut target = Buffer::empty(Rect::new(0, 0, 6, 6));
        blit(&page, 1, area, &mut target);

        let rows = page_text(&target);
        assert_eq!(rows[1], " bbbb");
        assert_eq!(rows[2], " cccc");
        assert_eq!(rows[3], "");
    }
}
