use chesscom_api::ModeStat;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders, Widget};

use crate::ui::format::{format_count, or_dash};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per card: border, mode badge, ratings line, record line, border.
pub const CARD_HEIGHT: u16 = 5;

/// Below this width the cards stack in a single column.
const TWO_COLUMN_MIN_WIDTH: u16 = 60;

const CARD_GAP: u16 = 1;

/// Number of terminal rows needed to show `count` cards at `width`.
pub fn required_height(count: usize, width: u16) -> u16 {
    let cols = columns_for(width) as usize;
    count.div_ceil(cols) as u16 * CARD_HEIGHT
}

fn columns_for(width: u16) -> u16 {
    if width >= TWO_COLUMN_MIN_WIDTH { 2 } else { 1 }
}

// ---------------------------------------------------------------------------
// StatCards widget
// ---------------------------------------------------------------------------

/// Per-mode rating cards laid out in a grid:
///
/// ```text
/// ╭──────────────────────────╮ ╭──────────────────────────╮
/// │ [rapid]                  │ │ [blitz]                  │
/// │ Current: 2810 · Best: 29 │ │ Current: — · Best: 3300  │
/// │ 1,024W · 311L · 402D     │ │ 0W · 0L · 0D             │
/// ╰──────────────────────────╯ ╰──────────────────────────╯
/// ```
pub struct StatCards<'a> {
    pub stats: &'a [ModeStat],
}

impl<'a> Widget for StatCards<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 || area.height < CARD_HEIGHT {
            return;
        }

        let cols = columns_for(area.width);
        let card_w = (area.width - CARD_GAP * (cols - 1)) / cols;

        for (idx, stat) in self.stats.iter().enumerate() {
            let row = (idx / cols as usize) as u16;
            let col = (idx % cols as usize) as u16;
            let y = area.y + row * CARD_HEIGHT;
            if y + CARD_HEIGHT > area.y + area.height {
                break;
            }
            let x = area.x + col * (card_w + CARD_GAP);
            draw_card(stat, Rect::new(x, y, card_w, CARD_HEIGHT), buf);
        }
    }
}

fn draw_card(stat: &ModeStat, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    block.render(area, buf);

    let width = inner.width as usize;
    let lines = [
        (
            format!("[{}]", stat.mode.label()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        (rating_line(stat), Style::default().fg(Color::White)),
        (record_line(stat), Style::default().fg(Color::Gray)),
    ];

    for (dy, (text, style)) in lines.into_iter().enumerate() {
        let clipped: String = text.chars().take(width).collect();
        buf.set_string(inner.x, inner.y + dy as u16, &clipped, style);
    }
}

pub fn rating_line(stat: &ModeStat) -> String {
    format!("Current: {} · Best: {}", or_dash(stat.last), or_dash(stat.best))
}

pub fn record_line(stat: &ModeStat) -> String {
    let count = |n: Option<u32>| format_count(u64::from(n.unwrap_or(0)));
    format!(
        "{}W · {}L · {}D",
        count(stat.win),
        count(stat.loss),
        count(stat.draw)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chesscom_api::GameMode;

    fn stat(mode: GameMode, last: Option<u32>) -> ModeStat {
        ModeStat {
            mode,
            last,
            best: None,
            win: Some(1_024),
            loss: None,
            draw: Some(3),
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn missing_values_use_defaults() {
        let s = stat(GameMode::Rapid, None);
        assert_eq!(rating_line(&s), "Current: — · Best: —");
        assert_eq!(record_line(&s), "1,024W · 0L · 3D");
    }

    #[test]
    fn wide_area_uses_two_columns() {
        assert_eq!(required_height(3, 80), 2 * CARD_HEIGHT);
        assert_eq!(required_height(3, 40), 3 * CARD_HEIGHT);
        assert_eq!(required_height(0, 80), 0);
    }

    #[test]
    fn renders_cards_side_by_side() {
        let stats = [stat(GameMode::Rapid, Some(2810)), stat(GameMode::Blitz, None)];
        let area = Rect::new(0, 0, 80, CARD_HEIGHT);
        let mut buf = Buffer::empty(area);
        StatCards { stats: &stats }.render(area, &mut buf);

        let badges = row_text(&buf, 1);
        assert!(badges.contains("[rapid]"));
        assert!(badges.contains("[blitz]"));
        assert!(row_text(&buf, 2).contains("Current: 2810"));
    }

    #[test]
    fn too_small_area_draws_nothing() {
        let stats = [stat(GameMode::Bullet, Some(3000))];
        let area = Rect::new(0, 0, 80, CARD_HEIGHT - 1);
        let mut buf = Buffer::empty(area);
        StatCards { stats: &stats }.render(area, &mut buf);
        assert!(row_text(&buf, 1).trim().is_empty());
    }
}
