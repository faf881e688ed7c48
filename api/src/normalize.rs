//! Raw PubAPI payloads → view-model records.
//!
//! Every function here is pure and fails soft: malformed or missing input
//! yields `None` (or an empty username), never an error.

use crate::pubapi::{
    ArchiveGamesResponse, ArchivedGame, ArchivedPlayer, CurrentGamesResponse, ModeRecord,
    StatsResponse,
};
use crate::{FinishedGame, GameMode, GameResult, ModeStat, OngoingGame, PieceColor};
use serde_json::Value;

pub const MAX_ONGOING_GAMES: usize = 5;
pub const MAX_RECENT_GAMES: usize = 3;
pub const OPPONENT_PLACEHOLDER: &str = "opponent";
const WIN_MARKER: &str = "win";

/// Resolve a profile reference to a lowercased username.
///
/// Accepts a bare URL string or an object carrying the URL under `@id`
/// (preferred) or `url`. The username is the final path segment; anything
/// unresolvable gives an empty string.
pub fn extract_username(reference: &Value) -> String {
    let id = match reference {
        Value::String(id) => Some(id.as_str()),
        Value::Object(fields) => fields
            .get("@id")
            .filter(|v| !v.is_null())
            .or_else(|| fields.get("url"))
            .and_then(Value::as_str),
        _ => None,
    };
    id.and_then(|id| id.rsplit('/').next())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Per-mode rating snapshots in fixed rapid, blitz, bullet order.
pub fn normalize_stats(raw: Option<&StatsResponse>) -> Option<Vec<ModeStat>> {
    let raw = raw?;
    let modes = [
        (GameMode::Rapid, raw.chess_rapid.as_ref()),
        (GameMode::Blitz, raw.chess_blitz.as_ref()),
        (GameMode::Bullet, raw.chess_bullet.as_ref()),
    ];
    let stats: Vec<ModeStat> = modes
        .into_iter()
        .filter_map(|(mode, src)| mode_stat(mode, src?))
        .collect();
    non_empty(stats)
}

fn mode_stat(mode: GameMode, src: &ModeRecord) -> Option<ModeStat> {
    let record = src.record.as_ref();
    let stat = ModeStat {
        mode,
        last: src.last.as_ref().and_then(|r| r.rating),
        best: src.best.as_ref().and_then(|r| r.rating),
        win: record.and_then(|r| r.win),
        loss: record.and_then(|r| r.loss),
        draw: record.and_then(|r| r.draw),
    };
    stat.has_any_field().then_some(stat)
}

/// First [`MAX_ONGOING_GAMES`] games in progress, in source order.
///
/// The viewer plays white only on an exact (lowercased) match of the white
/// reference; every other case, including no match on either side, reads as
/// black with the white side as opponent.
pub fn normalize_ongoing_games(
    raw: Option<&CurrentGamesResponse>,
    viewer: &str,
) -> Option<Vec<OngoingGame>> {
    let viewer = viewer.to_lowercase();
    let games: Vec<OngoingGame> = raw?
        .games
        .iter()
        .take(MAX_ONGOING_GAMES)
        .map(|g| {
            let white = extract_username(&g.white);
            let black = extract_username(&g.black);
            let (color, opponent) = if !viewer.is_empty() && white == viewer {
                (PieceColor::White, black)
            } else {
                (PieceColor::Black, white)
            };
            OngoingGame {
                url: g.url.clone(),
                opponent: or_placeholder(opponent),
                color,
                time_class: g.time_class.clone(),
                move_by: g.move_by,
            }
        })
        .collect();
    non_empty(games)
}

/// Last [`MAX_RECENT_GAMES`] games of an archive period, most recent first.
pub fn normalize_recent_games(
    raw: Option<&ArchiveGamesResponse>,
    viewer: &str,
) -> Option<Vec<FinishedGame>> {
    let viewer = viewer.to_lowercase();
    let games = &raw?.games;
    let start = games.len().saturating_sub(MAX_RECENT_GAMES);
    let recent: Vec<FinishedGame> = games[start..]
        .iter()
        .rev()
        .map(|g| finished_game(g, &viewer))
        .collect();
    non_empty(recent)
}

fn finished_game(g: &ArchivedGame, viewer: &str) -> FinishedGame {
    let (white_name, white_result) = side(g.white.as_ref());
    let (black_name, black_result) = side(g.black.as_ref());
    let am_white = !viewer.is_empty() && white_name == viewer;

    let (color, opponent, mine, theirs) = if am_white {
        (PieceColor::White, black_name, white_result, black_result)
    } else {
        (PieceColor::Black, white_name, black_result, white_result)
    };

    // Anything other than an explicit win on either side (agreed, stalemate,
    // timeout vs insufficient material, abandoned, ...) is a draw here.
    let result = if mine == WIN_MARKER {
        GameResult::Win
    } else if theirs == WIN_MARKER {
        GameResult::Loss
    } else {
        GameResult::Draw
    };

    FinishedGame {
        url: g.url.clone(),
        opponent: or_placeholder(opponent),
        color,
        result,
        time_class: g.time_class.clone(),
        time_control: g.time_control.clone(),
        end_time: g.end_time,
    }
}

fn side(player: Option<&ArchivedPlayer>) -> (String, &str) {
    let name = player
        .and_then(|p| p.username.as_deref())
        .unwrap_or_default()
        .to_lowercase();
    let result = player.and_then(|p| p.result.as_deref()).unwrap_or_default();
    (name, result)
}

fn or_placeholder(username: String) -> String {
    if username.is_empty() {
        OPPONENT_PLACEHOLDER.to_owned()
    } else {
        username
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current(value: Value) -> CurrentGamesResponse {
        serde_json::from_value(value).unwrap()
    }

    fn archive(value: Value) -> ArchiveGamesResponse {
        serde_json::from_value(value).unwrap()
    }

    fn stats(value: Value) -> StatsResponse {
        serde_json::from_value(value).unwrap()
    }

    fn finished(n: usize) -> Value {
        json!({
            "url": format!("https://www.chess.com/game/live/{n}"),
            "end_time": 1_700_000_000 + n as i64,
            "white": { "username": "Hikaru", "result": "win" },
            "black": { "username": format!("rival{n}"), "result": "resigned" },
        })
    }

    fn ongoing(n: usize) -> Value {
        json!({
            "url": format!("https://www.chess.com/game/daily/{n}"),
            "white": "https://api.chess.com/pub/player/hikaru",
            "black": format!("https://api.chess.com/pub/player/rival{n}"),
        })
    }

    // -----------------------------------------------------------------------
    // extract_username
    // -----------------------------------------------------------------------

    #[test]
    fn username_from_bare_url() {
        let r = json!("https://api.chess.com/pub/player/MagnusCarlsen");
        assert_eq!(extract_username(&r), "magnuscarlsen");
    }

    #[test]
    fn username_prefers_at_id_over_url() {
        let r = json!({ "@id": "https://api.chess.com/pub/player/Hikaru", "url": "https://x/other" });
        assert_eq!(extract_username(&r), "hikaru");
        let r = json!({ "url": "https://www.chess.com/member/FabianoCaruana" });
        assert_eq!(extract_username(&r), "fabianocaruana");
    }

    #[test]
    fn username_unresolvable_is_empty() {
        assert_eq!(extract_username(&Value::Null), "");
        assert_eq!(extract_username(&json!(42)), "");
        assert_eq!(extract_username(&json!({ "name": "hikaru" })), "");
        assert_eq!(extract_username(&json!({ "@id": 7, "url": "https://x/hikaru" })), "");
        assert_eq!(extract_username(&json!("https://api.chess.com/pub/player/")), "");
        assert_eq!(extract_username(&json!("hikaru")), "hikaru");
    }

    // -----------------------------------------------------------------------
    // normalize_stats
    // -----------------------------------------------------------------------

    #[test]
    fn stats_absent_input_is_none() {
        assert_eq!(normalize_stats(None), None);
    }

    #[test]
    fn stats_without_any_mode_is_none() {
        let raw = stats(json!({ "chess_daily": { "last": { "rating": 2000 } } }));
        assert_eq!(normalize_stats(Some(&raw)), None);
    }

    #[test]
    fn stats_single_best_rating_yields_one_mode() {
        let raw = stats(json!({ "chess_blitz": { "best": { "rating": 3300, "date": 1 } } }));
        let out = normalize_stats(Some(&raw)).unwrap();
        assert_eq!(
            out,
            vec![ModeStat {
                mode: GameMode::Blitz,
                last: None,
                best: Some(3300),
                win: None,
                loss: None,
                draw: None,
            }]
        );
    }

    #[test]
    fn stats_use_fixed_mode_order_and_drop_empty_modes() {
        let raw = stats(json!({
            "chess_bullet": { "last": { "rating": 3200 } },
            "chess_blitz": {},
            "chess_rapid": { "record": { "win": 10, "loss": 2, "draw": 5 } },
        }));
        let out = normalize_stats(Some(&raw)).unwrap();
        let modes: Vec<GameMode> = out.iter().map(|s| s.mode).collect();
        assert_eq!(modes, vec![GameMode::Rapid, GameMode::Bullet]);
        assert_eq!(out[0].win, Some(10));
        assert_eq!(out[1].last, Some(3200));
    }

    #[test]
    fn stats_mistyped_fields_are_ignored() {
        let raw = stats(json!({
            "chess_rapid": { "last": { "rating": "high" }, "record": "n/a" },
            "chess_blitz": "broken",
        }));
        assert_eq!(normalize_stats(Some(&raw)), None);
    }

    // -----------------------------------------------------------------------
    // normalize_ongoing_games
    // -----------------------------------------------------------------------

    #[test]
    fn ongoing_caps_at_five_in_source_order() {
        let raw = current(json!({ "games": (0..8).map(ongoing).collect::<Vec<_>>() }));
        let out = normalize_ongoing_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out.len(), MAX_ONGOING_GAMES);
        let opponents: Vec<&str> = out.iter().map(|g| g.opponent.as_str()).collect();
        assert_eq!(opponents, vec!["rival0", "rival1", "rival2", "rival3", "rival4"]);
        assert!(out.iter().all(|g| g.color == PieceColor::White));
    }

    #[test]
    fn ongoing_short_list_is_kept_whole() {
        let raw = current(json!({ "games": [ongoing(0), ongoing(1)] }));
        assert_eq!(normalize_ongoing_games(Some(&raw), "Hikaru").unwrap().len(), 2);
    }

    #[test]
    fn ongoing_viewer_as_black() {
        let raw = current(json!({ "games": [{
            "url": "https://www.chess.com/game/daily/1",
            "white": { "@id": "https://api.chess.com/pub/player/rival" },
            "black": { "@id": "https://api.chess.com/pub/player/Hikaru" },
            "time_class": "daily",
            "move_by": 1_700_086_400,
        }] }));
        let out = normalize_ongoing_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out[0].color, PieceColor::Black);
        assert_eq!(out[0].opponent, "rival");
        assert_eq!(out[0].time_class.as_deref(), Some("daily"));
        assert_eq!(out[0].move_by, Some(1_700_086_400));
    }

    #[test]
    fn ongoing_unmatched_viewer_falls_back_to_black_against_white() {
        let raw = current(json!({ "games": [{
            "url": "u",
            "white": "https://api.chess.com/pub/player/alice",
            "black": "https://api.chess.com/pub/player/bob",
        }] }));
        let out = normalize_ongoing_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out[0].color, PieceColor::Black);
        assert_eq!(out[0].opponent, "alice");
    }

    #[test]
    fn ongoing_unresolved_opponent_uses_placeholder() {
        let raw = current(json!({ "games": [{
            "url": "u",
            "white": "https://api.chess.com/pub/player/hikaru",
            "move_by": "tomorrow",
        }] }));
        let out = normalize_ongoing_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out[0].opponent, OPPONENT_PLACEHOLDER);
        assert_eq!(out[0].move_by, None);
    }

    #[test]
    fn ongoing_malformed_entry_keeps_its_slot() {
        let mut games: Vec<Value> = vec![json!(5)];
        games.extend((0..6).map(ongoing));
        let raw = current(json!({ "games": games }));
        let out = normalize_ongoing_games(Some(&raw), "hikaru").unwrap();

        assert_eq!(out.len(), MAX_ONGOING_GAMES);
        assert_eq!(out[0].url, "");
        assert_eq!(out[0].opponent, OPPONENT_PLACEHOLDER);
        assert_eq!(out[1].opponent, "rival0");
        assert_eq!(out[4].opponent, "rival3");
    }

    #[test]
    fn ongoing_empty_or_missing_is_none() {
        assert_eq!(normalize_ongoing_games(None, "hikaru"), None);
        let raw = current(json!({ "games": [] }));
        assert_eq!(normalize_ongoing_games(Some(&raw), "hikaru"), None);
        let raw = current(json!({ "games": "not a list" }));
        assert_eq!(normalize_ongoing_games(Some(&raw), "hikaru"), None);
    }

    // -----------------------------------------------------------------------
    // normalize_recent_games
    // -----------------------------------------------------------------------

    #[test]
    fn recent_takes_last_three_most_recent_first() {
        let raw = archive(json!({ "games": (0..6).map(finished).collect::<Vec<_>>() }));
        let out = normalize_recent_games(Some(&raw), "hikaru").unwrap();
        let opponents: Vec<&str> = out.iter().map(|g| g.opponent.as_str()).collect();
        assert_eq!(opponents, vec!["rival5", "rival4", "rival3"]);
    }

    #[test]
    fn recent_short_list_is_reversed() {
        let raw = archive(json!({ "games": [finished(0), finished(1)] }));
        let out = normalize_recent_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].opponent, "rival1");
        assert_eq!(out[1].opponent, "rival0");
        assert_eq!(out[0].result, GameResult::Win);
        assert_eq!(out[0].color, PieceColor::White);
        assert_eq!(out[0].end_time, Some(1_700_000_001));
    }

    #[test]
    fn recent_black_win_is_a_win() {
        let raw = archive(json!({ "games": [{
            "url": "u",
            "time_class": "blitz",
            "time_control": "180+2",
            "white": { "username": "rival", "result": "checkmated" },
            "black": { "username": "HIKARU", "result": "win" },
        }] }));
        let out = normalize_recent_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out[0].color, PieceColor::Black);
        assert_eq!(out[0].result, GameResult::Win);
        assert_eq!(out[0].opponent, "rival");
        assert_eq!(out[0].time_control.as_deref(), Some("180+2"));
    }

    #[test]
    fn recent_opponent_win_is_a_loss() {
        let raw = archive(json!({ "games": [{
            "url": "u",
            "white": { "username": "hikaru", "result": "timeout" },
            "black": { "username": "rival", "result": "win" },
        }] }));
        let out = normalize_recent_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out[0].result, GameResult::Loss);
    }

    #[test]
    fn recent_non_win_outcomes_collapse_to_draw() {
        let outcomes = [
            ("agreed", "agreed"),
            ("stalemate", "stalemate"),
            ("abandoned", "timevsinsufficient"),
            ("", ""),
        ];
        for (w, b) in outcomes {
            let raw = archive(json!({ "games": [{
                "url": "u",
                "white": { "username": "hikaru", "result": w },
                "black": { "username": "rival", "result": b },
            }] }));
            let out = normalize_recent_games(Some(&raw), "hikaru").unwrap();
            assert_eq!(out[0].result, GameResult::Draw, "{w}/{b}");
        }
    }

    #[test]
    fn recent_missing_sides_use_placeholder() {
        let raw = archive(json!({ "games": [{ "url": "u" }] }));
        let out = normalize_recent_games(Some(&raw), "hikaru").unwrap();
        assert_eq!(out[0].opponent, OPPONENT_PLACEHOLDER);
        assert_eq!(out[0].color, PieceColor::Black);
        assert_eq!(out[0].result, GameResult::Draw);
    }

    #[test]
    fn recent_malformed_trailing_entry_keeps_its_slot() {
        let mut games: Vec<Value> = (0..4).map(finished).collect();
        games.push(json!("not a game"));
        let raw = archive(json!({ "games": games }));
        let out = normalize_recent_games(Some(&raw), "hikaru").unwrap();

        let opponents: Vec<&str> = out.iter().map(|g| g.opponent.as_str()).collect();
        assert_eq!(opponents, vec![OPPONENT_PLACEHOLDER, "rival3", "rival2"]);
        assert_eq!(out[0].result, GameResult::Draw);
    }

    #[test]
    fn recent_empty_or_missing_is_none() {
        assert_eq!(normalize_recent_games(None, "hikaru"), None);
        let raw = archive(json!({}));
        assert_eq!(normalize_recent_games(Some(&raw), "hikaru"), None);
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let raw = archive(json!({ "games": (0..4).map(finished).collect::<Vec<_>>() }));
        assert_eq!(
            normalize_recent_games(Some(&raw), "hikaru"),
            normalize_recent_games(Some(&raw), "hikaru")
        );
        let raw = current(json!({ "games": (0..4).map(ongoing).collect::<Vec<_>>() }));
        assert_eq!(
            normalize_ongoing_games(Some(&raw), "hikaru"),
            normalize_ongoing_games(Some(&raw), "hikaru")
        );
    }
}
