//! Plain-data render descriptions
//!
//! The host renderer paints these; nothing here touches a canvas. Coordinates
//! are canvas pixels on an 800x600 stage.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::lobby::{GameStatus, Lobby};
use crate::roster::{AGENTS, AgentId};
use crate::sim::scoring;
use crate::sim::{Race, RacePhase};
use crate::{ellipse_point, format_race_clock};

const NAME_WIDTH: usize = 12;
const LAP_WIDTH: usize = 10;
const SCORE_WIDTH: usize = 8;
/// Marker appended to the tracked agent's scoreboard name
const TRACKED_MARK: &str = " 💰";

/// Whatever the current scene wants drawn
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum FrameView {
    Lobby(LobbyView),
    Race(RaceView),
}

// ---------------------------------------------------------------------------
// Race
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TrackView {
    pub center: Vec2,
    pub radius_x: f32,
    pub radius_y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerView {
    pub pos: Vec2,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpriteView {
    pub agent_id: AgentId,
    pub sprite: &'static str,
    pub pos: Vec2,
    pub mirrored: bool,
    pub dot_pos: Vec2,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct IconView {
    pub agent_id: AgentId,
    pub glyph: &'static str,
    pub pos: Vec2,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub agent_id: AgentId,
    pub text: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub color: String,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RaceView {
    pub phase: RacePhase,
    pub track: TrackView,
    pub start_markers: Vec<MarkerView>,
    pub sprites: Vec<SpriteView>,
    pub icons: Vec<IconView>,
    pub scoreboard_header: String,
    /// Sorted by score descending, then id
    pub scoreboard: Vec<ScoreRow>,
    pub timer: String,
    pub countdown: Option<&'static str>,
    /// Oldest first
    pub log: Vec<TextLine>,
    pub celebration: Option<TextLine>,
    pub status: String,
    pub win_loss: Option<TextLine>,
    pub show_restart: bool,
}

pub fn scoreboard_header() -> String {
    format!(
        "{:<nw$}{:<lw$}{:<lw$}{:<lw$}{:<sw$}",
        "Name",
        "Lap1 (s)",
        "Lap2 (s)",
        "Lap3 (s)",
        "Score",
        nw = NAME_WIDTH,
        lw = LAP_WIDTH,
        sw = SCORE_WIDTH
    )
}

/// Lap cell: seconds with two decimals, or `--` if not yet run
pub fn format_lap(lap_ms: Option<f64>) -> String {
    match lap_ms {
        Some(ms) => format!("{:.2}", ms / 1000.0),
        None => "--".to_string(),
    }
}

pub fn race_view(race: &Race) -> RaceView {
    let now = race.now_ms();
    let tracked = race.tracked_agent();

    let start_markers = race
        .agents()
        .iter()
        .map(|a| MarkerView {
            pos: ellipse_point(START_ANGLE_STEP * (a.id() as f64 - 1.0)),
            color: a.color(),
        })
        .collect();

    let active = || race.agents().iter().filter(|a| !a.is_finished());
    let sprites = active()
        .map(|a| SpriteView {
            agent_id: a.id(),
            sprite: a.descriptor.sprite,
            pos: a.position,
            mirrored: a.mirrored,
            dot_pos: a.position - Vec2::new(0.0, DOT_OFFSET_Y),
            color: a.color(),
        })
        .collect();
    let icons = active()
        .filter_map(|a| {
            a.icon.map(|icon| IconView {
                agent_id: a.id(),
                glyph: icon.kind.glyph(),
                pos: a.position + Vec2::new(ICON_OFFSET_X, -ICON_OFFSET_Y),
                color: a.color(),
            })
        })
        .collect();

    let mut order: Vec<(AgentId, u32)> = race
        .agents()
        .iter()
        .map(|a| (a.id(), a.score))
        .collect();
    scoring::standings_order(&mut order);
    let scoreboard = order
        .iter()
        .filter_map(|(id, _)| race.agent(*id))
        .map(|a| {
            let mut name = a.name().to_string();
            if tracked == Some(a.id()) {
                name.push_str(TRACKED_MARK);
            }
            let lap = |i: usize| format_lap(a.lap_times.get(i).copied());
            ScoreRow {
                agent_id: a.id(),
                text: format!(
                    "{:<nw$}{:<lw$}{:<lw$}{:<lw$}{:<sw$}",
                    name,
                    lap(0),
                    lap(1),
                    lap(2),
                    a.score,
                    nw = NAME_WIDTH,
                    lw = LAP_WIDTH,
                    sw = SCORE_WIDTH
                ),
                color: a.color(),
            }
        })
        .collect();

    let log = race
        .log()
        .entries()
        .map(|e| TextLine {
            text: e.text.clone(),
            color: e.color.clone(),
            alpha: e.alpha(now),
        })
        .collect();

    let celebration = race.celebration_ms().and_then(|at| {
        let alpha = 1.0 - (now - at) / CELEBRATION_FADE_MS;
        (alpha > 0.0).then(|| TextLine {
            text: CELEBRATION_TEXT.to_string(),
            color: "#fff".to_string(),
            alpha: alpha as f32,
        })
    });

    let win_loss = race
        .outcome()
        .and_then(|o| o.tracked_won)
        .map(|won| TextLine {
            text: if won { "You Won!" } else { "You Lost!" }.to_string(),
            color: if won { "#00ff00" } else { "#ff0000" }.to_string(),
            alpha: 1.0,
        });

    RaceView {
        phase: race.phase(),
        track: TrackView {
            center: Vec2::new(TRACK_CENTER_X, TRACK_CENTER_Y),
            radius_x: TRACK_WIDTH / 2.0,
            radius_y: TRACK_HEIGHT / 2.0,
        },
        start_markers,
        sprites,
        icons,
        scoreboard_header: scoreboard_header(),
        scoreboard,
        timer: format_race_clock(race.elapsed_ms()),
        countdown: race.countdown_label(),
        log,
        celebration,
        status: race.status().to_string(),
        win_loss,
        show_restart: race.is_finished(),
    }
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GameListEntry {
    pub id: u32,
    pub label: String,
    pub status: GameStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BetOption {
    pub agent_id: AgentId,
    pub name: &'static str,
    pub sprite: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameDetailView {
    pub game_id: u32,
    pub title: String,
    pub status: String,
    pub status_color: &'static str,
    pub seed_hex: Option<String>,
    pub bets_header: String,
    /// Bet lines, or a single placeholder
    pub bets: Vec<String>,
    /// Clickable signatures; empty shows a placeholder
    pub tx_signatures: Vec<String>,
    /// Empty once finalized
    pub bet_options: Vec<BetOption>,
    /// `[Finalize Game]` or `[Start Race]`
    pub action: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbyView {
    pub title: String,
    pub games: Vec<GameListEntry>,
    pub detail: Option<GameDetailView>,
}

pub fn lobby_view(lobby: &Lobby) -> LobbyView {
    let games: Vec<GameListEntry> = lobby
        .list_games()
        .into_iter()
        .map(|g| GameListEntry {
            label: format!("{} - (ID: {})", g.title, g.id),
            id: g.id,
            status: g.status,
        })
        .collect();

    let detail = lobby.selected().map(|game| {
        let finalized = game.status() == GameStatus::Finalized;
        let bets = if game.bets().is_empty() {
            vec!["(No Bets)".to_string()]
        } else {
            game.bets()
                .iter()
                .map(|b| format!("- {} bet {} on Skater #{}", b.player, b.amount, b.agent_id))
                .collect()
        };
        GameDetailView {
            game_id: game.id,
            title: format!("Selected Game: {}", game.title),
            status: format!("Status: {}", game.status().label()),
            status_color: if finalized { "#ff8080" } else { "#ffffff" },
            seed_hex: game.resolved_seed().map(|s| format!("Seed: {}", s.to_hex())),
            bets_header: format!("Bets: {}", game.bets().len()),
            bets,
            tx_signatures: game.tx_signatures().to_vec(),
            bet_options: if finalized {
                Vec::new()
            } else {
                AGENTS
                    .iter()
                    .map(|a| BetOption {
                        agent_id: a.id,
                        name: a.name,
                        sprite: a.sprite,
                    })
                    .collect()
            },
            action: if finalized { "[Start Race]" } else { "[Finalize Game]" },
        }
    });

    LobbyView {
        title: format!("Racetrack Manager ({} Games)", games.len()),
        games,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby::{RaceSnapshot, Seed};
    use crate::sim::{FrameInput, update};
    use crate::tuning::{RaceTuning, TuningPreset};

    #[test]
    fn test_lap_cells() {
        assert_eq!(format_lap(None), "--");
        assert_eq!(format_lap(Some(22_504.0)), "22.50");
        assert_eq!(format_lap(Some(1_004.0)), "1.00");
    }

    #[test]
    fn test_header_layout() {
        let header = scoreboard_header();
        assert!(header.starts_with("Name        Lap1 (s)  "));
        assert_eq!(header.chars().count(), 12 + 10 * 3 + 8);
    }

    #[test]
    fn test_race_view_before_start() {
        let snapshot = RaceSnapshot {
            game_id: 1,
            seed: Seed::filled(1),
            roster: vec![1, 3],
            tracked_agent: Some(3),
        };
        let tuning = RaceTuning::from_preset(TuningPreset::Calm);
        let mut race = Race::new(&snapshot, tuning, 0.0).unwrap();
        update(&mut race, FrameInput::new(1500.0, 16.0));

        let view = race_view(&race);
        assert_eq!(view.countdown, Some("3"));
        assert_eq!(view.timer, "00:00:000");
        assert_eq!(view.sprites.len(), 2);
        assert_eq!(view.start_markers.len(), 2);
        assert!(!view.show_restart);
        assert!(view.win_loss.is_none());

        // Equal scores list the lower id first; tracked agent is marked
        assert_eq!(view.scoreboard[0].agent_id, 1);
        assert!(view.scoreboard[1].text.starts_with("Cruz 💰"));
        assert!(view.scoreboard[0].text.contains("--"));
    }

    #[test]
    fn test_lobby_view_detail() {
        let mut lobby = Lobby::with_ledger_seed(3);
        assert!(lobby_view(&lobby).detail.is_none());
        assert_eq!(lobby_view(&lobby).title, "Racetrack Manager (6 Games)");

        lobby.select_game(101).unwrap();
        let detail = lobby_view(&lobby).detail.unwrap();
        assert_eq!(detail.bets, vec!["(No Bets)".to_string()]);
        assert_eq!(detail.bet_options.len(), 4);
        assert_eq!(detail.action, "[Finalize Game]");
        assert!(detail.seed_hex.is_none());

        lobby.select_game(106).unwrap();
        lobby.finalize_game(106).unwrap();
        let detail = lobby_view(&lobby).detail.unwrap();
        assert_eq!(detail.status, "Status: FINALIZED");
        assert_eq!(detail.action, "[Start Race]");
        assert!(detail.bet_options.is_empty());
        assert_eq!(detail.tx_signatures.len(), 1);
        assert_eq!(detail.bets[0], "- Erin bet 2 on Skater #4");
        assert!(detail.seed_hex.unwrap().starts_with("Seed: 4343"));

        let view = lobby_view(&lobby);
        let listed = view.games.iter().find(|g| g.id == 106).unwrap();
        assert_eq!(listed.status, GameStatus::Finalized);
        assert_eq!(listed.label, "Game F (2 Bets, fixed C seed) - (ID: 106)");
    }
}
