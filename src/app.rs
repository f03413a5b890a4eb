//! Scene manager
//!
//! Owns the lobby session and the active scene, routes [`UiAction`]s and
//! turns user-correctable lobby errors into [`Notice`]s. The race never sees
//! the lobby; it only receives the snapshot handed over by `StartRace`.

use serde::{Deserialize, Serialize};

use crate::error::{LobbyError, RaceError};
use crate::lobby::Lobby;
use crate::roster::AgentId;
use crate::sim::{self, FrameInput, Race};
use crate::tuning::RaceTuning;
use crate::view::{self, FrameView};

/// Input from the host UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UiAction {
    SelectGame { game_id: u32 },
    /// Bet on the selected game
    PlaceBet { agent_id: AgentId },
    /// Finalize the selected game
    FinalizeGame,
    /// Race the selected game
    StartRace,
    /// Leave a finished race
    Restart,
    InspectTransaction { signature: String },
}

/// Blocking message the host shows before accepting more input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<LobbyError> for Notice {
    fn from(err: LobbyError) -> Self {
        Self::new(err.to_string())
    }
}

/// Scene transition requested by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum SceneRequest {
    Lobby,
    Race { game_id: u32 },
}

/// What an action produced for the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Response {
    pub notice: Option<Notice>,
    pub transition: Option<SceneRequest>,
}

impl Response {
    fn notice(notice: impl Into<Notice>) -> Self {
        Self {
            notice: Some(notice.into()),
            transition: None,
        }
    }

    fn transition(to: SceneRequest) -> Self {
        Self {
            notice: None,
            transition: Some(to),
        }
    }
}

/// Active scene
#[derive(Debug)]
pub enum Scene {
    Lobby,
    Race(Box<Race>),
}

/// Lobby session plus whatever scene is on screen
#[derive(Debug)]
pub struct App {
    lobby: Lobby,
    scene: Scene,
    tuning: RaceTuning,
    /// Latest host clock reading (ms)
    now_ms: f64,
}

impl App {
    pub fn new(lobby: Lobby, tuning: RaceTuning) -> Self {
        Self {
            lobby,
            scene: Scene::Lobby,
            tuning,
            now_ms: 0.0,
        }
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn race(&self) -> Option<&Race> {
        match &self.scene {
            Scene::Race(race) => Some(race),
            Scene::Lobby => None,
        }
    }

    pub fn tuning(&self) -> &RaceTuning {
        &self.tuning
    }

    /// Route one UI action.
    ///
    /// Lobby mistakes come back as a notice with state untouched. An `Err`
    /// means the race hand-off itself was invalid; the scene stays in the
    /// lobby.
    pub fn handle(&mut self, action: UiAction) -> Result<Response, RaceError> {
        if let Scene::Race(race) = &mut self.scene {
            if action != UiAction::Restart {
                log::warn!("Ignoring {:?} during a race", action);
                return Ok(Response::default());
            }
            if !race.is_finished() {
                log::warn!("Restart ignored: race for game {} still running", race.game_id());
                return Ok(Response::default());
            }
            race.teardown();
            self.scene = Scene::Lobby;
            log::info!("Scene: race -> lobby");
            return Ok(Response::transition(SceneRequest::Lobby));
        }

        let result = match action {
            UiAction::SelectGame { game_id } => self
                .lobby
                .select_game(game_id)
                .map(|_| Response::default()),
            UiAction::PlaceBet { agent_id } => self
                .selected_game()
                .and_then(|id| self.lobby.place_bet(id, agent_id))
                .map(|_| Response::default()),
            UiAction::FinalizeGame => self
                .selected_game()
                .and_then(|id| self.lobby.finalize_game(id))
                .map(|_| Response::default()),
            UiAction::StartRace => {
                let snapshot = match self
                    .selected_game()
                    .and_then(|id| self.lobby.start_race(id))
                {
                    Ok(snapshot) => snapshot,
                    Err(err) => return Ok(self.reject(err)),
                };
                let race = Race::new(&snapshot, self.tuning.clone(), self.now_ms)?;
                self.scene = Scene::Race(Box::new(race));
                log::info!("Scene: lobby -> race (game {})", snapshot.game_id);
                Ok(Response::transition(SceneRequest::Race {
                    game_id: snapshot.game_id,
                }))
            }
            UiAction::Restart => {
                log::warn!("Restart ignored outside a race");
                Ok(Response::default())
            }
            UiAction::InspectTransaction { signature } => self
                .lobby
                .inspect_transaction(&signature)
                .map(|tx| Response::notice(Notice::new(tx.to_string()))),
        };

        Ok(result.unwrap_or_else(|err| self.reject(err)))
    }

    /// Advance the clock and the race, if one is running
    pub fn update(&mut self, input: FrameInput) {
        if input.now_ms.is_finite() {
            self.now_ms = input.now_ms;
        }
        if let Scene::Race(race) = &mut self.scene {
            sim::update(race, input);
        }
    }

    pub fn view(&self) -> FrameView {
        match &self.scene {
            Scene::Lobby => FrameView::Lobby(view::lobby_view(&self.lobby)),
            Scene::Race(race) => FrameView::Race(view::race_view(race)),
        }
    }

    fn selected_game(&self) -> Result<u32, LobbyError> {
        self.lobby.selected_id().ok_or(LobbyError::NoGameSelected)
    }

    fn reject(&self, err: LobbyError) -> Response {
        log::warn!("Rejected: {}", err);
        Response::notice(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby::Seed;
    use crate::sim::RacePhase;

    fn app() -> App {
        App::new(Lobby::with_ledger_seed(7), RaceTuning::default())
    }

    fn run_race(app: &mut App) {
        let mut now = app.now_ms;
        for _ in 0..200_000 {
            if app.race().is_none_or(|r| r.is_finished()) {
                return;
            }
            now += 16.0;
            app.update(FrameInput::new(now, 16.0));
        }
        panic!("race never finished");
    }

    fn notice_of(response: Response) -> String {
        response.notice.map(|n| n.message).unwrap_or_default()
    }

    #[test]
    fn test_actions_need_a_selected_game() {
        let mut app = app();
        let response = app.handle(UiAction::FinalizeGame).unwrap();
        assert_eq!(notice_of(response), "Select a game first.");
        let response = app.handle(UiAction::PlaceBet { agent_id: 1 }).unwrap();
        assert_eq!(notice_of(response), "Select a game first.");
    }

    #[test]
    fn test_finalize_short_game_is_a_notice() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 102 }).unwrap();
        let response = app.handle(UiAction::FinalizeGame).unwrap();
        assert_eq!(notice_of(response), "Need at least 2 bets to finalize!");
        assert!(!app.lobby().game(102).unwrap().is_finalized());
        assert!(matches!(app.scene(), Scene::Lobby));
    }

    #[test]
    fn test_start_before_finalize_stays_in_lobby() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 103 }).unwrap();
        let response = app.handle(UiAction::StartRace).unwrap();
        assert!(response.notice.is_some());
        assert!(response.transition.is_none());
        assert!(matches!(app.scene(), Scene::Lobby));
    }

    #[test]
    fn test_race_roster_matches_bets() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 103 }).unwrap();
        app.handle(UiAction::FinalizeGame).unwrap();
        let response = app.handle(UiAction::StartRace).unwrap();
        assert_eq!(
            response.transition,
            Some(SceneRequest::Race { game_id: 103 })
        );

        let race = app.race().unwrap();
        let ids: Vec<_> = race.agents().iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(race.phase(), RacePhase::Countdown);
    }

    #[test]
    fn test_lobby_actions_ignored_during_race() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 106 }).unwrap();
        app.handle(UiAction::FinalizeGame).unwrap();
        app.handle(UiAction::StartRace).unwrap();

        let response = app.handle(UiAction::SelectGame { game_id: 101 }).unwrap();
        assert_eq!(response, Response::default());
        assert_eq!(app.lobby().selected_id(), Some(106));

        // Restart is refused until the race is over
        assert_eq!(app.handle(UiAction::Restart).unwrap(), Response::default());
        assert!(app.race().is_some());
    }

    #[test]
    fn test_restart_leaves_no_residual_state() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 106 }).unwrap();
        app.handle(UiAction::PlaceBet { agent_id: 3 }).unwrap();
        app.handle(UiAction::FinalizeGame).unwrap();
        app.handle(UiAction::StartRace).unwrap();
        run_race(&mut app);
        assert!(app.race().unwrap().outcome().is_some());

        let response = app.handle(UiAction::Restart).unwrap();
        assert_eq!(response.transition, Some(SceneRequest::Lobby));
        assert!(matches!(app.scene(), Scene::Lobby));
        assert!(matches!(app.view(), FrameView::Lobby(_)));

        // Frames after restart touch nothing race-related
        let now = app.now_ms;
        app.update(FrameInput::new(now + 5_000.0, 16.0));
        assert!(app.race().is_none());
        assert_eq!(app.lobby().tracked_agent(), Some(3));
    }

    #[test]
    fn test_replay_uses_same_seed() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 106 }).unwrap();
        app.handle(UiAction::FinalizeGame).unwrap();
        app.handle(UiAction::StartRace).unwrap();
        run_race(&mut app);
        let first = app.race().unwrap().outcome().cloned();
        app.handle(UiAction::Restart).unwrap();

        app.handle(UiAction::StartRace).unwrap();
        let race = app.race().unwrap();
        assert_eq!(race.seed(), &Seed::filled(0x43));
        assert_eq!(race.pending_events(), 0);
        assert!(race.log().is_empty());
        run_race(&mut app);
        assert_eq!(app.race().unwrap().outcome().cloned(), first);
    }

    #[test]
    fn test_second_game_gets_its_own_race() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 106 }).unwrap();
        app.handle(UiAction::FinalizeGame).unwrap();
        app.handle(UiAction::StartRace).unwrap();
        run_race(&mut app);
        app.handle(UiAction::Restart).unwrap();

        app.handle(UiAction::SelectGame { game_id: 103 }).unwrap();
        app.handle(UiAction::FinalizeGame).unwrap();
        app.handle(UiAction::StartRace).unwrap();
        let race = app.race().unwrap();
        assert_eq!(race.game_id(), 103);
        assert_ne!(race.seed(), &Seed::filled(0x43));
        assert!(race.agents().iter().all(|a| a.laps == 0 && a.icon.is_none()));
    }

    #[test]
    fn test_inspect_transaction() {
        let mut app = app();
        app.handle(UiAction::SelectGame { game_id: 101 }).unwrap();
        app.handle(UiAction::PlaceBet { agent_id: 2 }).unwrap();
        let signature = app.lobby().game(101).unwrap().tx_signatures()[0].clone();

        let message = notice_of(
            app.handle(UiAction::InspectTransaction {
                signature: signature.clone(),
            })
            .unwrap(),
        );
        assert!(message.contains(&signature));
        assert!(message.contains("placeBet(gameId=101, skaterId=2, amount=2)"));

        let message = notice_of(
            app.handle(UiAction::InspectTransaction {
                signature: "nope".into(),
            })
            .unwrap(),
        );
        assert_eq!(message, "Transaction not found: nope");
    }

    #[test]
    fn test_action_json_shape() {
        let action: UiAction =
            serde_json::from_str(r#"{"action":"place_bet","agent_id":4}"#).unwrap();
        assert_eq!(action, UiAction::PlaceBet { agent_id: 4 });
        let action: UiAction = serde_json::from_str(r#"{"action":"restart"}"#).unwrap();
        assert_eq!(action, UiAction::Restart);
    }
}
