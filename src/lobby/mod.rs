//! Lobby: game catalog, bets, finalization and race hand-off
//!
//! The lobby never shares live state with the race. `start_race` produces an
//! immutable [`RaceSnapshot`] that the scene manager passes to the engine.

pub mod game;
pub mod ledger;

pub use game::{
    BET_AMOUNT, Bet, GameRecord, GameStatus, LOCAL_PLAYER, MIN_BETS_TO_FINALIZE, Seed,
};
pub use ledger::{Ledger, MockTransaction};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::error::LobbyError;
use crate::platform;
use crate::roster::{self, AgentId};

/// Everything the race needs, copied once at scene transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceSnapshot {
    pub game_id: u32,
    pub seed: Seed,
    /// Distinct agents with bets, ascending
    pub roster: Vec<AgentId>,
    /// Agent the local player bet on, if any
    pub tracked_agent: Option<AgentId>,
}

/// Lobby list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub id: u32,
    pub title: String,
    pub status: GameStatus,
}

/// The game catalog and the local player's session
#[derive(Debug, Clone)]
pub struct Lobby {
    games: Vec<GameRecord>,
    ledger: Ledger,
    selected: Option<u32>,
    tracked_agent: Option<AgentId>,
    /// Hand-off of the most recent finalization
    published: Option<RaceSnapshot>,
    /// Drives decorative signatures and slots only
    rng: Pcg32,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

impl Lobby {
    /// Lobby with the standard catalog and an OS-seeded ledger RNG
    pub fn new() -> Self {
        Self::with_games(default_catalog(), Pcg32::from_rng(&mut rand::rng()))
    }

    /// Standard catalog with reproducible mock signatures
    pub fn with_ledger_seed(seed: u64) -> Self {
        Self::with_games(default_catalog(), Pcg32::seed_from_u64(seed))
    }

    pub fn with_games(games: Vec<GameRecord>, rng: Pcg32) -> Self {
        Self {
            games,
            ledger: Ledger::new(),
            selected: None,
            tracked_agent: None,
            published: None,
            rng,
        }
    }

    pub fn list_games(&self) -> Vec<GameSummary> {
        self.games
            .iter()
            .map(|g| GameSummary {
                id: g.id,
                title: g.title.clone(),
                status: g.status(),
            })
            .collect()
    }

    pub fn game(&self, id: u32) -> Option<&GameRecord> {
        self.games.iter().find(|g| g.id == id)
    }

    fn game_mut(&mut self, id: u32) -> Result<&mut GameRecord, LobbyError> {
        self.games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(LobbyError::UnknownGame(id))
    }

    /// Focus a game in the detail view
    pub fn select_game(&mut self, id: u32) -> Result<&GameRecord, LobbyError> {
        let index = self
            .games
            .iter()
            .position(|g| g.id == id)
            .ok_or(LobbyError::UnknownGame(id))?;
        self.selected = Some(id);
        Ok(&self.games[index])
    }

    pub fn selected(&self) -> Option<&GameRecord> {
        self.selected.and_then(|id| self.game(id))
    }

    pub fn selected_id(&self) -> Option<u32> {
        self.selected
    }

    pub fn tracked_agent(&self) -> Option<AgentId> {
        self.tracked_agent
    }

    pub fn published(&self) -> Option<&RaceSnapshot> {
        self.published.as_ref()
    }

    /// Place a bet for the local player; returns the mock signature
    pub fn place_bet(&mut self, game_id: u32, agent_id: AgentId) -> Result<String, LobbyError> {
        if roster::agent(agent_id).is_none() {
            return Err(LobbyError::UnknownAgent(agent_id));
        }
        self.game_mut(game_id)?
            .push_bet(Bet::new(LOCAL_PLAYER, agent_id))?;
        self.tracked_agent = Some(agent_id);

        let instructions = format!(
            "placeBet(gameId={}, skaterId={}, amount={})",
            game_id, agent_id, BET_AMOUNT
        );
        let signature = self
            .ledger
            .record(&mut self.rng, instructions, platform::unix_time_secs());
        self.game_mut(game_id)?.push_signature(signature.clone());

        log::info!("Bet placed: game {} on skater #{}", game_id, agent_id);
        Ok(signature)
    }

    /// Lock a game's bets, resolve its seed and publish the hand-off
    pub fn finalize_game(&mut self, game_id: u32) -> Result<RaceSnapshot, LobbyError> {
        let game = self.game_mut(game_id)?;
        let seed = game.finalize()?;
        let roster = game.roster();

        let instructions = format!("finalizeGame(gameId={}) => produce raceRandomness", game_id);
        let signature = self
            .ledger
            .record(&mut self.rng, instructions, platform::unix_time_secs());
        self.game_mut(game_id)?.push_signature(signature);

        log::info!(
            "Game {} finalized: seed={} roster={:?}",
            game_id,
            seed.to_hex(),
            roster
        );

        let snapshot = RaceSnapshot {
            game_id,
            seed,
            roster,
            tracked_agent: self.tracked_agent,
        };
        self.published = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Build the race hand-off; the game must already be finalized
    pub fn start_race(&self, game_id: u32) -> Result<RaceSnapshot, LobbyError> {
        let game = self.game(game_id).ok_or(LobbyError::UnknownGame(game_id))?;
        let seed = game
            .resolved_seed()
            .copied()
            .ok_or(LobbyError::NotFinalized(game_id))?;
        log::info!("Starting race for gameId={}...", game_id);
        Ok(RaceSnapshot {
            game_id,
            seed,
            roster: game.roster(),
            tracked_agent: self.tracked_agent,
        })
    }

    pub fn inspect_transaction(&self, signature: &str) -> Result<&MockTransaction, LobbyError> {
        self.ledger
            .find(signature)
            .ok_or_else(|| LobbyError::TransactionNotFound(signature.to_string()))
    }
}

/// The six standard games: three with random seeds, three with fixed seeds
pub fn default_catalog() -> Vec<GameRecord> {
    vec![
        GameRecord::new(101, "Game A (0 Bets)"),
        GameRecord::new(102, "Game B (1 Bet)").with_bet(Bet::new("Alice", 1)),
        GameRecord::new(103, "Game C (2 Bets, random seed)")
            .with_bet(Bet::new("Bob", 2))
            .with_bet(Bet::new("Cindy", 3)),
        GameRecord::new(104, "Game D (0 Bets, fixed A seed)").with_fixed_seed(Seed::filled(0x41)),
        GameRecord::new(105, "Game E (1 Bet, fixed B seed)")
            .with_fixed_seed(Seed::filled(0x42))
            .with_bet(Bet::new("Derek", 1)),
        GameRecord::new(106, "Game F (2 Bets, fixed C seed)")
            .with_fixed_seed(Seed::filled(0x43))
            .with_bet(Bet::new("Erin", 4))
            .with_bet(Bet::new("Frank", 3)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> Lobby {
        Lobby::with_ledger_seed(42)
    }

    #[test]
    fn test_catalog_listing() {
        let lobby = lobby();
        let games = lobby.list_games();
        assert_eq!(games.len(), 6);
        assert_eq!(games[0].id, 101);
        assert!(games.iter().all(|g| g.status == GameStatus::Open));
    }

    #[test]
    fn test_select_unknown_game() {
        let mut lobby = lobby();
        assert_eq!(lobby.select_game(999).unwrap_err(), LobbyError::UnknownGame(999));
        assert!(lobby.selected().is_none());
        assert_eq!(lobby.select_game(103).unwrap().id, 103);
        assert_eq!(lobby.selected_id(), Some(103));
    }

    #[test]
    fn test_place_bet_tracks_agent_and_records_tx() {
        let mut lobby = lobby();
        let sig = lobby.place_bet(101, 2).unwrap();
        let game = lobby.game(101).unwrap();
        assert_eq!(game.bets(), &[Bet::new(LOCAL_PLAYER, 2)]);
        assert_eq!(game.tx_signatures(), &[sig.clone()]);
        assert_eq!(lobby.tracked_agent(), Some(2));

        lobby.place_bet(101, 4).unwrap();
        assert_eq!(lobby.tracked_agent(), Some(4));
        assert!(lobby.inspect_transaction(&sig).unwrap().instructions.contains("skaterId=2"));
    }

    #[test]
    fn test_place_bet_rejects_unknown_agent() {
        let mut lobby = lobby();
        assert_eq!(lobby.place_bet(101, 9), Err(LobbyError::UnknownAgent(9)));
        assert!(lobby.game(101).unwrap().bets().is_empty());
        assert!(lobby.tracked_agent().is_none());
    }

    #[test]
    fn test_finalize_requires_two_bets() {
        let mut lobby = lobby();
        let err = lobby.finalize_game(102).unwrap_err();
        assert_eq!(err.to_string(), "Need at least 2 bets to finalize!");
        let game = lobby.game(102).unwrap();
        assert!(!game.is_finalized());
        assert!(game.resolved_seed().is_none());
        assert!(game.tx_signatures().is_empty());
        assert!(lobby.published().is_none());
    }

    #[test]
    fn test_finalize_publishes_exact_roster() {
        let mut lobby = lobby();
        let snapshot = lobby.finalize_game(103).unwrap();
        assert_eq!(snapshot.roster, vec![2, 3]);
        assert_eq!(lobby.published(), Some(&snapshot));
        assert_eq!(lobby.game(103).unwrap().tx_signatures().len(), 1);
    }

    #[test]
    fn test_finalize_twice_keeps_seed() {
        let mut lobby = lobby();
        let first = lobby.finalize_game(103).unwrap().seed;
        assert_eq!(lobby.finalize_game(103), Err(LobbyError::AlreadyFinalized));
        assert_eq!(lobby.game(103).unwrap().resolved_seed(), Some(&first));
        assert_eq!(lobby.game(103).unwrap().tx_signatures().len(), 1);
    }

    #[test]
    fn test_fixed_seed_game() {
        let mut lobby = lobby();
        let snapshot = lobby.finalize_game(106).unwrap();
        assert_eq!(snapshot.seed, Seed::filled(0x43));
        assert_eq!(snapshot.roster, vec![3, 4]);
    }

    #[test]
    fn test_bet_after_finalize_is_rejected() {
        let mut lobby = lobby();
        lobby.finalize_game(106).unwrap();
        assert_eq!(lobby.place_bet(106, 1), Err(LobbyError::BettingClosed));
        assert_eq!(lobby.game(106).unwrap().bets().len(), 2);
        assert!(lobby.tracked_agent().is_none());
    }

    #[test]
    fn test_start_race_requires_finalization() {
        let mut lobby = lobby();
        assert_eq!(lobby.start_race(103), Err(LobbyError::NotFinalized(103)));
        lobby.place_bet(103, 2).unwrap();
        lobby.finalize_game(103).unwrap();
        let snapshot = lobby.start_race(103).unwrap();
        assert_eq!(snapshot.roster, vec![2, 3]);
        assert_eq!(snapshot.tracked_agent, Some(2));
    }

    #[test]
    fn test_unknown_transaction() {
        let lobby = lobby();
        assert_eq!(
            lobby.inspect_transaction("abc").unwrap_err().to_string(),
            "Transaction not found: abc"
        );
    }
}
