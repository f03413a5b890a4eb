//! Game records, bets and race seeds

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::LobbyError;
use crate::roster::AgentId;
use crate::to_hex_upper;

/// Participant name used for bets placed from this client
pub const LOCAL_PLAYER: &str = "YOU";
/// Fixed stake for every bet
pub const BET_AMOUNT: u64 = 2;
/// Bets required before a game can be finalized
pub const MIN_BETS_TO_FINALIZE: usize = 2;

/// 32 bytes of race randomness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(pub [u8; 32]);

impl Seed {
    /// Every byte set to `byte` (debug games)
    pub const fn filled(byte: u8) -> Self {
        Self([byte; 32])
    }

    /// Draw from the thread-local CSPRNG (OS-seeded ChaCha)
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// First four bytes as a big-endian u32
    pub fn base_u32(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        to_hex_upper(&self.0)
    }
}

/// A stake on one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub player: String,
    pub agent_id: AgentId,
    pub amount: u64,
}

impl Bet {
    pub fn new(player: impl Into<String>, agent_id: AgentId) -> Self {
        Self {
            player: player.into(),
            agent_id,
            amount: BET_AMOUNT,
        }
    }
}

/// Open or finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Open,
    Finalized,
}

impl GameStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Open => "OPEN for Bets",
            GameStatus::Finalized => "FINALIZED",
        }
    }
}

/// One race game in the lobby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u32,
    pub title: String,
    finalized: bool,
    bets: Vec<Bet>,
    tx_signatures: Vec<String>,
    /// Predetermined seed for reproducible games
    fixed_seed: Option<Seed>,
    /// Seed resolved at finalization
    resolved_seed: Option<Seed>,
}

impl GameRecord {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            finalized: false,
            bets: Vec::new(),
            tx_signatures: Vec::new(),
            fixed_seed: None,
            resolved_seed: None,
        }
    }

    pub fn with_fixed_seed(mut self, seed: Seed) -> Self {
        self.fixed_seed = Some(seed);
        self
    }

    pub fn with_bet(mut self, bet: Bet) -> Self {
        self.bets.push(bet);
        self
    }

    pub fn status(&self) -> GameStatus {
        if self.finalized {
            GameStatus::Finalized
        } else {
            GameStatus::Open
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn tx_signatures(&self) -> &[String] {
        &self.tx_signatures
    }

    pub fn resolved_seed(&self) -> Option<&Seed> {
        self.resolved_seed.as_ref()
    }

    /// Distinct agents with at least one bet, ascending
    pub fn roster(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.bets.iter().map(|b| b.agent_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub(crate) fn push_bet(&mut self, bet: Bet) -> Result<(), LobbyError> {
        if self.finalized {
            return Err(LobbyError::BettingClosed);
        }
        self.bets.push(bet);
        Ok(())
    }

    pub(crate) fn push_signature(&mut self, signature: String) {
        self.tx_signatures.push(signature);
    }

    /// Lock the bet list and resolve the seed. The only state transition.
    pub(crate) fn finalize(&mut self) -> Result<Seed, LobbyError> {
        if self.finalized {
            return Err(LobbyError::AlreadyFinalized);
        }
        if self.bets.len() < MIN_BETS_TO_FINALIZE {
            return Err(LobbyError::NotEnoughBets {
                have: self.bets.len(),
                need: MIN_BETS_TO_FINALIZE,
            });
        }
        let seed = self.fixed_seed.unwrap_or_else(Seed::random);
        self.finalized = true;
        self.resolved_seed = Some(seed);
        Ok(seed)
    }
}
