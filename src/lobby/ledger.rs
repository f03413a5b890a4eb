//! Mock transaction ledger
//!
//! Signatures are decorative: random base58-alphabet strings that let the UI
//! show and inspect a transaction list. Nothing here is cryptographic.

use std::fmt;

use chrono::DateTime;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

/// Base58 alphabet (no 0, O, I, l)
pub const SIGNATURE_ALPHABET: &[u8] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
pub const SIGNATURE_LEN: usize = 44;

const SLOT_MIN: u64 = 100_000;
const SLOT_SPAN: u64 = 50_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockTransaction {
    pub signature: String,
    pub slot: u64,
    /// Unix seconds
    pub block_time: u64,
    pub instructions: String,
}

impl MockTransaction {
    /// Block time as a UTC date, or raw seconds if out of range
    pub fn block_time_display(&self) -> String {
        i64::try_from(self.block_time)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| self.block_time.to_string())
    }
}

impl fmt::Display for MockTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature: {}\nSlot: {}\nBlockTime: {}\nInstructions: {}",
            self.signature,
            self.slot,
            self.block_time_display(),
            self.instructions
        )
    }
}

/// Append-only list of mock transactions
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<MockTransaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction and return its signature
    pub fn record(&mut self, rng: &mut Pcg32, instructions: String, block_time: u64) -> String {
        let signature = mock_signature(rng);
        let slot = SLOT_MIN + rng.random_range(0..SLOT_SPAN);
        self.entries.push(MockTransaction {
            signature: signature.clone(),
            slot,
            block_time,
            instructions,
        });
        signature
    }

    pub fn find(&self, signature: &str) -> Option<&MockTransaction> {
        self.entries.iter().find(|t| t.signature == signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Random fixed-length signature over the base58 alphabet
pub fn mock_signature(rng: &mut Pcg32) -> String {
    (0..SIGNATURE_LEN)
        .map(|_| SIGNATURE_ALPHABET[rng.random_range(0..SIGNATURE_ALPHABET.len())] as char)
        .collect()
}
