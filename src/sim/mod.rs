//! Deterministic race simulation
//!
//! All race logic lives here. Given the same seed, roster, tuning and frame
//! sequence, a race replays bit-for-bit:
//! - Per-agent seeded generators only
//! - Stable iteration order (by agent ID)
//! - Deferred effects keyed by the frame clock, never by real timers

pub mod event_log;
pub mod events;
pub mod rng;
pub mod scoring;
pub mod state;
pub mod tick;

pub use event_log::{EventLog, LogEntry};
pub use events::{DeferredEvent, EventQueue};
pub use rng::Lcg32;
pub use state::{AgentIcon, AgentRaceState, IconKind, Race, RaceOutcome, RacePhase, TrickKind};
pub use tick::{FrameInput, run_until_finished, update};
