//! Race state and core simulation types
//!
//! The race exclusively owns every per-agent visual (position, icon); a
//! finished or torn-down agent simply stops producing them.

use glam::Vec2;
use serde::Serialize;

use super::events::EventQueue;
use super::event_log::EventLog;
use super::rng::Lcg32;
use super::scoring;
use crate::consts::START_ANGLE_STEP;
use crate::error::RaceError;
use crate::lobby::{RaceSnapshot, Seed};
use crate::roster::{self, AgentDescriptor, AgentId};
use crate::tuning::RaceTuning;
use crate::{ellipse_point, normalize_degrees};

/// Current phase of the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RacePhase {
    /// "3, 2, 1, GO!" before anyone moves
    Countdown,
    /// Agents are moving
    Racing,
    /// Everyone finished; scores are final
    Finished,
}

/// Trick names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrickKind {
    Kickflip,
    Ollie,
    Grind,
}

impl TrickKind {
    pub const ALL: [TrickKind; 3] = [TrickKind::Kickflip, TrickKind::Ollie, TrickKind::Grind];

    pub fn name(&self) -> &'static str {
        match self {
            TrickKind::Kickflip => "Kickflip",
            TrickKind::Ollie => "Ollie",
            TrickKind::Grind => "Grind",
        }
    }
}

/// Transient icon shown next to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IconKind {
    Boost,
    Trick,
    Failed,
    Landed,
}

impl IconKind {
    pub fn glyph(&self) -> &'static str {
        match self {
            IconKind::Boost => "💪🏻",
            IconKind::Trick => "🛹",
            IconKind::Failed => "❌",
            IconKind::Landed => "✅",
        }
    }
}

/// An icon plus the token that lets a stale clear be ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentIcon {
    pub kind: IconKind,
    pub token: u64,
}

/// Simulation state of one racing agent
#[derive(Debug, Clone)]
pub struct AgentRaceState {
    pub descriptor: &'static AgentDescriptor,

    // Position
    /// Track angle (degrees, unbounded)
    pub angle: f64,
    /// Degrees travelled since the current lap started, in [0, 360)
    pub accumulated_angle: f64,
    /// Point on the ellipse
    pub position: Vec2,
    /// Sprite is mirrored horizontally
    pub mirrored: bool,

    // Kinematics
    pub speed: f64,
    pub base_speed: f64,
    /// Seconds until the next boost roll
    pub boost_timer: f64,
    /// Seconds of boost left (0 = not boosted)
    pub boost_remaining: f64,

    // Events
    pub tricking: bool,
    pub trick: Option<TrickKind>,
    /// Seconds until the next trick roll
    pub trick_timer: f64,
    pub crashed: bool,
    pub crash_timer: f64,

    // Progress
    pub laps: u32,
    /// Completed lap durations (ms)
    pub lap_times: Vec<f64>,
    pub lap_started_ms: f64,
    pub distance: f64,
    pub tricks_landed: u32,
    pub score: u32,
    pub finished_ms: Option<f64>,

    pub icon: Option<AgentIcon>,
    rng: Lcg32,
}

impl AgentRaceState {
    pub fn new(descriptor: &'static AgentDescriptor, seed: &Seed, tuning: &RaceTuning) -> Self {
        let angle = START_ANGLE_STEP * (descriptor.id as f64 - 1.0);
        let mut agent = Self {
            descriptor,
            angle,
            accumulated_angle: 0.0,
            position: Vec2::ZERO,
            mirrored: true,
            speed: tuning.base_speed,
            base_speed: tuning.base_speed,
            boost_timer: 0.0,
            boost_remaining: 0.0,
            tricking: false,
            trick: None,
            trick_timer: 0.0,
            crashed: false,
            crash_timer: 0.0,
            laps: 0,
            lap_times: Vec::with_capacity(tuning.laps),
            lap_started_ms: 0.0,
            distance: 0.0,
            tricks_landed: 0,
            score: 0,
            finished_ms: None,
            icon: None,
            rng: Lcg32::for_agent(seed, descriptor.id),
        };
        agent.update_position();
        agent
    }

    pub fn id(&self) -> AgentId {
        self.descriptor.id
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn color(&self) -> &'static str {
        self.descriptor.color
    }

    pub fn is_finished(&self) -> bool {
        self.finished_ms.is_some()
    }

    pub fn is_boosted(&self) -> bool {
        self.boost_remaining > 0.0
    }

    /// Next unit roll from this agent's private generator
    #[inline]
    pub fn roll(&mut self) -> f64 {
        self.rng.next_f64()
    }

    pub fn roll_index(&mut self, len: usize) -> usize {
        self.rng.next_index(len)
    }

    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    /// Recompute the sprite position and facing from the angle.
    /// Faces forward only on the upper half (180°, 360°).
    pub fn update_position(&mut self) {
        self.position = ellipse_point(self.angle);
        let normalized = normalize_degrees(self.angle);
        self.mirrored = !(normalized > 180.0 && normalized < 360.0);
    }

    pub fn refresh_score(&mut self) {
        self.score = scoring::base_score(self.tricks_landed, self.distance);
    }
}

/// Final result of a race
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceOutcome {
    pub winner: AgentId,
    /// (agent, final score) in roster order
    pub final_scores: Vec<(AgentId, u32)>,
    /// Whether the tracked agent won; `None` if nobody was tracked
    pub tracked_won: Option<bool>,
}

/// Complete race state, owned by the race scene
#[derive(Debug, Clone)]
pub struct Race {
    pub(crate) game_id: u32,
    pub(crate) seed: Seed,
    pub(crate) tracked_agent: Option<AgentId>,
    pub(crate) tuning: RaceTuning,
    pub(crate) phase: RacePhase,
    /// Clock reading when the scene was entered (ms)
    pub(crate) entered_ms: f64,
    /// Countdown label currently displayed
    pub(crate) countdown_label: Option<&'static str>,
    pub(crate) start_ms: Option<f64>,
    /// Clock reading of the latest frame (ms)
    pub(crate) now_ms: f64,
    /// Race clock shown to the player; frozen once finished
    pub(crate) elapsed_ms: f64,
    /// Agents in ascending id order
    pub(crate) agents: Vec<AgentRaceState>,
    pub(crate) events: EventQueue,
    pub(crate) log: EventLog,
    pub(crate) celebration_ms: Option<f64>,
    pub(crate) status: String,
    pub(crate) outcome: Option<RaceOutcome>,
    pub(crate) next_icon_token: u64,
}

impl Race {
    /// Build a race from the lobby hand-off, entering the countdown at `now_ms`
    pub fn new(
        snapshot: &RaceSnapshot,
        tuning: RaceTuning,
        now_ms: f64,
    ) -> Result<Self, RaceError> {
        if snapshot.roster.is_empty() {
            return Err(RaceError::EmptyRoster);
        }

        let mut ids = snapshot.roster.clone();
        ids.sort_unstable();
        ids.dedup();

        let agents = ids
            .iter()
            .map(|&id| {
                roster::agent(id)
                    .map(|d| AgentRaceState::new(d, &snapshot.seed, &tuning))
                    .ok_or(RaceError::UnknownAgent(id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Race for game {} created: seed base {:#010x}, agents {:?}",
            snapshot.game_id,
            snapshot.seed.base_u32(),
            ids
        );

        Ok(Self {
            game_id: snapshot.game_id,
            seed: snapshot.seed,
            tracked_agent: snapshot.tracked_agent,
            tuning,
            phase: RacePhase::Countdown,
            entered_ms: now_ms,
            countdown_label: None,
            start_ms: None,
            now_ms,
            elapsed_ms: 0.0,
            agents,
            events: EventQueue::new(),
            log: EventLog::new(),
            celebration_ms: None,
            status: "Racing...".to_string(),
            outcome: None,
            next_icon_token: 0,
        })
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn tuning(&self) -> &RaceTuning {
        &self.tuning
    }

    pub fn tracked_agent(&self) -> Option<AgentId> {
        self.tracked_agent
    }

    pub fn agents(&self) -> &[AgentRaceState] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentRaceState> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn start_ms(&self) -> Option<f64> {
        self.start_ms
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn countdown_label(&self) -> Option<&'static str> {
        self.countdown_label
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn celebration_ms(&self) -> Option<f64> {
        self.celebration_ms
    }

    pub fn outcome(&self) -> Option<&RaceOutcome> {
        self.outcome.as_ref()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    /// Release all per-race state: agents, visuals, log and pending effects
    pub fn teardown(&mut self) {
        log::info!("Tearing down race for game {}", self.game_id);
        self.agents.clear();
        self.events.clear();
        self.log.clear();
        self.celebration_ms = None;
        self.countdown_label = None;
        self.outcome = None;
    }
}
