//! Per-frame race update
//!
//! The host calls [`update`] once per rendered frame. All agent mutation
//! happens here, in ascending agent id order.

use super::events::{DeferredEvent, EventQueue};
use super::event_log::EventLog;
use super::scoring;
use super::state::{AgentIcon, AgentRaceState, IconKind, Race, RaceOutcome, RacePhase, TrickKind};
use crate::consts::*;
use crate::distance_per_degree;
use crate::roster::{self, AgentId};
use crate::tuning::RaceTuning;

/// Clock input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Monotonic host clock (ms)
    pub now_ms: f64,
    /// Time since the previous frame (ms)
    pub delta_ms: f64,
}

impl FrameInput {
    pub fn new(now_ms: f64, delta_ms: f64) -> Self {
        Self { now_ms, delta_ms }
    }

    /// Delta clamped to `[0, max_ms]`; non-finite deltas count as 0
    pub fn sanitized_delta_ms(&self, max_ms: f64) -> f64 {
        if self.delta_ms.is_finite() {
            self.delta_ms.clamp(0.0, max_ms)
        } else {
            0.0
        }
    }
}

/// Mutable race pieces an agent step may touch besides the agent itself
struct Effects<'a> {
    events: &'a mut EventQueue,
    log: &'a mut EventLog,
    tuning: &'a RaceTuning,
    next_token: &'a mut u64,
}

impl Effects<'_> {
    /// Replace the agent's icon; lingering icons get a scheduled clear
    fn show_icon(&mut self, agent: &mut AgentRaceState, kind: IconKind, now: f64, linger: bool) {
        *self.next_token += 1;
        let token = *self.next_token;
        agent.icon = Some(AgentIcon { kind, token });
        if linger {
            self.events.schedule(
                now + self.tuning.icon_linger_ms,
                DeferredEvent::ClearIcon {
                    agent: agent.id(),
                    token,
                },
            );
        }
    }
}

/// Advance the race by one frame
pub fn update(race: &mut Race, input: FrameInput) {
    let now = if input.now_ms.is_finite() {
        input.now_ms
    } else {
        race.now_ms
    };
    race.now_ms = now;
    race.log.expire(now);

    match race.phase {
        RacePhase::Countdown => advance_countdown(race, now),
        RacePhase::Racing => {
            let dt = input.sanitized_delta_ms(race.tuning.max_frame_delta_ms) / 1000.0;
            if let Some(start) = race.start_ms {
                race.elapsed_ms = now - start;
            }

            let Race {
                agents,
                events,
                log: event_log,
                tuning,
                next_icon_token,
                ..
            } = race;
            let mut fx = Effects {
                events,
                log: event_log,
                tuning,
                next_token: next_icon_token,
            };

            run_deferred(agents, &mut fx, now);
            for agent in agents.iter_mut() {
                step_agent(agent, &mut fx, now, dt);
            }

            if race.celebration_ms.is_none() && race.agents.iter().all(|a| a.laps >= 1) {
                race.celebration_ms = Some(now);
                log::info!("All skaters completed their first lap");
            }

            if race.agents.iter().all(|a| a.is_finished()) {
                finish_race(race, now);
            }
        }
        RacePhase::Finished => {}
    }
}

/// Drive frames of `frame_ms` from `start_ms` until the race finishes or
/// `max_frames` elapse. Returns the number of frames run.
pub fn run_until_finished(
    race: &mut Race,
    start_ms: f64,
    frame_ms: f64,
    max_frames: usize,
) -> usize {
    let mut now = start_ms;
    for frame in 0..max_frames {
        if race.is_finished() {
            return frame;
        }
        now += frame_ms;
        update(race, FrameInput::new(now, frame_ms));
    }
    max_frames
}

fn advance_countdown(race: &mut Race, now: f64) {
    let elapsed = now - race.entered_ms;
    let ticks = (elapsed / COUNTDOWN_INTERVAL_MS).floor();
    if ticks >= 1.0 {
        let index = (ticks as usize).min(COUNTDOWN_LABELS.len()) - 1;
        race.countdown_label = Some(COUNTDOWN_LABELS[index]);
    }

    let go_at = COUNTDOWN_LABELS.len() as f64 * COUNTDOWN_INTERVAL_MS + COUNTDOWN_GO_HOLD_MS;
    if elapsed >= go_at {
        race.countdown_label = None;
        race.phase = RacePhase::Racing;
        race.start_ms = Some(now);
        race.elapsed_ms = 0.0;
        for agent in &mut race.agents {
            agent.lap_started_ms = now;
        }
        log::info!("Race for game {} started at {:.0}ms", race.game_id, now);
    }
}

fn run_deferred(agents: &mut [AgentRaceState], fx: &mut Effects<'_>, now: f64) {
    while let Some(event) = fx.events.pop_due(now) {
        match event {
            DeferredEvent::ResolveTrick { agent } => {
                if let Some(agent) = find_active(agents, agent) {
                    if agent.tricking {
                        resolve_trick(agent, fx, now);
                    }
                }
            }
            DeferredEvent::ClearIcon { agent, token } => {
                if let Some(agent) = find_active(agents, agent) {
                    if agent.icon.map(|i| i.token) == Some(token) {
                        agent.icon = None;
                    }
                }
            }
        }
    }
}

fn find_active(agents: &mut [AgentRaceState], id: AgentId) -> Option<&mut AgentRaceState> {
    agents
        .iter_mut()
        .find(|a| a.id() == id && !a.is_finished())
}

fn resolve_trick(agent: &mut AgentRaceState, fx: &mut Effects<'_>, now: f64) {
    let tuning = fx.tuning;
    agent.tricking = false;
    let trick = agent.trick.take().map(|t| t.name()).unwrap_or("trick");

    if agent.roll() < tuning.trick_failure_probability {
        agent.crashed = true;
        agent.crash_timer = tuning.crash_duration;
        agent.speed = agent.base_speed * tuning.crash_speed_factor;
        fx.log.push(format!("{} Failed!", agent.name()), agent.color(), now);
        fx.show_icon(agent, IconKind::Failed, now, true);
        log::debug!("{} crashed on a {}", agent.name(), trick);
    } else {
        agent.tricks_landed += 1;
        agent.refresh_score();
        fx.log.push(format!("{} Success!", agent.name()), agent.color(), now);
        fx.show_icon(agent, IconKind::Landed, now, true);
        log::debug!("{} landed a {}", agent.name(), trick);
    }
}

fn step_agent(agent: &mut AgentRaceState, fx: &mut Effects<'_>, now: f64, dt: f64) {
    if agent.is_finished() {
        return;
    }
    let tuning = fx.tuning;

    // Boost
    agent.boost_timer -= dt;
    if agent.boost_timer <= 0.0 && !agent.tricking && !agent.crashed {
        if agent.roll() < tuning.boost_probability {
            agent.boost_remaining = tuning.boost_duration;
            agent.speed = agent.base_speed * tuning.boost_multiplier;
            fx.log.push(format!("{} Boost!", agent.name()), agent.color(), now);
            fx.show_icon(agent, IconKind::Boost, now, true);
            log::debug!("{} boosts", agent.name());
        }
        agent.boost_timer = tuning.boost_reset.lerp(agent.roll());
    }
    if agent.boost_remaining > 0.0 {
        agent.boost_remaining -= dt;
        if agent.boost_remaining <= 0.0 {
            agent.boost_remaining = 0.0;
            agent.speed = agent.base_speed;
        }
    }

    // Tricks
    agent.trick_timer -= dt;
    if agent.trick_timer <= 0.0 && !agent.tricking && !agent.crashed && !agent.is_boosted() {
        if agent.roll() < tuning.trick_probability {
            let kind = TrickKind::ALL[agent.roll_index(TrickKind::ALL.len())];
            agent.tricking = true;
            agent.trick = Some(kind);
            fx.log.push(
                format!("{} attempts {}!", agent.name(), kind.name()),
                agent.color(),
                now,
            );
            fx.show_icon(agent, IconKind::Trick, now, false);
            fx.events.schedule(
                now + tuning.trick_reveal_delay_ms,
                DeferredEvent::ResolveTrick { agent: agent.id() },
            );
        }
        agent.trick_timer = tuning.trick_reset.lerp(agent.roll());
    }

    // Crash cooldown
    if agent.crash_timer > 0.0 {
        agent.crash_timer -= dt;
        if agent.crash_timer <= 0.0 {
            agent.crash_timer = 0.0;
            agent.crashed = false;
            agent.speed = agent.base_speed;
        }
    }

    // Movement; tricks drop the scale multiplier rather than stopping the agent
    let mut effective = agent.speed;
    if !agent.tricking {
        effective *= tuning.movement_scale;
    }
    let delta_angle = effective * dt;
    agent.accumulated_angle += delta_angle;
    if agent.accumulated_angle >= 360.0 {
        let lap_ms = now - agent.lap_started_ms;
        agent.lap_times.push(lap_ms);
        agent.lap_started_ms = now;
        agent.laps += 1;
        agent.accumulated_angle %= 360.0;
        log::info!(
            "{} completed lap {} in {:.2}s",
            agent.name(),
            agent.laps,
            lap_ms / 1000.0
        );
    }
    if agent.lap_times.len() >= tuning.laps {
        agent.finished_ms = Some(now);
        agent.icon = None;
        agent.refresh_score();
        log::info!("{} finished at {:.0}ms", agent.name(), now);
        return;
    }

    agent.angle += delta_angle;
    agent.distance += delta_angle * distance_per_degree();
    agent.update_position();
    agent.refresh_score();
}

fn finish_race(race: &mut Race, now: f64) {
    let lap_times: Vec<(AgentId, &[f64])> = race
        .agents
        .iter()
        .map(|a| (a.id(), a.lap_times.as_slice()))
        .collect();
    let bonuses =
        scoring::lap_bonus_totals(&lap_times, race.tuning.laps, &race.tuning.lap_bonuses);

    for agent in &mut race.agents {
        agent.refresh_score();
        agent.score += bonuses.get(&agent.id()).copied().unwrap_or(0);
    }

    let final_scores: Vec<(AgentId, u32)> =
        race.agents.iter().map(|a| (a.id(), a.score)).collect();
    let Some(winner) = scoring::pick_winner(&final_scores) else {
        return;
    };

    race.phase = RacePhase::Finished;
    race.events.clear();

    let winner_name = roster::agent_name(winner);
    race.status = format!("Winner: {}!", winner_name);
    race.log.push(race.status.clone(), "#ff0", now);

    let tracked_won = race.tracked_agent.map(|tracked| tracked == winner);
    if let Some(won) = tracked_won {
        let (message, color) = if won {
            ("You Won!", "#00ff00")
        } else {
            ("You Lost!", "#ff0000")
        };
        race.log.push(message, color, now);
    }

    log::info!(
        "Race for game {} finished: winner {} scores {:?}",
        race.game_id,
        winner_name,
        final_scores
    );
    race.outcome = Some(RaceOutcome {
        winner,
        final_scores,
        tracked_won,
    });
}
