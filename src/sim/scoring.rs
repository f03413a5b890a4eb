//! Score computation and winner resolution

use std::collections::BTreeMap;

use crate::roster::AgentId;

/// Track length units per score point
pub const DISTANCE_PER_POINT: f64 = 100.0;

/// Running score: trick successes plus whole hundreds of distance
#[inline]
pub fn base_score(tricks: u32, distance: f64) -> u32 {
    tricks + (distance.max(0.0) / DISTANCE_PER_POINT).floor() as u32
}

/// Sum of per-lap placement bonuses for each agent.
///
/// For every lap index below `laps`, agents that recorded that lap are ranked
/// by duration (fastest first, ties to the lower id) and receive
/// `bonuses[place]`, or 0 past the end of the table. Agents missing a lap get
/// nothing for it.
pub fn lap_bonus_totals(
    lap_times: &[(AgentId, &[f64])],
    laps: usize,
    bonuses: &[u32],
) -> BTreeMap<AgentId, u32> {
    let mut totals: BTreeMap<AgentId, u32> = lap_times.iter().map(|(id, _)| (*id, 0)).collect();

    for lap in 0..laps {
        let mut ranked: Vec<(AgentId, f64)> = lap_times
            .iter()
            .filter_map(|(id, times)| times.get(lap).map(|t| (*id, *t)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        for (place, (id, _)) in ranked.into_iter().enumerate() {
            if let Some(total) = totals.get_mut(&id) {
                *total += bonuses.get(place).copied().unwrap_or(0);
            }
        }
    }
    totals
}

/// Highest score wins; equal scores go to the lowest id
pub fn pick_winner(scores: &[(AgentId, u32)]) -> Option<AgentId> {
    scores
        .iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(id, _)| *id)
}

/// Scoreboard order: score descending, then id ascending
pub fn standings_order(scores: &mut [(AgentId, u32)]) {
    scores.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
}
