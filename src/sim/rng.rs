//! Per-agent linear congruential generator
//!
//! Each agent owns one of these; draws never cross agents, so the roster
//! order cannot change another agent's sequence.

use crate::lobby::Seed;
use crate::roster::AgentId;

pub const LCG_MULTIPLIER: u32 = 1_664_525;
pub const LCG_INCREMENT: u32 = 1_013_904_223;
/// Per-agent seed offset
pub const AGENT_SEED_OFFSET: u32 = 1_234_567;

const TWO_POW_32: f64 = 4_294_967_296.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg32 {
    state: u32,
}

impl Lcg32 {
    pub const fn new(state: u32) -> Self {
        Self { state }
    }

    /// `(seed base + id * 1234567) mod 2^32`
    pub fn for_agent(seed: &Seed, id: AgentId) -> Self {
        Self::new(
            seed.base_u32()
                .wrapping_add(id.wrapping_mul(AGENT_SEED_OFFSET)),
        )
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Uniform float in [0, 1)
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / TWO_POW_32
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sequence() {
        let mut rng = Lcg32::new(0);
        assert_eq!(rng.next_u32(), 1_013_904_223);
        assert_eq!(rng.next_u32(), 1_196_435_762);
        assert_eq!(rng.next_u32(), 3_519_870_697);
    }

    #[test]
    fn test_agent_seeding() {
        let rng = Lcg32::for_agent(&Seed::filled(0x43), 3);
        assert_eq!(rng.state(), 1_132_185_304);

        // Wraps instead of overflowing
        let rng = Lcg32::for_agent(&Seed::filled(0xFF), 4);
        assert_eq!(rng.state(), u32::MAX.wrapping_add(4 * AGENT_SEED_OFFSET));
    }

    #[test]
    fn test_float_range() {
        let mut rng = Lcg32::new(u32::MAX);
        for _ in 0..1000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }
        assert!(rng.next_index(3) < 3);
    }
}
