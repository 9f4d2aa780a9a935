//! Per-packet loss decision.
//!
//! Each received datagram gets one uniform draw in [0,100] and is dropped
//! when the draw lands strictly below the configured loss rate. The draw
//! space has 101 values, so a rate of L drops at L/101, not L/100, and a
//! rate of 100 still forwards the boundary draw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive upper bound of the uniform draw
const DRAW_MAX: i32 = 100;

/// What to do with a received datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketAction {
    Drop,
    Forward,
}

/// Random loss model, consulted once per received datagram.
pub struct LossModel {
    loss_rate: i32,
    rng: StdRng,
}

impl LossModel {
    /// Model seeded from OS entropy so successive runs differ.
    pub fn new(loss_rate: i32) -> Self {
        LossModel {
            loss_rate,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic model for tests.
    pub fn with_seed(loss_rate: i32, seed: u64) -> Self {
        LossModel {
            loss_rate,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decide the fate of one datagram.
    pub fn decide(&mut self) -> PacketAction {
        let draw = self.rng.gen_range(0..=DRAW_MAX);
        if draw < self.loss_rate {
            PacketAction::Drop
        } else {
            PacketAction::Forward
        }
    }
}
