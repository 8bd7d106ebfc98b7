//! Tangibility of creatures.
//!
//! Most creature types are permanently material or immaterial. A few
//! flicker: they stay in one phase for a random number of ticks, flip,
//! and draw a new duration. Both behaviors sit behind [`Materializer`] so
//! the creature does not care which one it owns.

use std::fmt;
use std::num::NonZeroU32;

use delve_core::{DelayGate, TickListener, TickResponse};
use delve_types::Materiality;
use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::error::CreatureError;

/// Shortest phase of a flickering creature, in ticks.
pub const MIN_PHASE_TICKS: u32 = 6;

/// Longest phase of a flickering creature, in ticks.
pub const MAX_PHASE_TICKS: u32 = 18;

/// Strategy deciding whether a creature is tangible.
///
/// Advanced once per creature tick through [`TickListener::on_tick`].
pub trait Materializer: TickListener + fmt::Debug {
    /// Current tangibility.
    fn materiality(&self) -> Materiality;
}

/// Tangibility that never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticMaterializer {
    materiality: Materiality,
}

impl StaticMaterializer {
    /// Fix the tangibility for good.
    pub const fn new(materiality: Materiality) -> Self {
        Self { materiality }
    }
}

impl TickListener for StaticMaterializer {
    fn on_tick(&mut self) -> TickResponse {
        TickResponse::StopListening
    }
}

impl Materializer for StaticMaterializer {
    fn materiality(&self) -> Materiality {
        self.materiality
    }
}

/// Tangibility flipping after random phases of 6 to 18 ticks.
///
/// Starts tangible.
#[derive(Debug)]
pub struct RandomMaterializer {
    materiality: Materiality,
    gate: DelayGate,
    rng: StdRng,
}

impl RandomMaterializer {
    /// Start a tangible phase whose length is drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`CreatureError::Delay`] if `label` is blank.
    pub fn new(label: impl Into<String>, mut rng: StdRng) -> Result<Self, CreatureError> {
        let gate = DelayGate::with_max(label, draw_phase(&mut rng))?;
        Ok(Self {
            materiality: Materiality::Material,
            gate,
            rng,
        })
    }

    /// Ticks left in the current phase.
    pub const fn remaining(&self) -> u32 {
        self.gate.remaining()
    }
}

impl TickListener for RandomMaterializer {
    fn on_tick(&mut self) -> TickResponse {
        if self.gate.trigger() {
            self.materiality = self.materiality.flipped();
            self.gate.rearm(draw_phase(&mut self.rng));
            debug!(
                materializer = self.gate.label(),
                materiality = ?self.materiality,
                next_flip_in = self.gate.remaining(),
                "Materiality flipped"
            );
        }
        TickResponse::KeepListening
    }
}

impl Materializer for RandomMaterializer {
    fn materiality(&self) -> Materiality {
        self.materiality
    }
}

fn draw_phase(rng: &mut StdRng) -> NonZeroU32 {
    NonZeroU32::new(rng.random_range(MIN_PHASE_TICKS..=MAX_PHASE_TICKS)).unwrap_or(NonZeroU32::MIN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn static_materializer_never_changes_and_stops_listening() {
        let mut ghost = StaticMaterializer::new(Materiality::Immaterial);
        assert_eq!(ghost.on_tick(), TickResponse::StopListening);
        assert_eq!(ghost.materiality(), Materiality::Immaterial);
    }

    #[test]
    fn random_phases_stay_within_bounds() {
        let mut flicker = RandomMaterializer::new("flicker", StdRng::seed_from_u64(3)).unwrap();
        let mut phase = 0_u32;
        let mut current = flicker.materiality();
        for _ in 0..500 {
            assert_eq!(flicker.on_tick(), TickResponse::KeepListening);
            phase += 1;
            if flicker.materiality() != current {
                assert!((MIN_PHASE_TICKS..=MAX_PHASE_TICKS).contains(&phase));
                current = flicker.materiality();
                phase = 0;
            }
        }
    }

    #[test]
    fn blank_label_is_rejected() {
        assert!(RandomMaterializer::new(" ", StdRng::seed_from_u64(0)).is_err());
    }
}
