//! Tick budget: a listener that signals once a number of ticks has run.

use std::sync::Arc;

use delve_core::{TickListener, TickResponse};
use tokio::sync::Notify;
use tracing::info;

/// Counts ticks and wakes the engine once `max_ticks` have run.
#[derive(Debug)]
pub struct TickBudget {
    remaining: u64,
    exhausted: Arc<Notify>,
}

impl TickBudget {
    /// A budget of `max_ticks` ticks, signalled through `exhausted`.
    pub const fn new(max_ticks: u64, exhausted: Arc<Notify>) -> Self {
        Self {
            remaining: max_ticks,
            exhausted,
        }
    }
}

impl TickListener for TickBudget {
    fn on_tick(&mut self) -> TickResponse {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickResponse::KeepListening;
        }
        info!("Tick budget exhausted");
        self.exhausted.notify_one();
        TickResponse::StopListening
    }
}
