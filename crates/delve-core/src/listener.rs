//! The tick-listener contract.
//!
//! A listener is handed one notification per tick and answers whether it
//! wants the next one. Listeners are shared between the code that created
//! them and the scheduler, so they travel as [`SharedListener`] handles.

use std::sync::Arc;

use parking_lot::Mutex;

/// Answer returned by a listener after handling a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResponse {
    /// Keep notifying this listener on later ticks.
    KeepListening,
    /// Drop this listener from the scheduler immediately.
    StopListening,
}

impl TickResponse {
    /// Whether the listener asked to stay registered.
    pub const fn keeps_listening(self) -> bool {
        matches!(self, Self::KeepListening)
    }
}

impl From<bool> for TickResponse {
    fn from(keep: bool) -> Self {
        if keep { Self::KeepListening } else { Self::StopListening }
    }
}

/// Anything that evolves as simulated time passes.
pub trait TickListener: Send {
    /// Handle one tick.
    ///
    /// Runs synchronously on the scheduler thread; a slow implementation
    /// delays every other listener of the same tick.
    fn on_tick(&mut self) -> TickResponse;
}

/// A listener handle shared with the scheduler.
///
/// Identity is the allocation: two clones of one handle are the same
/// listener, two separately allocated listeners never are.
pub type SharedListener = Arc<Mutex<dyn TickListener>>;

/// Wrap a listener into a handle that can be registered.
///
/// The concrete type is kept so the caller can still inspect its listener;
/// the handle coerces to [`SharedListener`] when registered.
pub fn shared<L: TickListener>(listener: L) -> Arc<Mutex<L>> {
    Arc::new(Mutex::new(listener))
}

/// Stable key identifying a listener allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListenerKey(usize);

impl ListenerKey {
    pub(crate) fn of(listener: &SharedListener) -> Self {
        Self(Arc::as_ptr(listener).cast::<()>().addr())
    }
}
