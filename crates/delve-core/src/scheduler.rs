//! The tick source driving every creature in the dungeon.
//!
//! A [`Scheduler`] owns a live set of listeners and two staging sets. Each
//! tick it merges the pending additions, applies the pending removals, then
//! notifies every live listener once, synchronously and in registration
//! order, before advancing its counter. Listeners answering
//! [`TickResponse::StopListening`](crate::TickResponse) are dropped on the spot.
//!
//! # Threading
//!
//! [`Scheduler::start`] spawns one background thread that runs ticks at a
//! fixed period. Membership changes may come from any thread at any time:
//! they only touch the staging sets, so the live set is never mutated while
//! it is being iterated except by the loop itself. When the loop is stopped
//! the same tick algorithm can be stepped by hand with [`Scheduler::tick`],
//! which is what deterministic tests use.
//!
//! # Design Principles
//!
//! - Registration during tick N takes effect at tick N+1, never N.
//! - No tick runs while paused; resuming neither skips nor repeats a tick.
//! - A tick overrunning its period is logged and never dropped.

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::listener::{ListenerKey, SharedListener};

/// Number of ticks in one second of simulated time.
pub const TICKS_PER_SECOND: u32 = 6;

/// Default wall-clock period between two ticks (one sixth of a second).
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(166);

/// Value of the tick counter before the first tick runs.
const FIRST_TICK: u64 = 1;

/// Errors raised by scheduler operations.
///
/// All of them are programmer errors: calling an operation out of sequence
/// or with a nonsensical argument.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The operation is not allowed in the current lifecycle state.
    #[error("cannot {operation} while the scheduler is {state}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The state the scheduler was in.
        state: SchedulerState,
    },

    /// An argument was out of range.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Explanation of what is wrong with the argument.
        reason: String,
    },

    /// The operating system refused to spawn the loop thread.
    #[error("failed to spawn the scheduler thread: {source}")]
    Spawn {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Lifecycle state of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No background loop; manual stepping is allowed.
    Stopped,
    /// The background loop is running ticks.
    Started,
    /// The background loop exists but runs no ticks until resumed.
    Paused,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Started => "started",
            Self::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// A registered (or staged) listener together with its identity key.
struct Entry {
    key: ListenerKey,
    listener: SharedListener,
}

impl Entry {
    fn new(listener: SharedListener) -> Self {
        Self {
            key: ListenerKey::of(&listener),
            listener,
        }
    }
}

/// Lifecycle bookkeeping shared with the loop thread.
#[derive(Debug)]
struct Control {
    state: SchedulerState,
    /// Bumped on every start so a loop outliving its stop can tell it is stale.
    generation: u64,
    period: Duration,
}

impl Control {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.state != SchedulerState::Stopped
    }
}

/// State shared between the scheduler handle and its loop thread.
struct Shared {
    control: Mutex<Control>,
    wake: Condvar,
    pending_add: Mutex<Vec<Entry>>,
    pending_remove: Mutex<Vec<Entry>>,
    live: Mutex<Vec<Entry>>,
    tick: AtomicU64,
    live_count: AtomicUsize,
    missed: AtomicU64,
}

impl Shared {
    /// Run one tick: merge, purge, notify, advance.
    fn run_tick(&self) {
        let mut live = self.live.lock();

        let additions = mem::take(&mut *self.pending_add.lock());
        for entry in additions {
            if !live.iter().any(|existing| existing.key == entry.key) {
                live.push(entry);
            }
        }

        let removals = mem::take(&mut *self.pending_remove.lock());
        if !removals.is_empty() {
            live.retain(|entry| !removals.iter().any(|removed| removed.key == entry.key));
        }

        let tick = self.tick.load(Ordering::Acquire);
        let before = live.len();
        live.retain(|entry| entry.listener.lock().on_tick().keeps_listening());

        let dropped = before.saturating_sub(live.len());
        if dropped > 0 {
            debug!(tick, dropped, "Listeners stopped listening");
        }

        self.live_count.store(live.len(), Ordering::Release);
        self.tick.store(tick.saturating_add(1), Ordering::Release);
    }

    /// Block until the next tick is due.
    ///
    /// Returns `false` when the loop owning `generation` must exit.
    fn wait_for_next_tick(&self, generation: u64, deadline: Instant) -> bool {
        let mut control = self.control.lock();
        let mut waited = false;
        let mut was_paused = false;

        loop {
            if !control.is_current(generation) {
                return false;
            }
            if control.state == SchedulerState::Paused {
                was_paused = true;
                self.wake.wait(&mut control);
                continue;
            }
            if was_paused {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                let missed = now.saturating_duration_since(deadline);
                if !waited && !missed.is_zero() {
                    self.missed.fetch_add(1, Ordering::AcqRel);
                    let missed_by_ms = u64::try_from(missed.as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        tick = self.tick.load(Ordering::Acquire),
                        missed_by_ms, "Missed tick deadline"
                    );
                }
                return true;
            }

            waited = true;
            self.wake.wait_until(&mut control, deadline);
        }
    }
}

/// Body of the background thread.
fn run_loop(shared: &Shared, generation: u64) {
    debug!(generation, "Scheduler loop started");
    loop {
        let period = {
            let control = shared.control.lock();
            if !control.is_current(generation) {
                break;
            }
            control.period
        };

        let now = Instant::now();
        let deadline = now.checked_add(period).unwrap_or(now);
        shared.run_tick();

        if !shared.wait_for_next_tick(generation, deadline) {
            break;
        }
    }
    debug!(generation, "Scheduler loop exited");
}

/// Discrete tick source with staged membership and a start/pause/stop lifecycle.
///
/// Create one per simulation and hand it by reference to whatever needs to
/// register listeners. Dropping the scheduler stops its loop.
pub struct Scheduler {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Create a stopped scheduler ticking at [`DEFAULT_PERIOD`].
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                control: Mutex::new(Control {
                    state: SchedulerState::Stopped,
                    generation: 0,
                    period: DEFAULT_PERIOD,
                }),
                wake: Condvar::new(),
                pending_add: Mutex::new(Vec::new()),
                pending_remove: Mutex::new(Vec::new()),
                live: Mutex::new(Vec::new()),
                tick: AtomicU64::new(FIRST_TICK),
                live_count: AtomicUsize::new(0),
                missed: AtomicU64::new(0),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Create a stopped scheduler with a custom tick period.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidArgument`] if `period` is zero.
    pub fn with_period(period: Duration) -> Result<Self, SchedulerError> {
        let scheduler = Self::new();
        scheduler.set_period(period)?;
        Ok(scheduler)
    }

    /// Create a stopped scheduler running `ticks_per_second` ticks each second.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidArgument`] if `ticks_per_second` is
    /// zero or above 1000.
    pub fn with_rate(ticks_per_second: u32) -> Result<Self, SchedulerError> {
        let millis = 1000_u64
            .checked_div(u64::from(ticks_per_second))
            .unwrap_or(0);
        if millis == 0 {
            return Err(SchedulerError::InvalidArgument {
                reason: format!("{ticks_per_second} ticks per second is not a usable rate"),
            });
        }
        Self::with_period(Duration::from_millis(millis))
    }

    /// Queue `listener` for addition at the next tick boundary.
    ///
    /// Registering the same handle twice before that boundary is the same
    /// as registering it once.
    pub fn register(&self, listener: SharedListener) {
        let entry = Entry::new(listener);
        let mut pending = self.shared.pending_add.lock();
        if !pending.iter().any(|staged| staged.key == entry.key) {
            pending.push(entry);
        }
    }

    /// Queue `listener` for removal at the next tick boundary.
    ///
    /// Removals are applied after additions, so registering and
    /// unregistering within one cycle leaves the listener unregistered.
    pub fn unregister(&self, listener: &SharedListener) {
        let entry = Entry::new(Arc::clone(listener));
        let mut pending = self.shared.pending_remove.lock();
        if !pending.iter().any(|staged| staged.key == entry.key) {
            pending.push(entry);
        }
    }

    /// Spawn the background loop.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidState`] unless the scheduler is
    /// stopped, or [`SchedulerError::Spawn`] if the thread cannot be created.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut worker = self.worker.lock();
        let generation = {
            let mut control = self.shared.control.lock();
            if control.state != SchedulerState::Stopped {
                return Err(SchedulerError::InvalidState {
                    operation: "start",
                    state: control.state,
                });
            }
            control.state = SchedulerState::Started;
            control.generation = control.generation.wrapping_add(1);
            control.generation
        };

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("delve-scheduler".to_owned())
            .spawn(move || run_loop(&shared, generation));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                info!(tick = self.tick_id(), period_ms = self.period_ms(), "Scheduler started");
                Ok(())
            }
            Err(source) => {
                self.shared.control.lock().state = SchedulerState::Stopped;
                Err(SchedulerError::Spawn { source })
            }
        }
    }

    /// Halt the background loop and wait for it to exit.
    ///
    /// A tick already in flight completes; any pending wait is abandoned.
    /// When called from a listener (that is, from the loop thread itself)
    /// the loop exits as soon as the current tick returns.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidState`] if the scheduler is already stopped.
    pub fn stop(&self) -> Result<(), SchedulerError> {
        let handle = {
            let mut worker = self.worker.lock();
            {
                let mut control = self.shared.control.lock();
                if control.state == SchedulerState::Stopped {
                    return Err(SchedulerError::InvalidState {
                        operation: "stop",
                        state: control.state,
                    });
                }
                control.state = SchedulerState::Stopped;
            }
            self.shared.wake.notify_all();
            worker.take()
        };

        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                debug!("Stop requested from the scheduler thread");
            } else if handle.join().is_err() {
                warn!("Scheduler thread panicked");
            }
        }

        info!(tick = self.tick_id(), "Scheduler stopped");
        Ok(())
    }

    /// Ask the loop to suspend before its next tick.
    ///
    /// Only signals: a tick already running finishes first.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidState`] unless the scheduler is started.
    pub fn pause(&self) -> Result<(), SchedulerError> {
        self.transition("pause", SchedulerState::Started, SchedulerState::Paused)
    }

    /// Wake a paused loop; the next tick runs immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidState`] unless the scheduler is paused.
    pub fn resume(&self) -> Result<(), SchedulerError> {
        self.transition("resume", SchedulerState::Paused, SchedulerState::Started)
    }

    fn transition(
        &self,
        operation: &'static str,
        from: SchedulerState,
        to: SchedulerState,
    ) -> Result<(), SchedulerError> {
        {
            let mut control = self.shared.control.lock();
            if control.state != from {
                return Err(SchedulerError::InvalidState {
                    operation,
                    state: control.state,
                });
            }
            control.state = to;
        }
        self.shared.wake.notify_all();
        info!(tick = self.tick_id(), state = %to, "Scheduler {operation}");
        Ok(())
    }

    /// Run a single tick on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidState`] unless the scheduler is stopped.
    pub fn tick(&self) -> Result<(), SchedulerError> {
        self.tick_n(1)
    }

    /// Run `count` consecutive ticks on the calling thread.
    ///
    /// Uses exactly the same per-tick algorithm as the background loop.
    /// Must not race with a loop being started from another thread.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidArgument`] if `count` is zero and
    /// [`SchedulerError::InvalidState`] unless the scheduler is stopped.
    pub fn tick_n(&self, count: u32) -> Result<(), SchedulerError> {
        if count == 0 {
            return Err(SchedulerError::InvalidArgument {
                reason: "tick count must be positive".to_owned(),
            });
        }
        let state = self.state();
        if state != SchedulerState::Stopped {
            return Err(SchedulerError::InvalidState {
                operation: "tick",
                state,
            });
        }
        for _ in 0..count {
            self.shared.run_tick();
        }
        Ok(())
    }

    /// Stop the loop if needed and forget every listener and the tick count.
    ///
    /// Intended for tests that reuse one scheduler across cases.
    ///
    /// # Errors
    ///
    /// Propagates errors from stopping the loop.
    pub fn reset(&self) -> Result<(), SchedulerError> {
        if self.state() != SchedulerState::Stopped {
            self.stop()?;
        }
        self.shared.pending_add.lock().clear();
        self.shared.pending_remove.lock().clear();
        self.shared.live.lock().clear();
        self.shared.live_count.store(0, Ordering::Release);
        self.shared.tick.store(FIRST_TICK, Ordering::Release);
        self.shared.missed.store(0, Ordering::Release);
        debug!("Scheduler reset");
        Ok(())
    }

    /// Change the wall-clock period, effective from the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidArgument`] if `period` is zero.
    pub fn set_period(&self, period: Duration) -> Result<(), SchedulerError> {
        if period.is_zero() {
            return Err(SchedulerError::InvalidArgument {
                reason: "tick period must be positive".to_owned(),
            });
        }
        self.shared.control.lock().period = period;
        Ok(())
    }

    /// Current wall-clock period between ticks.
    pub fn period(&self) -> Duration {
        self.shared.control.lock().period
    }

    fn period_ms(&self) -> u64 {
        u64::try_from(self.period().as_millis()).unwrap_or(u64::MAX)
    }

    /// Number of the next tick to run. Starts at 1.
    pub fn tick_id(&self) -> u64 {
        self.shared.tick.load(Ordering::Acquire)
    }

    /// How many times the loop woke past a tick deadline and logged it.
    pub fn missed_ticks(&self) -> u64 {
        self.shared.missed.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.shared.control.lock().state
    }

    /// Number of live listeners as of the end of the last tick.
    ///
    /// Staged registrations are not counted until a tick merges them.
    pub fn listener_count(&self) -> usize {
        self.shared.live_count.load(Ordering::Acquire)
    }

    /// Whether `listener` is in the live set.
    ///
    /// Must not be called from inside a listener: the live set is locked for
    /// the whole duration of a tick.
    pub fn is_registered(&self, listener: &SharedListener) -> bool {
        let key = ListenerKey::of(listener);
        self.shared.live.lock().iter().any(|entry| entry.key == key)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state())
            .field("tick", &self.tick_id())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.state() == SchedulerState::Stopped {
            return;
        }
        if let Err(error) = self.stop() {
            warn!(%error, "Failed to stop scheduler on drop");
        }
    }
}
