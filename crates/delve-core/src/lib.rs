//! Discrete-time core for the Delve dungeon simulation.
//!
//! Everything that evolves in the dungeon does so one tick at a time. This
//! crate owns the tick source and the small building blocks that turn
//! ticks into behavior.
//!
//! # Modules
//!
//! - [`listener`] -- The contract implemented by anything notified each tick
//! - [`scheduler`] -- The tick source: membership staging, lifecycle, manual stepping
//! - [`delay`] -- Countdown gates converting N ticks into one pulse
//! - [`config`] -- YAML configuration for the engine

pub mod config;
pub mod delay;
pub mod listener;
pub mod scheduler;

pub use delay::{DelayError, DelayGate};
pub use listener::{SharedListener, TickListener, TickResponse, shared};
pub use scheduler::{Scheduler, SchedulerError, SchedulerState};
