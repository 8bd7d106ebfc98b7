//! Countdown gates turning N ticks into one pulse.
//!
//! The scheduler runs at a fixed rate; most behavior does not. A
//! [`DelayGate`] owned by an entity counts its ticks down and fires once
//! every `max` calls, so "every ten seconds" becomes a gate with
//! `max = 10 * TICKS_PER_SECOND`.

use std::num::NonZeroU32;

use tracing::debug;

/// Errors raised when building a delay gate.
#[derive(Debug, thiserror::Error)]
pub enum DelayError {
    /// The gate would never fire.
    #[error("delay gate {label:?} needs a positive max, got {max}")]
    InvalidMax {
        /// Label of the rejected gate.
        label: String,
        /// The rejected max.
        max: u32,
    },

    /// The diagnostic label is empty or whitespace.
    #[error("delay gate label must not be blank")]
    BlankLabel,
}

/// A reusable countdown owned by a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayGate {
    label: String,
    max: NonZeroU32,
    current: u32,
}

impl DelayGate {
    /// Create a gate firing every `max` triggers.
    ///
    /// # Errors
    ///
    /// Returns [`DelayError::InvalidMax`] if `max` is zero and
    /// [`DelayError::BlankLabel`] if `label` is blank.
    pub fn new(label: impl Into<String>, max: u32) -> Result<Self, DelayError> {
        let label = label.into();
        let Some(max) = NonZeroU32::new(max) else {
            return Err(DelayError::InvalidMax { label, max });
        };
        Self::with_max(label, max)
    }

    /// Create a gate from a max already known to be positive.
    ///
    /// # Errors
    ///
    /// Returns [`DelayError::BlankLabel`] if `label` is blank.
    pub fn with_max(label: impl Into<String>, max: NonZeroU32) -> Result<Self, DelayError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(DelayError::BlankLabel);
        }
        Ok(Self {
            label,
            max,
            current: max.get(),
        })
    }

    /// Count one call down. Returns `true` on every `max`-th call.
    pub fn trigger(&mut self) -> bool {
        self.current = self.current.saturating_sub(1);
        if self.current == 0 {
            self.current = self.max.get();
            debug!(label = %self.label, max = self.current, "Delay gate fired");
            true
        } else {
            false
        }
    }

    /// Restart the countdown from `max`.
    pub const fn reset(&mut self) {
        self.current = self.max.get();
    }

    /// Replace the max and restart the countdown.
    pub const fn rearm(&mut self, max: NonZeroU32) {
        self.max = max;
        self.current = max.get();
    }

    /// Calls left before the gate fires.
    pub const fn remaining(&self) -> u32 {
        self.current
    }

    /// Number of calls between two firings.
    pub const fn max(&self) -> u32 {
        self.max.get()
    }

    /// Diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }
}
