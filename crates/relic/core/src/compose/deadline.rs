//! Cooperative deadlines.
//!
//! Engine entry points accept a deadline value instead of relying on
//! thread-level timeouts. Composition checks it at stacking-group
//! boundaries; optimization checks it before each candidate evaluation.

use std::time::{Duration, Instant};

/// A point in time after which cooperative work should stop.
///
/// `Deadline::none()` never expires. Deadlines are cheap to copy and are
/// passed down by value.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub const fn none() -> Self {
        Self { at: None }
    }

    /// Expires `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// Expires at the given instant.
    pub const fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Time left before expiry; `None` when the deadline never expires.
    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
