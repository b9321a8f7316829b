//! Per-pipeline lifecycle, stored in an `AtomicU8` so producers can read it
//! without taking a lock.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// `NotStarted -> Running -> Draining -> Stopped`, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum PipelineState {
    NotStarted = 0,
    Running = 1,
    Draining = 2,
    Stopped = 3,
}

impl PipelineState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub(super) struct AtomicState(AtomicU8);

impl AtomicState {
    pub(super) const fn new() -> Self {
        Self(AtomicU8::new(PipelineState::NotStarted as u8))
    }

    pub(super) fn get(&self) -> PipelineState {
        PipelineState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from -> to`; returns false if the pipeline was elsewhere.
    pub(super) fn advance(&self, from: PipelineState, to: PipelineState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(super) fn set(&self, to: PipelineState) {
        self.0.store(to as u8, Ordering::Release);
    }
}
