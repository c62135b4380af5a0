// src/types.rs

//! Small shared value types.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide identifier of one operation runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    pub(crate) fn next() -> Self {
        RunId(NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Identity of a surface. Two surfaces are the same surface exactly when their
/// ids are equal; the runner never compares surfaces any other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub const fn new(raw: u64) -> Self {
        SurfaceId(raw)
    }

    /// Allocate an id that no other `fresh()` call in this process returns.
    pub fn fresh() -> Self {
        // Keep clear of small hand-picked ids used with `new`.
        SurfaceId((1 << 32) + NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// What `start` does when another runner is already active.
///
/// - `Exclusive`: fail with `AlreadyRunning` (the normal case).
/// - `Overwrite`: replace the active runner. This is the recovery escape hatch
///   for a runner whose surface is gone for good and whose worker will never
///   finish; the displaced runner keeps running but can no longer be reached
///   through the registry, and its eventual completion will not clear the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPolicy {
    #[default]
    Exclusive,
    Overwrite,
}

/// Lifecycle phase of an operation runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Constructed, `start` not called (or it failed).
    Starting,
    /// Registered and the worker thread is executing the operation.
    Running,
    /// The outcome is known and the completion sequence is pending or running.
    Completing,
    /// Handler ran, indicator torn down, registry slot released.
    Done,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        self == RunPhase::Done
    }
}
