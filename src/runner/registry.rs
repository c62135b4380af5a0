// src/runner/registry.rs

//! Single-flight registry.
//!
//! A registry is one guarded slot holding the active run, if any. The
//! process-wide instance returned by [`Registry::global`] is what lets a
//! freshly created surface, which has no reference to whoever started the
//! operation, still find and attach to it. It is created on first use and
//! lives for the rest of the process; its slot is empty whenever no run is
//! active. Isolated instances ([`Registry::new`]) are for embedding several
//! independent hosts in one process, and for tests.

use std::sync::{Arc, LazyLock, Mutex};

use tracing::{debug, info, warn};

use crate::errors::{OprunError, Result};
use crate::surface::Surface;
use crate::sync::lock;
use crate::types::{RunId, StartPolicy, SurfaceId};

use super::core::RunnerCore;

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Public description of the active run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRunInfo {
    pub run_id: RunId,
    pub operation: String,
}

#[derive(Debug, Default)]
pub struct Registry {
    slot: Mutex<Option<Arc<RunnerCore>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Register `runner` as the active run.
    pub(crate) fn start(&self, runner: &Arc<RunnerCore>, policy: StartPolicy) -> Result<()> {
        let mut slot = lock(&self.slot);

        if let Some(current) = slot.as_ref() {
            if Arc::ptr_eq(current, runner) {
                return Err(OprunError::AlreadyStarted(runner.id()));
            }

            match policy {
                StartPolicy::Exclusive => {
                    return Err(OprunError::AlreadyRunning {
                        requested: runner.operation_name().to_string(),
                        running: current.operation_name().to_string(),
                        running_id: current.id(),
                    });
                }
                StartPolicy::Overwrite => {
                    warn!(
                        displaced = %current.id(),
                        displaced_operation = current.operation_name(),
                        run_id = %runner.id(),
                        operation = runner.operation_name(),
                        "overwriting active run"
                    );
                }
            }
        }

        *slot = Some(Arc::clone(runner));
        info!(run_id = %runner.id(), operation = runner.operation_name(), "run registered");
        Ok(())
    }

    /// Release the slot if, and only if, it still holds `runner`.
    pub(crate) fn clear(&self, runner: &Arc<RunnerCore>) -> bool {
        let mut slot = lock(&self.slot);
        match slot.as_ref() {
            Some(current) if Arc::ptr_eq(current, runner) => {
                *slot = None;
                debug!(run_id = %runner.id(), "registry slot released");
                true
            }
            Some(current) => {
                debug!(
                    run_id = %runner.id(),
                    active = %current.id(),
                    "stale clear ignored; slot belongs to another run"
                );
                false
            }
            None => false,
        }
    }

    /// Attach `surface` to the active run, whatever instance that is.
    ///
    /// Returns `false` when no run is active.
    pub fn route_surface_attached(&self, surface: &Arc<dyn Surface>) -> bool {
        let Some(active) = self.active_core() else {
            debug!(surface = %surface.id(), "no active run; attach ignored");
            return false;
        };
        active.attach_surface(surface)
    }

    /// Detach `surface` from the active run if that run is bound to it.
    ///
    /// A detach for any other surface is a stale lifecycle event and is
    /// ignored; returns whether a detach happened.
    pub fn route_surface_detached(&self, surface: SurfaceId) -> bool {
        let Some(active) = self.active_core() else {
            debug!(surface = %surface, "no active run; detach ignored");
            return false;
        };
        let detached = active.detach_surface(surface);
        if !detached {
            debug!(
                run_id = %active.id(),
                surface = %surface,
                bound = ?active.binding().bound_surface(),
                "detach for a surface that is not bound; ignored"
            );
        }
        detached
    }

    pub fn active_run(&self) -> Option<ActiveRunInfo> {
        self.active_core().map(|core| ActiveRunInfo {
            run_id: core.id(),
            operation: core.operation_name().to_string(),
        })
    }

    /// Surface currently bound to the active run.
    pub fn active_surface(&self) -> Option<SurfaceId> {
        self.active_core()
            .and_then(|core| core.binding().bound_surface())
    }

    pub fn is_idle(&self) -> bool {
        lock(&self.slot).is_none()
    }

    // Routing works on a clone so that no registry lock is held while the
    // binding submits jobs (an inline dispatcher runs them right away).
    fn active_core(&self) -> Option<Arc<RunnerCore>> {
        lock(&self.slot).clone()
    }
}
