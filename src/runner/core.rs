// src/runner/core.rs

//! Type-erased part of a runner shared with the registry.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::config::RunnerConfig;
use crate::dispatch::Dispatcher;
use crate::progress::{ProgressReporter, ProgressState};
use crate::surface::{IndicatorFactory, Surface, SurfaceBinding};
use crate::sync::lock;
use crate::types::{RunId, RunPhase, SurfaceId};

/// State of one run that outlives the `OperationRunner` value.
///
/// The registry and the completion job hold it through an `Arc`, so dropping
/// the runner (e.g. because the UI that created it went away) does not stop
/// routing or completion.
pub(crate) struct RunnerCore {
    id: RunId,
    operation_name: String,
    binding: SurfaceBinding,
    progress: ProgressReporter,
    phase: Mutex<RunPhase>,
}

impl fmt::Debug for RunnerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerCore")
            .field("id", &self.id)
            .field("operation", &self.operation_name)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl RunnerCore {
    pub(crate) fn new(
        operation_name: String,
        config: &RunnerConfig,
        indicators: Arc<dyn IndicatorFactory>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Arc<Self> {
        let id = RunId::next();
        let binding = SurfaceBinding::new(id, &config.title, indicators, dispatcher);
        let progress = ProgressReporter::new(id, ProgressState::initial(config), binding.clone());
        Arc::new(Self {
            id,
            operation_name,
            binding,
            progress,
            phase: Mutex::new(RunPhase::Starting),
        })
    }

    pub(crate) fn id(&self) -> RunId {
        self.id
    }

    pub(crate) fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub(crate) fn binding(&self) -> &SurfaceBinding {
        &self.binding
    }

    pub(crate) fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    pub(crate) fn phase(&self) -> RunPhase {
        *lock(&self.phase)
    }

    pub(crate) fn set_phase(&self, phase: RunPhase) {
        *lock(&self.phase) = phase;
    }

    pub(crate) fn attach_surface(&self, surface: &Arc<dyn Surface>) -> bool {
        self.binding.attach(surface, &self.progress)
    }

    pub(crate) fn detach_surface(&self, surface: SurfaceId) -> bool {
        self.binding.detach_if_bound_to(surface)
    }
}
