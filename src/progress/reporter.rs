// src/progress/reporter.rs

//! Worker-side progress handle.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::config::RunnerConfig;
use crate::dispatch::InlineDispatcher;
use crate::progress::state::ProgressState;
use crate::surface::binding::{RenderUpdate, SurfaceBinding};
use crate::surface::NoIndicators;
use crate::sync::lock;
use crate::types::RunId;

/// Handle through which an operation reports progress.
///
/// Safe to call from any thread. Each update is stored in the shared
/// [`ProgressState`] and, when a surface is attached at that moment, turned
/// into a render job on the foreground dispatcher. Render jobs keep the order
/// in which the updates were made; none are merged or dropped.
#[derive(Clone)]
pub struct ProgressReporter {
    run_id: RunId,
    state: Arc<Mutex<ProgressState>>,
    binding: SurfaceBinding,
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("run_id", &self.run_id)
            .field("state", &self.current_state())
            .finish_non_exhaustive()
    }
}

impl ProgressReporter {
    pub(crate) fn new(run_id: RunId, initial: ProgressState, binding: SurfaceBinding) -> Self {
        Self {
            run_id,
            state: Arc::new(Mutex::new(initial)),
            binding,
        }
    }

    /// A reporter that is not connected to any runner or surface.
    ///
    /// Handy for exercising an [`Operation`](crate::runner::Operation) on its
    /// own; updates are only recorded in the state.
    pub fn standalone() -> Self {
        let run_id = RunId::next();
        let config = RunnerConfig::default();
        let binding = SurfaceBinding::new(
            run_id,
            &config.title,
            Arc::new(NoIndicators),
            Arc::new(InlineDispatcher),
        );
        Self::new(run_id, ProgressState::initial(&config), binding)
    }

    pub fn update_message(&self, message: impl Into<String>) {
        let message = message.into();
        lock(&self.state).set_message(message.clone());
        self.render(RenderUpdate::Message(message));
    }

    pub fn update_submessage(&self, submessage: impl Into<String>) {
        let submessage = submessage.into();
        lock(&self.state).set_submessage(submessage.clone());
        self.render(RenderUpdate::SubMessage(submessage));
    }

    /// Snapshot of the latest progress.
    pub fn current_state(&self) -> ProgressState {
        lock(&self.state).clone()
    }

    // The state lock is released before the binding is consulted. Indicator
    // creation reads the state while holding the binding lock, so an update
    // stored before that read is in the seed, and one stored after it renders
    // onto the new indicator once the lock is free.
    fn render(&self, update: RenderUpdate) {
        if self.binding.is_attached() {
            self.binding.render(update);
        } else {
            trace!(run_id = %self.run_id, "no surface attached; progress stored only");
        }
    }
}
