// src/runner/runner.rs

//! The operation runner.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::dispatch::{self, Dispatcher};
use crate::errors::{OperationError, OprunError, Result};
use crate::progress::ProgressState;
use crate::surface::Surface;
use crate::sync::lock;
use crate::types::{RunId, RunPhase, StartPolicy, SurfaceId};

use super::completion::{panic_message, Completion};
use super::context::RunnerContext;
use super::core::RunnerCore;
use super::operation::{CompletionHandler, Operation, Outcome};
use super::registry::Registry;

/// Runs one [`Operation`] on a worker thread while progress is shown on the
/// foreground.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use oprun::runner::{operation_fn, OperationRunner, RunnerContext};
/// # use oprun::surface::{IndicatorFactory, Surface};
/// # use oprun::types::StartPolicy;
/// # fn demo(indicators: Arc<dyn IndicatorFactory>, surface: Arc<dyn Surface>) -> oprun::errors::Result<()> {
/// let ctx = RunnerContext::new(indicators);
/// let op = operation_fn("sync", |progress| {
///     progress.update_message("Syncing...");
///     Ok(3)
/// });
/// let mut runner = OperationRunner::new(&ctx, op)
///     .with_surface(&surface)
///     .on_complete(|outcome| println!("synced: {outcome:?}"));
/// runner.start(StartPolicy::Exclusive)?;
/// runner.await_completion()?;
/// # Ok(())
/// # }
/// ```
pub struct OperationRunner<O: Operation> {
    core: Arc<RunnerCore>,
    ctx: RunnerContext,
    operation: Option<O>,
    handler: Option<CompletionHandler<O::Output>>,
    initial_surface: Option<Weak<dyn Surface>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<O: Operation> fmt::Debug for OperationRunner<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRunner")
            .field("core", &self.core)
            .field("started", &self.operation.is_none())
            .finish_non_exhaustive()
    }
}

impl<O: Operation> OperationRunner<O> {
    pub fn new(ctx: &RunnerContext, operation: O) -> Self {
        let core = RunnerCore::new(
            operation.name(),
            ctx.config(),
            Arc::clone(ctx.indicators()),
            Arc::clone(ctx.dispatcher()),
        );
        debug!(run_id = %core.id(), operation = core.operation_name(), "runner created");

        Self {
            core,
            ctx: ctx.clone(),
            operation: Some(operation),
            handler: None,
            initial_surface: None,
            worker: Mutex::new(None),
        }
    }

    /// Surface to show progress on as soon as the run starts.
    pub fn with_surface(mut self, surface: &Arc<dyn Surface>) -> Self {
        self.initial_surface = Some(Arc::downgrade(surface));
        self
    }

    /// Handler invoked with the outcome before the indicator is torn down.
    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(Outcome<O::Output>) + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Register with the single-flight registry and launch the worker.
    ///
    /// On `AlreadyRunning` nothing has changed: the runner can be started
    /// again later, and the active run is untouched.
    pub fn start(&mut self, policy: StartPolicy) -> Result<()> {
        let Some(operation) = self.operation.take() else {
            return Err(OprunError::AlreadyStarted(self.core.id()));
        };

        let registry = Arc::clone(self.ctx.registry());
        if let Err(err) = registry.start(&self.core, policy) {
            self.operation = Some(operation);
            return Err(err);
        }

        if let Some(surface) = self.initial_surface.as_ref().and_then(Weak::upgrade) {
            self.core.attach_surface(&surface);
        }

        self.core.set_phase(RunPhase::Running);

        let core = Arc::clone(&self.core);
        let dispatcher = Arc::clone(self.ctx.dispatcher());
        let handler = self.handler.take();
        let spawn_registry = Arc::clone(&registry);

        let spawned = thread::Builder::new()
            .name(self.ctx.config().worker_thread_name.clone())
            .spawn(move || run_worker(core, spawn_registry, dispatcher, operation, handler));

        match spawned {
            Ok(handle) => {
                *lock(&self.worker) = Some(handle);
                info!(
                    run_id = %self.core.id(),
                    operation = self.core.operation_name(),
                    ?policy,
                    "worker started"
                );
                Ok(())
            }
            Err(err) => {
                error!(run_id = %self.core.id(), error = %err, "failed to spawn worker thread");
                let binding = self.core.binding().clone();
                self.ctx.dispatcher().submit(Box::new(move || {
                    binding.teardown_final();
                }));
                registry.clear(&self.core);
                self.core.set_phase(RunPhase::Done);
                Err(OprunError::WorkerSpawn(err))
            }
        }
    }

    /// Attach `surface` to this run directly.
    ///
    /// Hosts that may no longer hold the runner should use
    /// [`Registry::route_surface_attached`].
    pub fn attach_surface(&self, surface: &Arc<dyn Surface>) -> bool {
        self.core.attach_surface(surface)
    }

    /// Detach `surface` if it is the bound one.
    pub fn detach_surface(&self, surface: SurfaceId) -> bool {
        self.core.detach_surface(surface)
    }

    /// Block until the worker thread has exited.
    ///
    /// This waits for the operation body only; the completion sequence runs
    /// on its own (on the foreground loop it may still be queued when this
    /// returns). Returns immediately if the runner was never started or has
    /// already been awaited.
    ///
    /// Fails with `AwaitOnForeground` when called from a foreground-loop job.
    pub fn await_completion(&self) -> Result<()> {
        if dispatch::on_foreground() {
            return Err(OprunError::AwaitOnForeground);
        }

        // `OperationRunner` is not `Sync` (the handler is only `Send`), so the
        // lock is only contention-free interior mutability for `&self`.
        let mut worker = lock(&self.worker);
        if let Some(handle) = worker.take() {
            handle
                .join()
                .map_err(|_| OprunError::WorkerPanicked(self.core.id()))?;
            debug!(run_id = %self.core.id(), "worker joined");
        }
        Ok(())
    }

    /// Whether the worker thread has exited (false before `start`).
    pub fn is_finished(&self) -> bool {
        match lock(&self.worker).as_ref() {
            Some(handle) => handle.is_finished(),
            None => self.operation.is_none(),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.core.id()
    }

    pub fn operation_name(&self) -> &str {
        self.core.operation_name()
    }

    pub fn phase(&self) -> RunPhase {
        self.core.phase()
    }

    pub fn progress(&self) -> ProgressState {
        self.core.progress().current_state()
    }

    pub fn bound_surface(&self) -> Option<SurfaceId> {
        self.core.binding().bound_surface()
    }
}

fn run_worker<O: Operation>(
    core: Arc<RunnerCore>,
    registry: Arc<Registry>,
    dispatcher: Arc<dyn Dispatcher>,
    mut operation: O,
    handler: Option<CompletionHandler<O::Output>>,
) {
    let run_id = core.id();
    debug!(%run_id, operation = core.operation_name(), "operation body starting");

    let progress = core.progress().clone();
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| operation.run(&progress))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(OperationError::Failed(err)),
        Err(payload) => {
            let message = panic_message(&*payload);
            error!(%run_id, panic = %message, "operation panicked");
            Err(OperationError::Panicked(message))
        }
    };

    debug!(%run_id, succeeded = outcome.is_ok(), "operation body finished");
    core.set_phase(RunPhase::Completing);

    let completion = Completion {
        core,
        registry,
        handler,
        outcome,
    };
    dispatcher.submit(Box::new(move || completion.finish()));

    drop(operation);
}
