// src/lib.rs

pub mod cli;
pub mod config;
pub mod demo;
pub mod dispatch;
pub mod errors;
pub mod logging;
pub mod progress;
pub mod runner;
pub mod surface;
pub mod types;

mod sync;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, RunnerConfig};
use crate::demo::{ConsoleIndicatorFactory, ConsoleSurface, CountdownOperation};
use crate::dispatch::{foreground_channel, Dispatcher, ForegroundDispatcher};
use crate::runner::{OperationRunner, Registry, RunnerContext};
use crate::surface::Surface;
use crate::types::StartPolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the foreground loop (driven on the current task)
/// - the runner with a console indicator
/// - a background task that replaces the surface every few steps
pub async fn run(args: CliArgs) -> Result<()> {
    let runner_config = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .into_runner(),
        None => RunnerConfig::default(),
    };

    let (dispatcher, foreground) = foreground_channel();
    let dispatcher = Arc::new(dispatcher);

    let ctx = RunnerContext::new(Arc::new(ConsoleIndicatorFactory))
        .with_dispatcher(Arc::clone(&dispatcher) as Arc<dyn Dispatcher>)
        .with_config(runner_config);

    let first: Arc<dyn Surface> = Arc::new(ConsoleSurface::new(1));
    let operation = CountdownOperation::new(
        args.steps,
        Duration::from_millis(args.step_ms),
        args.fail_at,
    );

    let (outcome_tx, outcome_rx) = oneshot::channel();
    let stop_loop = Arc::clone(&dispatcher);
    let mut runner = OperationRunner::new(&ctx, operation)
        .with_surface(&first)
        .on_complete(move |outcome| {
            let _ = outcome_tx.send(outcome);
            stop_loop.shutdown();
        });

    runner.start(StartPolicy::Exclusive)?;
    info!(run_id = %runner.run_id(), steps = args.steps, "demo operation started");

    let recreation = (args.recreate_every > 0).then(|| {
        let every = Duration::from_millis(args.step_ms.saturating_mul(u64::from(args.recreate_every)));
        spawn_surface_recreation(
            Arc::clone(&dispatcher),
            Arc::clone(ctx.registry()),
            Arc::clone(&first),
            every,
        )
    });

    let jobs = foreground.run().await;
    debug!(jobs, "foreground loop drained");

    if let Some(handle) = recreation {
        handle.abort();
    }
    tokio::task::spawn_blocking(move || runner.await_completion()).await??;

    match outcome_rx.await? {
        Ok(steps) => {
            println!("operation finished after {steps} steps");
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err).context("demo operation failed")),
    }
}

/// Periodically replace the bound surface, the way a UI that is torn down and
/// rebuilt would: the old surface reports it is gone, the new one reports in,
/// and neither knows which runner (if any) is active.
fn spawn_surface_recreation(
    dispatcher: Arc<ForegroundDispatcher>,
    registry: Arc<Registry>,
    first: Arc<dyn Surface>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut current = first;
        let mut next_id = current.id().get() + 1;

        loop {
            tokio::time::sleep(every).await;
            if registry.is_idle() || dispatcher.is_closed() {
                break;
            }

            let replacement: Arc<dyn Surface> = Arc::new(ConsoleSurface::new(next_id));
            next_id += 1;

            let old_id = current.id();
            let registry = Arc::clone(&registry);
            let new_surface = Arc::clone(&replacement);
            dispatcher.submit(Box::new(move || {
                registry.route_surface_detached(old_id);
                registry.route_surface_attached(&new_surface);
            }));

            current = replacement;
        }
    })
}
