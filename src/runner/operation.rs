// src/runner/operation.rs

//! The operation contract.

use std::fmt;

use anyhow::anyhow;

use crate::errors::OperationError;
use crate::progress::ProgressReporter;

/// Result delivered to the completion handler.
pub type Outcome<T> = std::result::Result<T, OperationError>;

/// Caller-supplied completion handler. Runs once, before any teardown.
pub type CompletionHandler<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;

/// A long-running unit of work.
///
/// `run` executes synchronously on the worker thread and must not touch
/// foreground resources; the only way to reach the surface is `progress`.
/// There is no cancellation: once started, `run` goes to completion.
pub trait Operation: Send + 'static {
    type Output: Send + 'static;

    /// Name used in logs and in `AlreadyRunning` diagnostics.
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    fn run(&mut self, progress: &ProgressReporter) -> anyhow::Result<Self::Output>;
}

/// An operation backed by a closure. See [`operation_fn`].
pub struct FnOperation<F> {
    name: String,
    body: Option<F>,
}

impl<F> fmt::Debug for FnOperation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .field("consumed", &self.body.is_none())
            .finish()
    }
}

/// Wrap a closure as a named [`Operation`].
pub fn operation_fn<F, T>(name: impl Into<String>, body: F) -> FnOperation<F>
where
    F: FnOnce(&ProgressReporter) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    FnOperation {
        name: name.into(),
        body: Some(body),
    }
}

impl<F, T> Operation for FnOperation<F>
where
    F: FnOnce(&ProgressReporter) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&mut self, progress: &ProgressReporter) -> anyhow::Result<T> {
        let body = self
            .body
            .take()
            .ok_or_else(|| anyhow!("operation '{}' already ran", self.name))?;
        body(progress)
    }
}
