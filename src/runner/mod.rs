// src/runner/mod.rs

//! Single-flight operation runner.
//!
//! This module ties together:
//! - the [`Operation`] contract implemented by callers,
//! - the process-wide [`Registry`] enforcing "at most one active run" and
//!   routing surface attach/detach to whichever run is active,
//! - the [`OperationRunner`] that starts the worker thread and chains the
//!   caller's completion handler with teardown.
//!
//! Lifecycle of one run:
//!
//! ```text
//! Starting --start()--> Running --operation returns--> Completing --handler,
//!     teardown, registry clear--> Done
//! ```

pub mod completion;
pub mod context;
pub(crate) mod core;
pub mod operation;
pub mod registry;
pub mod runner;

pub use context::RunnerContext;
pub use operation::{operation_fn, CompletionHandler, FnOperation, Operation, Outcome};
pub use registry::{ActiveRunInfo, Registry};
pub use runner::OperationRunner;
