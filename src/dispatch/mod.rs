// src/dispatch/mod.rs

//! Foreground dispatch abstraction.
//!
//! Everything that touches a progress indicator is handed to a [`Dispatcher`]
//! as a [`Job`]. Which context actually runs the job is chosen once, when the
//! runner context is built:
//!
//! - [`InlineDispatcher`] runs the job immediately on the calling thread. This
//!   is the non-interactive mode (tests, headless tools) where no foreground
//!   loop exists.
//! - [`ForegroundDispatcher`] queues the job onto a [`ForegroundLoop`], a
//!   single-threaded loop that runs jobs one at a time in arrival order.

pub mod foreground;
pub mod inline;

use std::fmt;

pub use foreground::{foreground_channel, on_foreground, ForegroundDispatcher, ForegroundLoop};
pub use inline::InlineDispatcher;

/// A unit of work for the foreground context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that accepts jobs for serialized execution.
pub trait Dispatcher: Send + Sync + fmt::Debug {
    /// Submit `job`. Jobs submitted from one thread run in submission order.
    fn submit(&self, job: Job);
}
