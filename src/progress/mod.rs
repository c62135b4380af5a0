// src/progress/mod.rs

//! Progress reporting from the worker thread.
//!
//! - [`state`] holds the latest message/submessage pair.
//! - [`reporter`] is the handle operations use to update it; updates are
//!   stored first and rendered through the foreground dispatcher second, so a
//!   surface attached later is always seeded with the newest state.

pub mod reporter;
pub mod state;

pub use reporter::ProgressReporter;
pub use state::ProgressState;
