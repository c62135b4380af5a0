// src/dispatch/foreground.rs

//! Queued foreground dispatch.
//!
//! [`foreground_channel`] returns a connected pair:
//!
//! - a cloneable [`ForegroundDispatcher`] handed to runners (and to anything
//!   else that needs to post work to the UI side), and
//! - the [`ForegroundLoop`] that owns the receiving end and executes jobs.
//!
//! The loop can be driven asynchronously on a Tokio task ([`ForegroundLoop::run`]),
//! on a dedicated thread ([`ForegroundLoop::run_blocking`]), or step by step
//! from a host event loop ([`ForegroundLoop::run_pending`]).

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{Dispatcher, Job};

thread_local! {
    static IN_FOREGROUND_JOB: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is executing a foreground-loop job right now.
///
/// Blocking waits on the worker must not happen while this is true: the
/// completion sequence they would wait behind is queued on this very loop.
pub fn on_foreground() -> bool {
    IN_FOREGROUND_JOB.with(Cell::get)
}

enum ForegroundMessage {
    Run(Job),
    Shutdown,
}

/// Create a dispatcher and the loop that serves it.
pub fn foreground_channel() -> (ForegroundDispatcher, ForegroundLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ForegroundDispatcher { tx },
        ForegroundLoop {
            rx,
            executed: 0,
            stopped: false,
        },
    )
}

/// Sending half of the foreground loop.
#[derive(Debug, Clone)]
pub struct ForegroundDispatcher {
    tx: mpsc::UnboundedSender<ForegroundMessage>,
}

impl ForegroundDispatcher {
    /// Ask the loop to stop once every job queued before this call has run.
    pub fn shutdown(&self) {
        if self.tx.send(ForegroundMessage::Shutdown).is_err() {
            debug!("foreground loop already stopped; shutdown request ignored");
        }
    }

    /// Whether the loop side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Dispatcher for ForegroundDispatcher {
    fn submit(&self, job: Job) {
        if let Err(mpsc::error::SendError(message)) = self.tx.send(ForegroundMessage::Run(job)) {
            // The loop is gone (UI torn down). Running the job here still lets
            // a completion sequence release the registry slot.
            warn!("foreground loop has stopped; running job inline");
            if let ForegroundMessage::Run(job) = message {
                run_job(job);
            }
        }
    }
}

/// Receiving half: executes queued jobs one at a time, in arrival order.
pub struct ForegroundLoop {
    rx: mpsc::UnboundedReceiver<ForegroundMessage>,
    executed: usize,
    stopped: bool,
}

impl std::fmt::Debug for ForegroundLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForegroundLoop")
            .field("executed", &self.executed)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl ForegroundLoop {
    /// Run until `shutdown` is requested or every dispatcher is dropped.
    ///
    /// Returns the number of jobs executed over the loop's lifetime.
    pub async fn run(mut self) -> usize {
        info!("foreground loop started");

        while !self.stopped {
            match self.rx.recv().await {
                Some(message) => self.handle(message),
                None => {
                    info!("all foreground dispatchers dropped; exiting");
                    break;
                }
            }
        }

        info!(jobs = self.executed, "foreground loop finished");
        self.executed
    }

    /// Blocking flavour of [`run`](Self::run) for a dedicated thread.
    ///
    /// Must not be called from inside an async runtime.
    pub fn run_blocking(mut self) -> usize {
        info!("foreground loop started (blocking)");

        while !self.stopped {
            match self.rx.blocking_recv() {
                Some(message) => self.handle(message),
                None => {
                    info!("all foreground dispatchers dropped; exiting");
                    break;
                }
            }
        }

        info!(jobs = self.executed, "foreground loop finished");
        self.executed
    }

    /// Execute every job queued right now and return how many ran.
    ///
    /// For hosts that own their event loop and pump this one from it.
    pub fn run_pending(&mut self) -> usize {
        let before = self.executed;
        while !self.stopped {
            match self.rx.try_recv() {
                Ok(message) => self.handle(message),
                Err(_) => break,
            }
        }
        self.executed - before
    }

    /// Whether a shutdown request has been processed.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn handle(&mut self, message: ForegroundMessage) {
        match message {
            ForegroundMessage::Run(job) => {
                run_job(job);
                self.executed += 1;
            }
            ForegroundMessage::Shutdown => {
                info!("foreground loop shutdown requested");
                self.stopped = true;
                self.rx.close();

                // Jobs that raced the shutdown still run; nothing new can
                // arrive once the channel is closed.
                while let Ok(message) = self.rx.try_recv() {
                    if let ForegroundMessage::Run(job) = message {
                        run_job(job);
                        self.executed += 1;
                    }
                }
            }
        }
    }
}

fn run_job(job: Job) {
    let was_foreground = IN_FOREGROUND_JOB.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(job));
    IN_FOREGROUND_JOB.with(|flag| flag.set(was_foreground));

    if result.is_err() {
        error!("foreground job panicked; loop keeps running");
    }
}
