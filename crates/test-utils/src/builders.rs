#![allow(dead_code)]

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use oprun::config::RunnerConfig;
use oprun::dispatch::{foreground_channel, Dispatcher, ForegroundDispatcher, InlineDispatcher};
use oprun::runner::{Registry, RunnerContext};

use crate::recording::{EventLog, RecordingIndicatorFactory};

/// Builder for a `RunnerContext` isolated from the process-wide registry.
///
/// Tests run in parallel inside one process, so every test gets its own
/// registry unless it asks for the global one explicitly.
pub struct ContextBuilder {
    registry: Arc<Registry>,
    dispatcher: Arc<dyn Dispatcher>,
    config: RunnerConfig,
    log: EventLog,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            dispatcher: Arc::new(InlineDispatcher),
            config: RunnerConfig::default(),
            log: EventLog::new(),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config.title = title.to_string();
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    /// Build the context; the returned log records every indicator event.
    pub fn build(self) -> (RunnerContext, EventLog) {
        let ctx = RunnerContext::new(Arc::new(RecordingIndicatorFactory::new(self.log.clone())))
            .with_registry(self.registry)
            .with_dispatcher(self.dispatcher)
            .with_config(self.config);
        (ctx, self.log)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A foreground loop running on its own thread.
pub struct ForegroundThread {
    dispatcher: Arc<ForegroundDispatcher>,
    handle: JoinHandle<usize>,
}

impl ForegroundThread {
    pub fn spawn() -> Self {
        let (dispatcher, foreground) = foreground_channel();
        let handle = thread::Builder::new()
            .name("test-foreground".to_string())
            .spawn(move || foreground.run_blocking())
            .expect("spawning foreground thread");
        Self {
            dispatcher: Arc::new(dispatcher),
            handle,
        }
    }

    pub fn dispatcher(&self) -> Arc<dyn Dispatcher> {
        Arc::clone(&self.dispatcher) as Arc<dyn Dispatcher>
    }

    /// Run `f` on the foreground thread and wait for its result.
    pub fn run_on<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = std::sync::mpsc::channel();
        self.dispatcher.submit(Box::new(move || {
            let _ = tx.send(f());
        }));
        rx.recv().expect("foreground job did not report back")
    }

    /// Process everything queued so far, stop the loop and return the number
    /// of jobs it ran.
    pub fn stop(self) -> usize {
        self.dispatcher.shutdown();
        self.handle.join().expect("foreground thread panicked")
    }
}
