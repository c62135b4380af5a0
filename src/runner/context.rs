// src/runner/context.rs

use std::fmt;
use std::sync::Arc;

use crate::config::RunnerConfig;
use crate::dispatch::{Dispatcher, InlineDispatcher};
use crate::surface::IndicatorFactory;

use super::registry::Registry;

/// Everything a runner needs from its host application.
///
/// Defaults to the global registry, an [`InlineDispatcher`] (no foreground
/// loop) and the default [`RunnerConfig`]. Interactive hosts swap in a
/// [`ForegroundDispatcher`](crate::dispatch::ForegroundDispatcher).
#[derive(Clone)]
pub struct RunnerContext {
    registry: Arc<Registry>,
    dispatcher: Arc<dyn Dispatcher>,
    indicators: Arc<dyn IndicatorFactory>,
    config: Arc<RunnerConfig>,
}

impl fmt::Debug for RunnerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerContext")
            .field("registry", &self.registry)
            .field("dispatcher", &self.dispatcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RunnerContext {
    pub fn new(indicators: Arc<dyn IndicatorFactory>) -> Self {
        Self {
            registry: Registry::global(),
            dispatcher: Arc::new(InlineDispatcher),
            indicators,
            config: Arc::new(RunnerConfig::default()),
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

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    pub fn indicators(&self) -> &Arc<dyn IndicatorFactory> {
        &self.indicators
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}
