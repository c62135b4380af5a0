// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration file as read from TOML.
///
/// ```toml
/// [runner]
/// title = "Please wait"
/// initial_message = "Initializing..."
/// initial_submessage = ""
/// worker_thread_name = "oprun-worker"
/// ```
///
/// Every field is optional. Use `ConfigFile::try_from` (or the loader
/// functions) to obtain a validated [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Validated configuration.
///
/// Can only be built through `TryFrom<RawConfigFile>`, so holding one means
/// the runner section passed validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    runner: RunnerConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(runner: RunnerConfig) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &RunnerConfig {
        &self.runner
    }

    pub fn into_runner(self) -> RunnerConfig {
        self.runner
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Title put on every progress indicator.
    #[serde(default = "default_title")]
    pub title: String,

    /// Message shown before the operation reports anything.
    #[serde(default = "default_initial_message")]
    pub initial_message: String,

    /// Submessage shown before the operation reports anything.
    #[serde(default)]
    pub initial_submessage: String,

    /// Name given to worker threads (shows up in debuggers and panics).
    #[serde(default = "default_worker_thread_name")]
    pub worker_thread_name: String,
}

fn default_title() -> String {
    "Please wait".to_string()
}

fn default_initial_message() -> String {
    "Initializing...".to_string()
}

fn default_worker_thread_name() -> String {
    "oprun-worker".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            initial_message: default_initial_message(),
            initial_submessage: String::new(),
            worker_thread_name: default_worker_thread_name(),
        }
    }
}
