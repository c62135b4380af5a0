// src/progress/state.rs

use crate::config::RunnerConfig;

/// Latest progress text of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    message: String,
    submessage: String,
}

impl ProgressState {
    pub fn new(message: impl Into<String>, submessage: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            submessage: submessage.into(),
        }
    }

    /// State shown before the operation has reported anything.
    pub fn initial(config: &RunnerConfig) -> Self {
        Self::new(&config.initial_message, &config.initial_submessage)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn submessage(&self) -> &str {
        &self.submessage
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn set_submessage(&mut self, submessage: impl Into<String>) {
        self.submessage = submessage.into();
    }
}
