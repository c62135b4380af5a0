// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, RunnerConfig};
use crate::errors::{OprunError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = OprunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_runner(&raw.runner)?;
        Ok(ConfigFile::new_unchecked(raw.runner))
    }
}

fn validate_runner(cfg: &RunnerConfig) -> Result<()> {
    if cfg.title.trim().is_empty() {
        return Err(OprunError::ConfigError(
            "[runner].title must not be empty".to_string(),
        ));
    }

    // std::thread::Builder panics on spawn for names with interior NULs.
    if cfg.worker_thread_name.is_empty() || cfg.worker_thread_name.contains('\0') {
        return Err(OprunError::ConfigError(format!(
            "[runner].worker_thread_name must be non-empty and free of NUL bytes (got {:?})",
            cfg.worker_thread_name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with(runner: RunnerConfig) -> RawConfigFile {
        RawConfigFile { runner }
    }

    #[test]
    fn blank_title_is_rejected() {
        let runner = RunnerConfig {
            title: "   ".to_string(),
            ..RunnerConfig::default()
        };
        match ConfigFile::try_from(raw_with(runner)) {
            Err(OprunError::ConfigError(msg)) => assert!(msg.contains("title")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn nul_in_thread_name_is_rejected() {
        let runner = RunnerConfig {
            worker_thread_name: "bad\0name".to_string(),
            ..RunnerConfig::default()
        };
        match ConfigFile::try_from(raw_with(runner)) {
            Err(OprunError::ConfigError(msg)) => assert!(msg.contains("worker_thread_name")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.runner(), &RunnerConfig::default());
    }
}
