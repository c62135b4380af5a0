// tests/config_loading.rs

mod common;
use crate::common::{init_tracing, ContextBuilder, TestResult};

use std::io::Write;

use tempfile::NamedTempFile;

use oprun::config::{load_and_validate, load_from_path};
use oprun::errors::OprunError;
use oprun::progress::{ProgressReporter, ProgressState};
use oprun::runner::{operation_fn, OperationRunner, RunnerContext};
use oprun::types::StartPolicy;
use oprun_test_utils::recording::{surface, Event};

#[test]
fn runner_section_is_loaded_from_disk() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[runner]
title = "Importing photos"
initial_message = "Scanning library"
initial_submessage = "0 files"
worker_thread_name = "importer"
"#
    )?;

    let cfg = load_and_validate(file.path())?;
    let runner = cfg.runner();
    assert_eq!(runner.title, "Importing photos");
    assert_eq!(runner.initial_message, "Scanning library");
    assert_eq!(runner.initial_submessage, "0 files");
    assert_eq!(runner.worker_thread_name, "importer");
    Ok(())
}

#[test]
fn invalid_values_are_config_errors() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[runner]
title = ""
"#
    )?;

    // Raw loading only parses; validation is what rejects it.
    assert!(load_from_path(file.path()).is_ok());
    match load_and_validate(file.path()) {
        Err(OprunError::ConfigError(msg)) => assert!(msg.contains("title")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_and_validate(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, OprunError::IoError(_)), "got {err:?}");
}

#[test]
fn loaded_config_drives_indicator_and_worker() -> TestResult {
    init_tracing();
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[runner]
title = "Exporting"
initial_message = "Preparing"
worker_thread_name = "exporter"
"#
    )?;
    let runner_cfg = load_and_validate(file.path())?.into_runner();

    let (base, log) = ContextBuilder::new().build();
    let ctx: RunnerContext = base.with_config(runner_cfg);
    let s1 = surface(1);

    let (tx, rx) = std::sync::mpsc::channel();
    let op = operation_fn("export", move |_progress: &ProgressReporter| {
        let _ = tx.send(std::thread::current().name().map(str::to_string));
        Ok(())
    });
    let mut runner = OperationRunner::new(&ctx, op).with_surface(&s1);
    assert_eq!(runner.progress(), ProgressState::new("Preparing", ""));
    runner.start(StartPolicy::Exclusive)?;
    runner.await_completion()?;

    assert_eq!(rx.recv()?.as_deref(), Some("exporter"));
    assert!(log.snapshot().contains(&Event::Title {
        indicator: 1,
        text: "Exporting".to_string()
    }));
    assert_eq!(log.messages(1), vec!["Preparing".to_string()]);
    assert!(ctx.registry().is_idle());
    Ok(())
}
