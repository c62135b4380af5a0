// tests/completion.rs

mod common;
use crate::common::{
    init_tracing, parked, surface, wait_until, ContextBuilder, Event, ForegroundThread,
    ScriptedOperation, TestResult, TIMEOUT,
};

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use oprun::dispatch::on_foreground;
use oprun::errors::{OperationError, OprunError};
use oprun::progress::ProgressReporter;
use oprun::runner::{operation_fn, OperationRunner};
use oprun::types::{RunPhase, StartPolicy, SurfaceId};

#[test]
fn handler_runs_before_teardown_and_registry_release() -> TestResult {
    init_tracing();
    let (ctx, log) = ContextBuilder::new().build();
    let s1 = surface(1);

    let registry = Arc::clone(ctx.registry());
    let seen_active = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&seen_active);
    let handler_log = log.clone();

    let op = ScriptedOperation::new("ordered", "ok").message("almost");
    let mut runner = OperationRunner::new(&ctx, op)
        .with_surface(&s1)
        .on_complete(move |outcome| {
            *seen.lock().unwrap() = Some(!registry.is_idle());
            handler_log.note(format!("handler {:?}", outcome.ok()));
        });
    runner.start(StartPolicy::Exclusive)?;
    runner.await_completion()?;

    // While the handler ran, the run still owned the slot.
    assert_eq!(*seen_active.lock().unwrap(), Some(true));

    let ind = log.indicator_for(SurfaceId::new(1)).expect("indicator");
    let handler_at = log.position(&Event::Note("handler Some(\"ok\")".to_string()));
    let dismissed_at = log.position(&Event::Dismissed { indicator: ind });
    assert!(handler_at.is_some());
    assert!(handler_at < dismissed_at);
    assert!(ctx.registry().is_idle());
    assert_eq!(runner.phase(), RunPhase::Done);
    Ok(())
}

#[test]
fn operation_error_reaches_handler_unchanged() -> TestResult {
    init_tracing();
    let (ctx, log) = ContextBuilder::new().build();
    let s1 = surface(1);

    let (tx, rx) = mpsc::channel();
    let op = ScriptedOperation::new("doomed", 0u32)
        .message("writing")
        .fail("disk full");
    let mut runner = OperationRunner::new(&ctx, op)
        .with_surface(&s1)
        .on_complete(move |outcome| {
            let _ = tx.send(outcome);
        });
    runner.start(StartPolicy::Exclusive)?;
    runner.await_completion()?;

    match rx.recv_timeout(TIMEOUT)? {
        Err(OperationError::Failed(err)) => assert_eq!(err.to_string(), "disk full"),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(log.dismiss_count(1), 1);
    assert!(ctx.registry().is_idle());
    Ok(())
}

#[test]
fn operation_panic_is_reported_as_outcome() -> TestResult {
    init_tracing();
    let (ctx, log) = ContextBuilder::new().build();
    let s1 = surface(1);

    let (tx, rx) = mpsc::channel();
    let op = ScriptedOperation::new("crashy", ()).panic("kaboom");
    let mut runner = OperationRunner::new(&ctx, op)
        .with_surface(&s1)
        .on_complete(move |outcome| {
            let _ = tx.send(outcome);
        });
    runner.start(StartPolicy::Exclusive)?;
    runner.await_completion()?;

    let outcome = rx.recv_timeout(TIMEOUT)?;
    let err = outcome.expect_err("panic must not look like success");
    assert!(err.is_panic());
    assert!(matches!(&err, OperationError::Panicked(msg) if msg == "kaboom"));
    assert_eq!(log.dismiss_count(1), 1);
    assert!(ctx.registry().is_idle());
    Ok(())
}

#[test]
fn runs_without_handler_still_tear_down() -> TestResult {
    init_tracing();
    let (ctx, log) = ContextBuilder::new().build();
    let s1 = surface(1);

    let mut ok = OperationRunner::new(&ctx, ScriptedOperation::new("quiet", 5i64)).with_surface(&s1);
    ok.start(StartPolicy::Exclusive)?;
    ok.await_completion()?;
    assert!(ctx.registry().is_idle());

    let failing = operation_fn("quiet-fail", |_progress: &ProgressReporter| -> anyhow::Result<()> {
        anyhow::bail!("nope")
    });
    let mut failed = OperationRunner::new(&ctx, failing).with_surface(&s1);
    failed.start(StartPolicy::Exclusive)?;
    failed.await_completion()?;
    assert!(ctx.registry().is_idle());

    assert_eq!(log.created().len(), 2);
    assert!(log.live_indicators().is_empty());
    Ok(())
}

#[test]
fn panicking_handler_does_not_skip_teardown() -> TestResult {
    init_tracing();
    let (ctx, log) = ContextBuilder::new().build();
    let s1 = surface(1);

    let mut runner = OperationRunner::new(&ctx, ScriptedOperation::new("rude", ()))
        .with_surface(&s1)
        .on_complete(|_| panic!("handler blew up"));
    runner.start(StartPolicy::Exclusive)?;
    runner.await_completion()?;

    assert_eq!(log.dismiss_count(1), 1);
    assert!(ctx.registry().is_idle());
    assert_eq!(runner.phase(), RunPhase::Done);
    Ok(())
}

#[test]
fn await_completion_is_idempotent() -> TestResult {
    init_tracing();
    let (ctx, _log) = ContextBuilder::new().build();

    let never_started = OperationRunner::new(&ctx, ScriptedOperation::new("idle", ()));
    never_started.await_completion()?;

    let mut runner = OperationRunner::new(&ctx, ScriptedOperation::new("twice", ()));
    runner.start(StartPolicy::Exclusive)?;
    runner.await_completion()?;
    runner.await_completion()?;
    assert!(runner.is_finished());
    Ok(())
}

#[test]
fn concurrent_waiters_all_return_after_the_worker() -> TestResult {
    init_tracing();
    let (ctx, _log) = ContextBuilder::new().build();

    let (op, gate) = parked("shared");
    let mut runner = OperationRunner::new(&ctx, op);
    runner.start(StartPolicy::Exclusive)?;
    gate.wait_reached();

    let runner = Arc::new(Mutex::new(runner));
    let (done_tx, done_rx) = mpsc::channel();
    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let runner = Arc::clone(&runner);
            let done_tx = done_tx.clone();
            std::thread::spawn(move || {
                let result = runner.lock().unwrap().await_completion();
                let _ = done_tx.send(result.is_ok());
            })
        })
        .collect();

    gate.resume();
    for waiter in waiters {
        waiter.join().expect("waiter panicked");
    }
    let results: Vec<bool> = done_rx.try_iter().collect();
    assert_eq!(results, vec![true, true, true]);
    assert!(ctx.registry().is_idle());
    Ok(())
}

#[test]
fn await_from_foreground_job_is_refused() -> TestResult {
    init_tracing();
    let fg = ForegroundThread::spawn();
    let (ctx, _log) = ContextBuilder::new().with_dispatcher(fg.dispatcher()).build();

    let (op, gate) = parked("blocking");
    let mut runner = OperationRunner::new(&ctx, op);
    runner.start(StartPolicy::Exclusive)?;
    gate.wait_reached();

    let (runner, refused) = fg.run_on(move || {
        let refused = matches!(runner.await_completion(), Err(OprunError::AwaitOnForeground));
        (runner, refused)
    });
    assert!(refused);
    assert!(!on_foreground());

    gate.resume();
    runner.await_completion()?;
    fg.stop();
    assert!(ctx.registry().is_idle());
    Ok(())
}

#[test]
fn completion_runs_on_the_foreground_thread() -> TestResult {
    init_tracing();
    let fg = ForegroundThread::spawn();
    let (ctx, log) = ContextBuilder::new().with_dispatcher(fg.dispatcher()).build();
    let s1 = surface(1);

    let (tx, rx) = mpsc::channel();
    let op = ScriptedOperation::new("fg", 7u16).message("one").message("two");
    let mut runner = OperationRunner::new(&ctx, op)
        .with_surface(&s1)
        .on_complete(move |outcome| {
            let thread = std::thread::current().name().map(str::to_string);
            let _ = tx.send((on_foreground(), thread, outcome.ok()));
        });
    runner.start(StartPolicy::Exclusive)?;
    runner.await_completion()?;

    let (foreground, thread, value) = rx.recv_timeout(TIMEOUT)?;
    assert!(foreground);
    assert_eq!(thread.as_deref(), Some("test-foreground"));
    assert_eq!(value, Some(7));

    fg.stop();
    assert!(ctx.registry().is_idle());
    assert_eq!(log.last_message(1).as_deref(), Some("two"));
    assert_eq!(log.dismiss_count(1), 1);
    Ok(())
}

#[test]
fn completion_after_loop_stopped_still_releases_slot() -> TestResult {
    init_tracing();
    let fg = ForegroundThread::spawn();
    let (ctx, _log) = ContextBuilder::new().with_dispatcher(fg.dispatcher()).build();

    let (op, gate) = parked("outlives-ui");
    let (tx, rx) = mpsc::channel();
    let mut runner = OperationRunner::new(&ctx, op).on_complete(move |outcome| {
        let _ = tx.send(outcome.is_ok());
    });
    runner.start(StartPolicy::Exclusive)?;
    gate.wait_reached();

    // The UI side goes away before the operation finishes.
    fg.stop();
    gate.resume();
    runner.await_completion()?;

    assert!(rx.recv_timeout(TIMEOUT)?);
    assert!(wait_until(|| ctx.registry().is_idle()));
    Ok(())
}
