// src/runner/completion.rs

//! Completion sequence run once per operation.
//!
//! The worker's last act is to hand a [`Completion`] to the dispatcher. On
//! the foreground context (or inline) it then runs, strictly in this order:
//!
//! 1. the caller's completion handler, with the outcome unchanged;
//! 2. final teardown of the surface binding (dismisses the indicator);
//! 3. release of the registry slot, if it still belongs to this run;
//! 4. the phase moves to `Done`.
//!
//! A panicking handler is logged and does not skip steps 2-4.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::types::RunPhase;

use super::core::RunnerCore;
use super::operation::{CompletionHandler, Outcome};
use super::registry::Registry;

pub(crate) struct Completion<T> {
    pub(crate) core: Arc<RunnerCore>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) handler: Option<CompletionHandler<T>>,
    pub(crate) outcome: Outcome<T>,
}

impl<T: Send + 'static> Completion<T> {
    pub(crate) fn finish(self) {
        let Completion {
            core,
            registry,
            handler,
            outcome,
        } = self;
        let run_id = core.id();
        let succeeded = outcome.is_ok();

        match handler {
            Some(handler) => {
                if panic::catch_unwind(AssertUnwindSafe(move || handler(outcome))).is_err() {
                    error!(%run_id, "completion handler panicked; continuing teardown");
                }
            }
            None => match &outcome {
                Ok(_) => info!(%run_id, "operation succeeded (no completion handler)"),
                Err(err) => warn!(%run_id, error = %err, "operation failed (no completion handler)"),
            },
        }

        let dismissed = core.binding().teardown_final();
        let released = registry.clear(&core);
        core.set_phase(RunPhase::Done);

        info!(
            %run_id,
            operation = core.operation_name(),
            succeeded,
            dismissed,
            released,
            "run finished"
        );
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_messages_are_extracted() {
        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(&*payload), "static");

        let payload = panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_message(&*payload), "formatted 7");

        let payload = panic::catch_unwind(|| std::panic::panic_any(5u8)).unwrap_err();
        assert_eq!(panic_message(&*payload), "non-string panic payload");
    }
}
