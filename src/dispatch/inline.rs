// src/dispatch/inline.rs

use super::{Dispatcher, Job};

/// Runs every job immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn submit(&self, job: Job) {
        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn runs_jobs_before_returning() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = InlineDispatcher;

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            dispatcher.submit(Box::new(move || seen.lock().unwrap().push(i)));
        }

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }
}
