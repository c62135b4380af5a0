// tests/common/mod.rs
#![allow(dead_code, unused_imports)]

use std::thread;
use std::time::{Duration, Instant};

pub use oprun_test_utils::builders::{ContextBuilder, ForegroundThread};
pub use oprun_test_utils::init_tracing;
pub use oprun_test_utils::recording::{surface, Event, EventLog};
pub use oprun_test_utils::scripted::{gate, parked, GateHandle, ScriptedOperation};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Poll `cond` until it holds or `TIMEOUT` passes.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}
