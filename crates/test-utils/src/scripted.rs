use std::sync::mpsc;
use std::time::Duration;

use anyhow::bail;
use oprun::progress::ProgressReporter;
use oprun::runner::Operation;

const GATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Point inside a [`ScriptedOperation`] where the worker stops until the test
/// lets it continue.
#[derive(Debug)]
pub struct Gate {
    reached: mpsc::Sender<()>,
    resume: mpsc::Receiver<()>,
}

/// Test-side end of a [`Gate`].
#[derive(Debug)]
pub struct GateHandle {
    reached: mpsc::Receiver<()>,
    resume: mpsc::Sender<()>,
}

/// Create a connected gate pair.
pub fn gate() -> (Gate, GateHandle) {
    let (reached_tx, reached_rx) = mpsc::channel();
    let (resume_tx, resume_rx) = mpsc::channel();
    (
        Gate {
            reached: reached_tx,
            resume: resume_rx,
        },
        GateHandle {
            reached: reached_rx,
            resume: resume_tx,
        },
    )
}

impl Gate {
    fn pass(&self) {
        let _ = self.reached.send(());
        // A dropped handle (failing test) releases the worker.
        let _ = self.resume.recv_timeout(GATE_TIMEOUT);
    }
}

impl GateHandle {
    /// Block until the worker is parked at the gate.
    pub fn wait_reached(&self) {
        self.reached
            .recv_timeout(GATE_TIMEOUT)
            .expect("operation never reached the gate");
    }

    pub fn resume(&self) {
        let _ = self.resume.send(());
    }

    /// `wait_reached` followed by `resume`.
    pub fn pass_through(&self) {
        self.wait_reached();
        self.resume();
    }
}

/// One scripted action.
#[derive(Debug)]
pub enum Step {
    Message(String),
    SubMessage(String),
    Pause(Gate),
    Fail(String),
    Panic(String),
}

/// Operation that plays back a list of steps, then returns its result.
#[derive(Debug)]
pub struct ScriptedOperation<T> {
    name: String,
    steps: Vec<Step>,
    result: Option<T>,
}

impl<T: Send + 'static> ScriptedOperation<T> {
    pub fn new(name: &str, result: T) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
            result: Some(result),
        }
    }

    pub fn message(mut self, text: &str) -> Self {
        self.steps.push(Step::Message(text.to_string()));
        self
    }

    pub fn submessage(mut self, text: &str) -> Self {
        self.steps.push(Step::SubMessage(text.to_string()));
        self
    }

    pub fn pause(mut self, gate: Gate) -> Self {
        self.steps.push(Step::Pause(gate));
        self
    }

    pub fn fail(mut self, reason: &str) -> Self {
        self.steps.push(Step::Fail(reason.to_string()));
        self
    }

    pub fn panic(mut self, reason: &str) -> Self {
        self.steps.push(Step::Panic(reason.to_string()));
        self
    }
}

impl<T: Send + 'static> Operation for ScriptedOperation<T> {
    type Output = T;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&mut self, progress: &ProgressReporter) -> anyhow::Result<T> {
        for step in self.steps.drain(..) {
            match step {
                Step::Message(text) => progress.update_message(text),
                Step::SubMessage(text) => progress.update_submessage(text),
                Step::Pause(gate) => gate.pass(),
                Step::Fail(reason) => bail!("{reason}"),
                Step::Panic(reason) => panic!("{reason}"),
            }
        }
        match self.result.take() {
            Some(result) => Ok(result),
            None => bail!("scripted operation '{}' ran twice", self.name),
        }
    }
}

/// An operation blocked on a gate, plus the handle that releases it.
pub fn parked(name: &str) -> (ScriptedOperation<()>, GateHandle) {
    let (g, handle) = gate();
    (ScriptedOperation::new(name, ()).pause(g), handle)
}
