// src/demo.rs

//! Console surface, indicator and operation used by the `oprun` binary.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::bail;

use crate::progress::ProgressReporter;
use crate::runner::Operation;
use crate::surface::{IndicatorFactory, ProgressIndicator, Surface};
use crate::types::SurfaceId;

/// A "window" in the terminal. Recreating it mimics a UI being rebuilt.
#[derive(Debug)]
pub struct ConsoleSurface {
    id: SurfaceId,
}

impl ConsoleSurface {
    pub fn new(raw_id: u64) -> Self {
        Self {
            id: SurfaceId::new(raw_id),
        }
    }
}

impl Surface for ConsoleSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }
}

/// Prints indicator changes as lines on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleIndicatorFactory;

impl IndicatorFactory for ConsoleIndicatorFactory {
    fn create(&self, surface: &Arc<dyn Surface>) -> Box<dyn ProgressIndicator> {
        Box::new(ConsoleIndicator {
            surface: surface.id(),
            title: String::new(),
            message: String::new(),
            submessage: String::new(),
            visible: false,
        })
    }
}

#[derive(Debug)]
struct ConsoleIndicator {
    surface: SurfaceId,
    title: String,
    message: String,
    submessage: String,
    visible: bool,
}

impl ConsoleIndicator {
    fn redraw(&self) {
        if !self.visible {
            return;
        }
        if self.submessage.is_empty() {
            println!("[{}] {}: {}", self.surface, self.title, self.message);
        } else {
            println!(
                "[{}] {}: {} ({})",
                self.surface, self.title, self.message, self.submessage
            );
        }
    }
}

impl ProgressIndicator for ConsoleIndicator {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
        self.redraw();
    }

    fn set_submessage(&mut self, submessage: &str) {
        self.submessage = submessage.to_string();
        self.redraw();
    }

    fn show(&mut self) {
        self.visible = true;
        println!("[{}] indicator shown", self.surface);
        self.redraw();
    }

    fn dismiss(&mut self) {
        if self.visible {
            println!("[{}] indicator dismissed", self.surface);
        }
        self.visible = false;
    }
}

/// Counts through a number of steps, sleeping on each.
#[derive(Debug, Clone)]
pub struct CountdownOperation {
    steps: u32,
    step_delay: Duration,
    fail_at: Option<u32>,
}

impl CountdownOperation {
    pub fn new(steps: u32, step_delay: Duration, fail_at: Option<u32>) -> Self {
        Self {
            steps,
            step_delay,
            fail_at,
        }
    }
}

impl Operation for CountdownOperation {
    type Output = u32;

    fn name(&self) -> String {
        "countdown".to_string()
    }

    fn run(&mut self, progress: &ProgressReporter) -> anyhow::Result<u32> {
        for step in 1..=self.steps {
            progress.update_message(format!("Step {step}/{}", self.steps));
            progress.update_submessage(format!("{}% done", step * 100 / self.steps));

            if self.fail_at == Some(step) {
                bail!("simulated failure at step {step}");
            }
            thread::sleep(self.step_delay);
        }
        Ok(self.steps)
    }
}
