// src/surface/indicator.rs

use std::sync::Arc;

use super::Surface;

/// A visual progress indicator.
///
/// Only ever called on the foreground dispatch context. Rendering is entirely
/// up to the implementation.
pub trait ProgressIndicator: Send {
    fn set_title(&mut self, title: &str);
    fn set_message(&mut self, message: &str);
    fn set_submessage(&mut self, submessage: &str);
    fn show(&mut self);
    fn dismiss(&mut self);
}

/// Creates indicators bound to a surface.
pub trait IndicatorFactory: Send + Sync {
    fn create(&self, surface: &Arc<dyn Surface>) -> Box<dyn ProgressIndicator>;
}

/// Indicator that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HiddenIndicator;

impl ProgressIndicator for HiddenIndicator {
    fn set_title(&mut self, _title: &str) {}
    fn set_message(&mut self, _message: &str) {}
    fn set_submessage(&mut self, _submessage: &str) {}
    fn show(&mut self) {}
    fn dismiss(&mut self) {}
}
