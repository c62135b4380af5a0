// src/surface/mod.rs

//! Foreground surfaces and the progress indicators shown on them.
//!
//! - [`Surface`] is the external, replaceable "where progress is shown"
//!   handle. The runner only ever keeps weak references to it.
//! - [`indicator`] defines the indicator collaborator the host application
//!   implements (dialog, status bar, terminal line, ...).
//! - [`binding`] ties one runner to its current surface and owns the live
//!   indicator.

pub mod binding;
pub mod indicator;

use std::sync::Arc;

use crate::types::SurfaceId;

pub use binding::SurfaceBinding;
pub use indicator::{IndicatorFactory, ProgressIndicator};

/// A place where progress can be displayed.
pub trait Surface: Send + Sync {
    /// Identity used to match detach notifications against the bound surface.
    fn id(&self) -> SurfaceId;
}

/// Factory used when no indicator should ever be created.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NoIndicators;

impl IndicatorFactory for NoIndicators {
    fn create(&self, _surface: &Arc<dyn Surface>) -> Box<dyn ProgressIndicator> {
        Box::new(indicator::HiddenIndicator)
    }
}
