use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use oprun::surface::{IndicatorFactory, ProgressIndicator, Surface};
use oprun::types::SurfaceId;

/// One observable thing that happened to an indicator (or a test note).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created { indicator: usize, surface: SurfaceId },
    Title { indicator: usize, text: String },
    Message { indicator: usize, text: String },
    SubMessage { indicator: usize, text: String },
    Shown { indicator: usize },
    Dismissed { indicator: usize },
    /// Free-form marker pushed by tests (e.g. from a completion handler) so
    /// its position relative to indicator events can be asserted.
    Note(String),
}

/// Shared, ordered log of [`Event`]s.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn note(&self, text: impl Into<String>) {
        self.push(Event::Note(text.into()));
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Indicators created so far, as `(indicator, surface)`.
    pub fn created(&self) -> Vec<(usize, SurfaceId)> {
        self.snapshot()
            .into_iter()
            .filter_map(|e| match e {
                Event::Created { indicator, surface } => Some((indicator, surface)),
                _ => None,
            })
            .collect()
    }

    /// Indicator most recently created for `surface`.
    pub fn indicator_for(&self, surface: SurfaceId) -> Option<usize> {
        self.created()
            .into_iter()
            .rev()
            .find(|(_, s)| *s == surface)
            .map(|(i, _)| i)
    }

    /// Every message set on `indicator`, in order (seed included).
    pub fn messages(&self, indicator: usize) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter_map(|e| match e {
                Event::Message { indicator: i, text } if i == indicator => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn submessages(&self, indicator: usize) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter_map(|e| match e {
                Event::SubMessage { indicator: i, text } if i == indicator => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_message(&self, indicator: usize) -> Option<String> {
        self.messages(indicator).pop()
    }

    pub fn dismiss_count(&self, indicator: usize) -> usize {
        self.snapshot()
            .iter()
            .filter(|e| matches!(e, Event::Dismissed { indicator: i } if *i == indicator))
            .count()
    }

    /// Indicators created and not yet dismissed.
    pub fn live_indicators(&self) -> Vec<usize> {
        self.created()
            .into_iter()
            .map(|(i, _)| i)
            .filter(|i| self.dismiss_count(*i) == 0)
            .collect()
    }

    /// Position of the first event equal to `event`.
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.snapshot().iter().position(|e| e == event)
    }
}

/// Indicator factory that records everything into an [`EventLog`].
///
/// Indicators are numbered from 1 in creation order.
#[derive(Debug)]
pub struct RecordingIndicatorFactory {
    log: EventLog,
    next: AtomicUsize,
}

impl RecordingIndicatorFactory {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            next: AtomicUsize::new(1),
        }
    }
}

impl IndicatorFactory for RecordingIndicatorFactory {
    fn create(&self, surface: &Arc<dyn Surface>) -> Box<dyn ProgressIndicator> {
        let indicator = self.next.fetch_add(1, Ordering::SeqCst);
        self.log.push(Event::Created {
            indicator,
            surface: surface.id(),
        });
        Box::new(RecordingIndicator {
            indicator,
            log: self.log.clone(),
        })
    }
}

struct RecordingIndicator {
    indicator: usize,
    log: EventLog,
}

impl ProgressIndicator for RecordingIndicator {
    fn set_title(&mut self, title: &str) {
        self.log.push(Event::Title {
            indicator: self.indicator,
            text: title.to_string(),
        });
    }

    fn set_message(&mut self, message: &str) {
        self.log.push(Event::Message {
            indicator: self.indicator,
            text: message.to_string(),
        });
    }

    fn set_submessage(&mut self, submessage: &str) {
        self.log.push(Event::SubMessage {
            indicator: self.indicator,
            text: submessage.to_string(),
        });
    }

    fn show(&mut self) {
        self.log.push(Event::Shown {
            indicator: self.indicator,
        });
    }

    fn dismiss(&mut self) {
        self.log.push(Event::Dismissed {
            indicator: self.indicator,
        });
    }
}

/// Minimal surface with a fixed id.
#[derive(Debug)]
pub struct TestSurface {
    id: SurfaceId,
}

impl Surface for TestSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }
}

/// Build a surface with id `raw`.
pub fn surface(raw: u64) -> Arc<dyn Surface> {
    Arc::new(TestSurface {
        id: SurfaceId::new(raw),
    })
}
