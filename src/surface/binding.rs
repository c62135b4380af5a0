// src/surface/binding.rs

//! Binding between one runner and its current surface.
//!
//! The binding records *which* surface is attached (weakly) and owns the
//! indicator currently shown for it. Recording the surface happens
//! immediately on the calling thread, so the worker can tell whether rendering
//! is worthwhile; everything that touches an indicator is a job on the
//! foreground dispatcher.
//!
//! Every attach bumps a generation counter. The indicator-creation job only
//! acts if its generation is still current, the surface is still bound and
//! alive, and the run has not been torn down, so a burst of attach/detach
//! calls collapses to the last one.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::progress::ProgressReporter;
use crate::sync::lock;
use crate::types::{RunId, SurfaceId};

use super::{IndicatorFactory, ProgressIndicator, Surface};

/// A single progress update destined for the indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RenderUpdate {
    Message(String),
    SubMessage(String),
}

struct BoundSurface {
    id: SurfaceId,
    surface: Weak<dyn Surface>,
}

#[derive(Default)]
struct BindingSlot {
    surface: Option<BoundSurface>,
    indicator: Option<Box<dyn ProgressIndicator>>,
    generation: u64,
    finished: bool,
}

/// Current surface of a runner plus the indicator shown on it.
#[derive(Clone)]
pub struct SurfaceBinding {
    run_id: RunId,
    title: Arc<str>,
    slot: Arc<Mutex<BindingSlot>>,
    factory: Arc<dyn IndicatorFactory>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl fmt::Debug for SurfaceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.slot);
        f.debug_struct("SurfaceBinding")
            .field("run_id", &self.run_id)
            .field("surface", &slot.surface.as_ref().map(|b| b.id))
            .field("has_indicator", &slot.indicator.is_some())
            .field("generation", &slot.generation)
            .field("finished", &slot.finished)
            .finish()
    }
}

impl SurfaceBinding {
    pub(crate) fn new(
        run_id: RunId,
        title: &str,
        factory: Arc<dyn IndicatorFactory>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            run_id,
            title: Arc::from(title),
            slot: Arc::new(Mutex::new(BindingSlot::default())),
            factory,
            dispatcher,
        }
    }

    /// Bind to `surface` and queue creation of a fresh indicator for it.
    ///
    /// The indicator is seeded from `progress` when the job runs, i.e. with
    /// the newest state at that point rather than the state at call time. Any
    /// previous indicator is dismissed before the new one is created.
    ///
    /// Returns `false` if the run is already torn down.
    pub fn attach(&self, surface: &Arc<dyn Surface>, progress: &ProgressReporter) -> bool {
        let id = surface.id();
        let generation = {
            let mut slot = lock(&self.slot);
            if slot.finished {
                debug!(run_id = %self.run_id, surface = %id, "attach after teardown ignored");
                return false;
            }
            slot.generation += 1;
            slot.surface = Some(BoundSurface {
                id,
                surface: Arc::downgrade(surface),
            });
            slot.generation
        };

        debug!(
            run_id = %self.run_id,
            surface = %id,
            generation,
            "surface bound; indicator creation queued"
        );

        let binding = self.clone();
        let progress = progress.clone();
        self.dispatcher
            .submit(Box::new(move || binding.install_indicator(generation, &progress)));
        true
    }

    /// Forget the bound surface if it is `id`.
    ///
    /// The indicator stays up (stale) until the next attach replaces it or the
    /// run is torn down.
    pub fn detach_if_bound_to(&self, id: SurfaceId) -> bool {
        let mut slot = lock(&self.slot);
        if slot.surface.as_ref().map(|b| b.id) != Some(id) {
            return false;
        }
        slot.surface = None;
        drop(slot);

        debug!(run_id = %self.run_id, surface = %id, "surface detached");
        true
    }

    pub fn bound_surface(&self) -> Option<SurfaceId> {
        lock(&self.slot).surface.as_ref().map(|b| b.id)
    }

    pub fn is_attached(&self) -> bool {
        lock(&self.slot).surface.is_some()
    }

    /// Whether an indicator (possibly stale) is currently owned.
    pub fn has_indicator(&self) -> bool {
        lock(&self.slot).indicator.is_some()
    }

    pub fn is_finished(&self) -> bool {
        lock(&self.slot).finished
    }

    /// Queue `update` for the current indicator.
    pub(crate) fn render(&self, update: RenderUpdate) {
        let binding = self.clone();
        self.dispatcher
            .submit(Box::new(move || binding.apply_update(update)));
    }

    /// Dismiss the indicator and refuse any further attach or render.
    ///
    /// Must run on the foreground context. Only the first call has an
    /// effect; returns whether an indicator was dismissed by it.
    pub fn teardown_final(&self) -> bool {
        let indicator = {
            let mut slot = lock(&self.slot);
            if slot.finished {
                return false;
            }
            slot.finished = true;
            slot.surface = None;
            slot.indicator.take()
        };

        match indicator {
            Some(mut indicator) => {
                indicator.dismiss();
                debug!(run_id = %self.run_id, "indicator dismissed at teardown");
                true
            }
            None => {
                debug!(run_id = %self.run_id, "teardown without a live indicator");
                false
            }
        }
    }

    fn install_indicator(&self, generation: u64, progress: &ProgressReporter) {
        // Seed under the slot lock: a render for any later update has to wait
        // for it and then lands on the new indicator.
        let mut slot = lock(&self.slot);
        let state = progress.current_state();
        if slot.finished || slot.generation != generation {
            debug!(run_id = %self.run_id, generation, "indicator creation superseded");
            return;
        }
        let Some(bound) = slot.surface.as_ref() else {
            debug!(run_id = %self.run_id, generation, "surface detached before indicator creation");
            return;
        };
        let surface_id = bound.id;
        let Some(surface) = bound.surface.upgrade() else {
            debug!(run_id = %self.run_id, surface = %surface_id, "surface dropped before indicator creation");
            return;
        };

        if let Some(mut previous) = slot.indicator.take() {
            previous.dismiss();
        }

        let mut indicator = self.factory.create(&surface);
        indicator.set_title(&self.title);
        indicator.set_message(state.message());
        indicator.set_submessage(state.submessage());
        indicator.show();
        slot.indicator = Some(indicator);

        debug!(
            run_id = %self.run_id,
            surface = %surface_id,
            message = state.message(),
            "indicator shown"
        );
    }

    fn apply_update(&self, update: RenderUpdate) {
        let mut slot = lock(&self.slot);
        if slot.finished {
            return;
        }
        if let Some(indicator) = slot.indicator.as_mut() {
            match &update {
                RenderUpdate::Message(text) => indicator.set_message(text),
                RenderUpdate::SubMessage(text) => indicator.set_submessage(text),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{foreground_channel, InlineDispatcher};
    use crate::progress::ProgressState;

    type Log = Arc<Mutex<Vec<String>>>;

    struct PlainSurface(SurfaceId);

    impl Surface for PlainSurface {
        fn id(&self) -> SurfaceId {
            self.0
        }
    }

    fn surface(raw: u64) -> Arc<dyn Surface> {
        Arc::new(PlainSurface(SurfaceId::new(raw)))
    }

    struct LogIndicator {
        tag: String,
        log: Log,
    }

    impl ProgressIndicator for LogIndicator {
        fn set_title(&mut self, title: &str) {
            self.log.lock().unwrap().push(format!("{} title {title}", self.tag));
        }
        fn set_message(&mut self, message: &str) {
            self.log.lock().unwrap().push(format!("{} msg {message}", self.tag));
        }
        fn set_submessage(&mut self, submessage: &str) {
            self.log.lock().unwrap().push(format!("{} sub {submessage}", self.tag));
        }
        fn show(&mut self) {
            self.log.lock().unwrap().push(format!("{} show", self.tag));
        }
        fn dismiss(&mut self) {
            self.log.lock().unwrap().push(format!("{} dismiss", self.tag));
        }
    }

    struct LogFactory(Log);

    impl IndicatorFactory for LogFactory {
        fn create(&self, surface: &Arc<dyn Surface>) -> Box<dyn ProgressIndicator> {
            Box::new(LogIndicator {
                tag: format!("s{}", surface.id().get()),
                log: Arc::clone(&self.0),
            })
        }
    }

    fn setup(dispatcher: Arc<dyn Dispatcher>) -> (SurfaceBinding, ProgressReporter, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let run_id = RunId::next();
        let binding = SurfaceBinding::new(
            run_id,
            "Title",
            Arc::new(LogFactory(Arc::clone(&log))),
            dispatcher,
        );
        let reporter = ProgressReporter::new(run_id, ProgressState::new("init", ""), binding.clone());
        (binding, reporter, log)
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn attach_creates_seeded_indicator() {
        let (binding, reporter, log) = setup(Arc::new(InlineDispatcher));
        let s1 = surface(1);

        assert!(binding.attach(&s1, &reporter));
        assert_eq!(binding.bound_surface(), Some(SurfaceId::new(1)));
        assert_eq!(
            entries(&log),
            vec!["s1 title Title", "s1 msg init", "s1 sub ", "s1 show"]
        );
    }

    #[test]
    fn reattach_dismisses_previous_before_creating_next() {
        let (binding, reporter, log) = setup(Arc::new(InlineDispatcher));
        let s1 = surface(1);
        let s2 = surface(2);

        binding.attach(&s1, &reporter);
        log.lock().unwrap().clear();
        binding.attach(&s2, &reporter);

        let got = entries(&log);
        assert_eq!(got.first().map(String::as_str), Some("s1 dismiss"));
        assert!(got.contains(&"s2 show".to_string()));
    }

    #[test]
    fn detach_leaves_indicator_up() {
        let (binding, reporter, log) = setup(Arc::new(InlineDispatcher));
        let s1 = surface(1);
        binding.attach(&s1, &reporter);

        assert!(!binding.detach_if_bound_to(SurfaceId::new(9)));
        assert!(binding.detach_if_bound_to(SurfaceId::new(1)));
        assert!(!binding.is_attached());
        assert!(binding.has_indicator());
        assert!(!entries(&log).iter().any(|e| e.ends_with("dismiss")));
    }

    #[test]
    fn teardown_dismisses_once_and_blocks_later_attach() {
        let (binding, reporter, log) = setup(Arc::new(InlineDispatcher));
        let s1 = surface(1);
        binding.attach(&s1, &reporter);

        assert!(binding.teardown_final());
        assert!(!binding.teardown_final());
        assert!(!binding.attach(&s1, &reporter));

        let dismissals = entries(&log).iter().filter(|e| *e == "s1 dismiss").count();
        assert_eq!(dismissals, 1);
    }

    #[test]
    fn superseded_attach_creates_nothing() {
        let (dispatcher, mut fg) = foreground_channel();
        let (binding, reporter, log) = setup(Arc::new(dispatcher));
        let s1 = surface(1);
        let s2 = surface(2);

        binding.attach(&s1, &reporter);
        binding.attach(&s2, &reporter);
        fg.run_pending();

        let got = entries(&log);
        assert!(!got.iter().any(|e| e.starts_with("s1")));
        assert!(got.contains(&"s2 show".to_string()));
    }

    #[test]
    fn dropped_surface_creates_nothing() {
        let (dispatcher, mut fg) = foreground_channel();
        let (binding, reporter, log) = setup(Arc::new(dispatcher));

        let s1 = surface(1);
        binding.attach(&s1, &reporter);
        drop(s1);
        fg.run_pending();

        assert!(entries(&log).is_empty());
        assert!(!binding.has_indicator());
    }

    #[test]
    fn seeding_uses_state_at_job_time() {
        let (dispatcher, mut fg) = foreground_channel();
        let (binding, reporter, log) = setup(Arc::new(dispatcher));
        let s1 = surface(1);

        binding.attach(&s1, &reporter);
        reporter.update_message("newer");
        fg.run_pending();

        let got = entries(&log);
        assert!(got.contains(&"s1 msg newer".to_string()));
        assert!(!got.contains(&"s1 msg init".to_string()));
    }
}
