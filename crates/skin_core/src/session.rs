use crate::classifier::{ClassificationError, SkinClassifier};
use crate::config::EngineConfig;
use crate::preview::PreviewStore;
use crate::state::{Effect, Event, RunId, SessionError, SessionState, Transition, transition};
use crate::timer::{TimerId, TimerQueue};
use crate::upload::{AcquireError, CandidateFile};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunTimer {
    Tick(RunId),
    Compute(RunId),
}

/// One operator session: the state snapshot plus the collaborators that carry
/// out its effects. Single-threaded; time advances only through
/// [`advance_to`](Self::advance_to).
pub struct Session<C: SkinClassifier, P: PreviewStore> {
    state: SessionState,
    config: EngineConfig,
    classifier: C,
    previews: P,
    timers: TimerQueue<RunTimer>,
    ticker: Option<TimerId>,
    compute: Option<TimerId>,
}

impl<C: SkinClassifier, P: PreviewStore> Session<C, P> {
    pub fn new(config: EngineConfig, classifier: C, previews: P) -> Self {
        Self {
            state: SessionState::default(),
            config,
            classifier,
            previews,
            timers: TimerQueue::new(),
            ticker: None,
            compute: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Offer a picked file. On rejection the session keeps its image and shows the
    /// returned error.
    pub fn select(&mut self, file: CandidateFile) -> Result<(), AcquireError> {
        let name = file.name.clone();
        let media_type = file.media_type.clone();
        let size = file.size();
        self.dispatch(Event::Select(file));
        match &self.state.error {
            Some(SessionError::Acquire(err)) => {
                tracing::warn!("rejected {name} ({media_type}, {size} bytes): {err}");
                Err(*err)
            }
            _ => {
                tracing::info!("accepted {name} ({media_type}, {size} bytes)");
                Ok(())
            }
        }
    }

    /// Only the first dropped file is considered; an empty drop does nothing.
    pub fn drop_files(
        &mut self,
        files: impl IntoIterator<Item = CandidateFile>,
    ) -> Result<(), AcquireError> {
        match files.into_iter().next() {
            Some(file) => self.select(file),
            None => Ok(()),
        }
    }

    /// Start a classification run. Returns false, changing nothing, when no image
    /// is loaded or a run is already in flight.
    pub fn trigger(&mut self) -> bool {
        if !self.state.can_trigger() {
            tracing::debug!(
                "trigger ignored (image: {}, running: {})",
                self.state.image.is_some(),
                self.state.is_running()
            );
            return false;
        }
        self.dispatch(Event::Trigger);
        true
    }

    pub fn reset(&mut self) {
        if self.state.is_running() {
            tracing::info!("reset during run, discarding it");
        }
        self.dispatch(Event::Reset);
    }

    /// Fire every timer due up to `now`, in order.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(timer) = self.timers.pop_due(now) {
            match timer {
                RunTimer::Tick(run) => self.dispatch(Event::Tick { run }),
                RunTimer::Compute(run) => self.compute(run),
            }
        }
        self.timers.advance_clock(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.timers.now() + delta);
    }

    fn compute(&mut self, run: RunId) {
        self.compute = None;
        if self.state.current_run() != Some(run) {
            tracing::debug!("dropping stale compute for {run}");
            return;
        }
        let Some(image) = self.state.image.as_ref() else {
            tracing::error!("{run} has no image to classify");
            let error = ClassificationError::Failed("no image loaded".into());
            self.dispatch(Event::Fail { run, error });
            return;
        };
        let event = match self.classifier.classify(image) {
            Ok(outcome) => {
                tracing::info!(
                    "{run} finished: {} ({:.2})",
                    outcome.skin_type,
                    outcome.confidence
                );
                Event::Complete { run, outcome }
            }
            Err(error) => {
                tracing::error!("{run} failed: {error}");
                Event::Fail { run, error }
            }
        };
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: Event) {
        let Transition { state, effects } = transition(&self.state, event);
        self.state = state;
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::AcquirePreview(id) => {
                if let Some(image) = self.state.image.as_ref().filter(|i| i.preview == id) {
                    self.previews.acquire(id, image);
                }
            }
            Effect::ReleasePreview(id) => self.previews.release(id),
            Effect::StartRun(run) => {
                self.cancel_timers();
                tracing::info!(
                    "{run} started (tick {:?}, delay {:?})",
                    self.config.tick_interval(),
                    self.config.compute_delay()
                );
                self.ticker = Some(
                    self.timers
                        .schedule_repeating(self.config.tick_interval(), RunTimer::Tick(run)),
                );
                self.compute = Some(
                    self.timers
                        .schedule_once(self.config.compute_delay(), RunTimer::Compute(run)),
                );
            }
            Effect::StopTicker(_) => {
                if let Some(id) = self.ticker.take() {
                    self.timers.cancel(id);
                }
            }
            Effect::CancelRun(_) => self.cancel_timers(),
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.compute.take() {
            self.timers.cancel(id);
        }
    }
}

impl<C: SkinClassifier, P: PreviewStore> Drop for Session<C, P> {
    fn drop(&mut self) {
        if let Some(image) = self.state.image.take() {
            self.previews.release(image.preview);
        }
    }
}
