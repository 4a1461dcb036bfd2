//! Session snapshot and the pure transition function that drives it.
//!
//! Every user or timer event maps to [`transition`], which returns the next
//! snapshot plus the side effects the host has to carry out (preview handles,
//! timers). Callbacks carry the [`RunId`] they were scheduled for; anything that
//! does not match the run currently in flight is ignored, which is what keeps a
//! late completion from resurrecting a session that was reset mid-run.

use crate::classifier::{ClassificationError, ClassificationOutcome, ClassificationResult};
use crate::preview::PreviewId;
use crate::upload::{self, AcquireError, CandidateFile, UploadedImage};
use std::fmt;
use thiserror::Error;

/// Progress added by each tick.
pub const PROGRESS_STEP: u8 = 10;
/// Ticks never push progress past this; only completion does.
pub const PROGRESS_CEILING: u8 = 90;
pub const PROGRESS_DONE: u8 = 100;

/// Identifies one classification run within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running {
        run: RunId,
    },
    Succeeded,
    Failed,
}

/// The message the operator sees. Classification details stay in the logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error("Terjadi kesalahan saat memproses gambar. Silakan coba lagi.")]
    Classification(ClassificationError),
}

/// Single source of truth for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub image: Option<UploadedImage>,
    pub result: Option<ClassificationResult>,
    pub phase: Phase,
    /// Percentage in [0,100].
    pub progress: u8,
    pub error: Option<SessionError>,
    runs_started: u64,
    previews_issued: u64,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn current_run(&self) -> Option<RunId> {
        match self.phase {
            Phase::Running { run } => Some(run),
            _ => None,
        }
    }

    /// Whether a trigger would start a run.
    pub fn can_trigger(&self) -> bool {
        self.image.is_some() && !self.is_running()
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// A picked file, or the first file of a drop.
    Select(CandidateFile),
    Trigger,
    Tick {
        run: RunId,
    },
    Complete {
        run: RunId,
        outcome: ClassificationOutcome,
    },
    Fail {
        run: RunId,
        error: ClassificationError,
    },
    Reset,
}

/// Work the host performs after a transition, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    AcquirePreview(PreviewId),
    ReleasePreview(PreviewId),
    /// Arm the progress ticker and the compute delay for this run.
    StartRun(RunId),
    /// Progress reached the ceiling; the ticker has nothing left to do.
    StopTicker(RunId),
    /// Drop every timer belonging to this run.
    CancelRun(RunId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

pub fn transition(state: &SessionState, event: Event) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();
    match event {
        Event::Select(candidate) => select(&mut next, &mut effects, candidate),
        Event::Trigger => trigger(&mut next, &mut effects),
        Event::Tick { run } => tick(&mut next, &mut effects, run),
        Event::Complete { run, outcome } => {
            if next.current_run() == Some(run) {
                next.result = Some(outcome.into());
                next.progress = PROGRESS_DONE;
                next.phase = Phase::Succeeded;
                effects.push(Effect::CancelRun(run));
            }
        }
        Event::Fail { run, error } => {
            if next.current_run() == Some(run) {
                next.error = Some(SessionError::Classification(error));
                next.phase = Phase::Failed;
                effects.push(Effect::CancelRun(run));
            }
        }
        Event::Reset => reset(&mut next, &mut effects),
    }
    Transition {
        state: next,
        effects,
    }
}

fn select(next: &mut SessionState, effects: &mut Vec<Effect>, candidate: CandidateFile) {
    let preview = PreviewId::new(next.previews_issued + 1);
    let image = match upload::validate(candidate, preview) {
        Ok(image) => image,
        Err(err) => {
            next.error = Some(err.into());
            return;
        }
    };
    next.previews_issued += 1;

    // A new photo invalidates whatever was computed for the old one.
    if let Some(run) = next.current_run() {
        effects.push(Effect::CancelRun(run));
    }
    if let Some(old) = next.image.take() {
        effects.push(Effect::ReleasePreview(old.preview));
    }
    next.result = None;
    next.phase = Phase::Idle;
    next.progress = 0;
    next.error = None;
    next.image = Some(image);
    effects.push(Effect::AcquirePreview(preview));
}

fn trigger(next: &mut SessionState, effects: &mut Vec<Effect>) {
    if !next.can_trigger() {
        return;
    }
    next.runs_started += 1;
    let run = RunId(next.runs_started);
    next.phase = Phase::Running { run };
    next.progress = 0;
    next.error = None;
    effects.push(Effect::StartRun(run));
}

fn tick(next: &mut SessionState, effects: &mut Vec<Effect>, run: RunId) {
    if next.current_run() != Some(run) {
        return;
    }
    next.progress = next
        .progress
        .saturating_add(PROGRESS_STEP)
        .min(PROGRESS_CEILING);
    if next.progress >= PROGRESS_CEILING {
        effects.push(Effect::StopTicker(run));
    }
}

fn reset(next: &mut SessionState, effects: &mut Vec<Effect>) {
    if let Some(run) = next.current_run() {
        effects.push(Effect::CancelRun(run));
    }
    if let Some(old) = next.image.take() {
        effects.push(Effect::ReleasePreview(old.preview));
    }
    next.result = None;
    next.error = None;
    next.progress = 0;
    next.phase = Phase::Idle;
}
