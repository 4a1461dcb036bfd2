//! Session logic for the Jiabao Klinik skin-type screen: photo acquisition,
//! the simulated classification run, and the mapping of results to display text.
//!
//! Everything here is single-threaded and driven by discrete events. Time only
//! moves when the host calls [`Session::advance_to`], which keeps the whole flow
//! deterministic under test.

pub mod classifier;
pub mod config;
pub mod present;
pub mod preview;
pub mod session;
pub mod state;
pub mod timer;
pub mod upload;

pub use classifier::{
    ClassificationError, ClassificationOutcome, ClassificationResult, MOCK_OUTCOMES,
    MockClassifier, RandomSource, SkinClassifier, SkinType, ThreadRandom,
};
pub use config::EngineConfig;
pub use present::{ConfidenceTier, ResultView};
pub use preview::{PreviewId, PreviewStore, TrackingPreviews};
pub use session::Session;
pub use state::{Effect, Event, Phase, RunId, SessionError, SessionState, Transition, transition};
pub use timer::{TimerId, TimerQueue};
pub use upload::{AcquireError, CandidateFile, MAX_UPLOAD_BYTES, UploadedImage};
