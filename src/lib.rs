//! Feedback orchestration engine for wireless-signal inspection.
//!
//! Turns a stream of signal-quality measurements into real-time sensory
//! feedback on two independent channels: synthesized audio tones (pitch
//! and cadence track signal strength) and timed haptic vibration patterns
//! (pattern and intensity track interference severity). The engine decides
//! when, how often, and in what form a raw [`SignalSample`] is rendered;
//! the surrounding application supplies the samples and the output
//! devices.

pub mod config;
pub mod device;
pub mod dsp;
pub mod error;
pub mod haptics;
pub mod orchestrator;
pub mod player;
pub mod sample;

pub use config::EngineConfig;
pub use error::{AudioError, FeedbackError};
pub use orchestrator::FeedbackOrchestrator;
pub use sample::SignalSample;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
