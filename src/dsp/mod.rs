//! DSP — pure tone synthesis for the feedback engine.
//!
//! Everything here is deterministic and device-free: mapping functions from
//! signal measurements to pitch and cadence, and sine buffer generation
//! with envelope shaping. Playback lives in `crate::player`.

pub mod envelope;
pub mod tone;
