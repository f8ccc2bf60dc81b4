//! Tone synthesis — rssi-to-pitch mapping and sine buffer generation.

use std::f64::consts::PI;

use super::envelope::Envelope;
use crate::sample::clamp_unit;

/// Output sample rate in Hz (mono, 16-bit signed).
pub const SAMPLE_RATE: u32 = 44_100;

/// Lowest tone the engine emits.
pub const MIN_FREQUENCY_HZ: u32 = 220;
/// Highest tone the engine emits.
pub const MAX_FREQUENCY_HZ: u32 = 880;

/// Shortest inter-feedback interval (strong signal).
pub const MIN_INTERVAL_MS: u64 = 100;
/// Longest inter-feedback interval (weak signal).
pub const MAX_INTERVAL_MS: u64 = 1000;

/// Frequency and duration of one tone, computed per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneSpec {
    pub frequency_hz: u32,
    pub duration_ms: u64,
}

impl ToneSpec {
    pub fn for_rssi(rssi: i32, duration_ms: u64) -> Self {
        ToneSpec {
            frequency_hz: frequency_from_rssi(rssi),
            duration_ms,
        }
    }
}

/// Normalize an rssi reading into [0, 1] over the [-90, -30] dBm band.
fn normalize_rssi(rssi: i32) -> f64 {
    (rssi + 90).clamp(0, 60) as f64 / 60.0
}

/// Map rssi to pitch: stronger signal, higher tone.
///
/// Linear interpolation between 220 Hz and 880 Hz over the normalized
/// rssi band.
pub fn frequency_from_rssi(rssi: i32) -> u32 {
    let norm = normalize_rssi(rssi);
    let span = (MAX_FREQUENCY_HZ - MIN_FREQUENCY_HZ) as f64;
    (MIN_FREQUENCY_HZ as f64 + norm * span).round() as u32
}

/// Map rssi to an inter-click interval: stronger signal, faster clicks.
///
/// Inverse linear interpolation between 1000 ms and 100 ms; drives geiger
/// mode's acceleration.
pub fn interval_from_rssi(rssi: i32) -> u64 {
    let norm = normalize_rssi(rssi);
    let span = (MAX_INTERVAL_MS - MIN_INTERVAL_MS) as f64;
    (MAX_INTERVAL_MS as f64 - norm * span).round() as u64
}

/// Map a [0, 1] quality score to the continuous loop's sleep interval:
/// `min + (1 - quality) * (max - min)`. Better quality, shorter interval.
pub fn interval_from_quality(quality: f64) -> u64 {
    let q = clamp_unit(quality);
    let span = (MAX_INTERVAL_MS - MIN_INTERVAL_MS) as f64;
    (MIN_INTERVAL_MS as f64 + (1.0 - q) * span).round() as u64
}

/// Synthesize a mono 16-bit sine buffer at the given frequency.
///
/// Produces `SAMPLE_RATE * duration_ms / 1000` samples (truncating), shaped
/// by the attack/release envelope at `volume` peak amplitude. Zero computed
/// samples yields an empty buffer.
pub fn generate_buffer(frequency_hz: u32, duration_ms: u64, volume: f64) -> Vec<i16> {
    let total = (SAMPLE_RATE as u64 * duration_ms / 1000) as usize;
    if total == 0 {
        return Vec::new();
    }

    let env = Envelope::new(volume);
    let step = 2.0 * PI * frequency_hz as f64 / SAMPLE_RATE as f64;
    (0..total)
        .map(|i| {
            let s = (step * i as f64).sin() * env.gain_at(i, total);
            (s * 32767.0).round().clamp(-32768.0, 32767.0) as i16
        })
        .collect()
}
