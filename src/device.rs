//! Output-device seams.
//!
//! The engine never talks to hardware directly; the surrounding application
//! hands it implementations of these traits. Both are best-effort sensory
//! outputs: a device that cannot play or vibrate degrades to a no-op, it is
//! never an error surfaced to the sampler side.

use crate::error::AudioError;
use crate::haptics::patterns::VibrationPattern;

#[cfg(feature = "device")]
pub mod cpal;

/// A streaming PCM sink: mono, 44.1 kHz, 16-bit signed.
pub trait AudioOutput: Send + Sync {
    /// True while sound is suppressed system-wide (silent / do-not-disturb).
    /// Checked before buffer synthesis so muted ticks cost nothing.
    fn is_muted(&self) -> bool;

    /// Queue samples for playback. Non-blocking; the device drains the
    /// queue at its own rate.
    fn write(&self, samples: &[i16]) -> Result<(), AudioError>;
}

/// A vibration motor that can play timed amplitude patterns.
pub trait HapticOutput: Send + Sync {
    /// False on devices without a vibrator; all haptic paths become no-ops.
    fn can_vibrate(&self) -> bool;

    /// Fire-and-forget playback of one pattern.
    fn play(&self, pattern: &VibrationPattern);
}
