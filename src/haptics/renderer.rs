//! Haptic renderer — cooldown throttling and pattern dispatch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use super::patterns::{self, QualityBand, Severity, VibrationPattern};
use crate::device::HapticOutput;

/// Discrete one-shot events with their own fixed patterns, exempt from
/// cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticEvent {
    NetworkDiscovered,
    ConnectionChanged,
}

impl HapticEvent {
    fn pattern(self) -> &'static VibrationPattern {
        match self {
            HapticEvent::NetworkDiscovered => &patterns::NETWORK_DISCOVERED,
            HapticEvent::ConnectionChanged => &patterns::CONNECTION_CHANGED,
        }
    }
}

/// Dispatches vibration patterns to the output device.
///
/// Severity-driven fires (interference and quality mappings) share one
/// cooldown timestamp: a fire within the cooldown window is suppressed and
/// leaves the timestamp untouched. Event and custom fires bypass the
/// cooldown entirely. Every path is a silent no-op on a device that cannot
/// vibrate.
pub struct HapticRenderer {
    output: Arc<dyn HapticOutput>,
    cooldown: Duration,
    last_fire: Mutex<Option<Instant>>,
}

impl HapticRenderer {
    pub fn new(output: Arc<dyn HapticOutput>, cooldown_ms: u64) -> Self {
        HapticRenderer {
            output,
            cooldown: Duration::from_millis(cooldown_ms),
            last_fire: Mutex::new(None),
        }
    }

    /// Fire the pattern for an interference score, subject to cooldown.
    /// Returns whether a pattern actually reached the device.
    pub fn fire_for_interference(&self, score: f64) -> bool {
        match Severity::from_interference(score) {
            Some(severity) => self.fire_throttled(severity.pattern()),
            None => false,
        }
    }

    /// Fire the pattern for a raw quality score, subject to the same
    /// cooldown timestamp as the interference mapping.
    pub fn fire_for_quality(&self, quality: f64) -> bool {
        match QualityBand::from_quality(quality) {
            Some(band) => self.fire_throttled(band.pattern()),
            None => false,
        }
    }

    /// Fire a discrete event pattern immediately; never throttled.
    pub fn fire_event(&self, event: HapticEvent) -> bool {
        if !self.output.can_vibrate() {
            return false;
        }
        self.output.play(event.pattern());
        true
    }

    /// Fire a caller-supplied waveform, bypassing band lookup and cooldown.
    pub fn fire_custom(&self, offsets_ms: &[u64], amplitudes: &[u8]) -> bool {
        if !self.output.can_vibrate() {
            return false;
        }
        self.output
            .play(&VibrationPattern::custom(offsets_ms, amplitudes));
        true
    }

    fn fire_throttled(&self, pattern: &VibrationPattern) -> bool {
        if !self.output.can_vibrate() {
            return false;
        }
        // Check-and-update must be atomic: one-shot and loop paths race
        // for the same timestamp.
        let mut last = self.last_fire.lock().expect("cooldown mutex poisoned");
        let now = Instant::now();
        if let Some(prev) = *last {
            if now.duration_since(prev) < self.cooldown {
                return false;
            }
        }
        *last = Some(now);
        self.output.play(pattern);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingMotor {
        incapable: AtomicBool,
        played: Mutex<Vec<VibrationPattern>>,
    }

    impl HapticOutput for RecordingMotor {
        fn can_vibrate(&self) -> bool {
            !self.incapable.load(Ordering::Relaxed)
        }
        fn play(&self, pattern: &VibrationPattern) {
            self.played.lock().unwrap().push(pattern.clone());
        }
    }

    fn renderer() -> (Arc<RecordingMotor>, HapticRenderer) {
        let motor = Arc::new(RecordingMotor::default());
        let r = HapticRenderer::new(Arc::clone(&motor) as Arc<dyn HapticOutput>, 500);
        (motor, r)
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_suppresses_second_fire() {
        let (motor, r) = renderer();
        assert!(r.fire_for_interference(0.8));
        assert!(!r.fire_for_interference(0.8));
        assert_eq!(motor.played.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_expires_after_gap() {
        let (motor, r) = renderer();
        assert!(r.fire_for_interference(0.8));
        tokio::time::advance(Duration::from_millis(501)).await;
        assert!(r.fire_for_interference(0.8));
        assert_eq!(motor.played.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn suppressed_fire_does_not_reset_cooldown() {
        let (motor, r) = renderer();
        assert!(r.fire_for_interference(0.8));
        tokio::time::advance(Duration::from_millis(300)).await;
        // Suppressed; must not push the window out
        assert!(!r.fire_for_interference(0.8));
        tokio::time::advance(Duration::from_millis(201)).await;
        assert!(r.fire_for_interference(0.8));
        assert_eq!(motor.played.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn quality_and_interference_share_cooldown() {
        let (motor, r) = renderer();
        assert!(r.fire_for_interference(0.8));
        assert!(!r.fire_for_quality(0.1));
        tokio::time::advance(Duration::from_millis(501)).await;
        assert!(r.fire_for_quality(0.1));
        assert_eq!(motor.played.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn events_bypass_cooldown() {
        let (motor, r) = renderer();
        assert!(r.fire_for_interference(0.8));
        assert!(r.fire_event(HapticEvent::NetworkDiscovered));
        assert!(r.fire_event(HapticEvent::ConnectionChanged));
        assert!(r.fire_event(HapticEvent::NetworkDiscovered));
        assert_eq!(motor.played.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_bypasses_cooldown() {
        let (motor, r) = renderer();
        assert!(r.fire_for_interference(0.8));
        assert!(r.fire_custom(&[0, 50], &[0, 200]));
        assert_eq!(motor.played.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn incapable_device_is_silent_noop() {
        let (motor, r) = renderer();
        motor.incapable.store(true, Ordering::Relaxed);
        assert!(!r.fire_for_interference(0.9));
        assert!(!r.fire_event(HapticEvent::NetworkDiscovered));
        assert!(!r.fire_custom(&[0, 50], &[0, 200]));
        assert!(motor.played.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn below_band_scores_do_not_consume_cooldown() {
        let (motor, r) = renderer();
        assert!(!r.fire_for_interference(0.05));
        assert!(r.fire_for_interference(0.8));
        assert_eq!(motor.played.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn severity_selects_expected_pattern() {
        let (motor, r) = renderer();
        assert!(r.fire_for_interference(0.75));
        let played = motor.played.lock().unwrap();
        assert_eq!(played[0], patterns::SEVERE);
    }
}
