//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunable parameters for the feedback engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Duration of the one-shot feedback tone, in ms.
    pub feedback_tone_ms: u64,
    /// Duration of each tone inside the continuous loop, in ms.
    pub loop_tone_ms: u64,
    /// Duration of a geiger-mode click, in ms.
    pub geiger_click_ms: u64,
    /// Sleep between polls when the sampler has no data, in ms.
    pub idle_poll_ms: u64,
    /// Interference score above which the continuous loop fires haptics.
    pub interference_threshold: f64,
    /// Minimum gap between throttled haptic fires, in ms.
    pub haptic_cooldown_ms: u64,
    /// Peak tone amplitude as a fraction of full scale.
    pub volume: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feedback_tone_ms: 100,
            loop_tone_ms: 50,
            geiger_click_ms: 20,
            idle_poll_ms: 500,
            interference_threshold: 0.3,
            haptic_cooldown_ms: 500,
            volume: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_constants() {
        let c = EngineConfig::default();
        assert_eq!(c.feedback_tone_ms, 100);
        assert_eq!(c.loop_tone_ms, 50);
        assert_eq!(c.idle_poll_ms, 500);
        assert_eq!(c.interference_threshold, 0.3);
        assert_eq!(c.haptic_cooldown_ms, 500);
        assert_eq!(c.volume, 0.5);
    }
}
