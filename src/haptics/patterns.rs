//! Vibration pattern table and severity band mapping.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Interference severity bands, evaluated high to low; first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Severe,
    High,
    Moderate,
    Low,
}

impl Severity {
    /// Band an interference score [0, 1]. Below 0.1 no feedback fires.
    ///
    /// Boundaries are inclusive: exactly 0.7 is `Severe`.
    pub fn from_interference(score: f64) -> Option<Self> {
        if score >= 0.7 {
            Some(Severity::Severe)
        } else if score >= 0.5 {
            Some(Severity::High)
        } else if score >= 0.3 {
            Some(Severity::Moderate)
        } else if score >= 0.1 {
            Some(Severity::Low)
        } else {
            None
        }
    }

    pub fn pattern(self) -> &'static VibrationPattern {
        match self {
            Severity::Severe => &SEVERE,
            Severity::High => &HIGH,
            Severity::Moderate => &MODERATE,
            // The low band reuses the predefined short tick.
            Severity::Low => &TICK,
        }
    }
}

/// Secondary banding of a raw quality score, independent of the
/// interference mapping. Above 0.4 no feedback fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityBand {
    Weak,
    Poor,
}

impl QualityBand {
    pub fn from_quality(quality: f64) -> Option<Self> {
        if quality.is_nan() {
            return None;
        }
        if quality <= 0.2 {
            Some(QualityBand::Weak)
        } else if quality <= 0.4 {
            Some(QualityBand::Poor)
        } else {
            None
        }
    }

    pub fn pattern(self) -> &'static VibrationPattern {
        match self {
            QualityBand::Weak => &WEAK_SIGNAL,
            QualityBand::Poor => &POOR_SIGNAL,
        }
    }
}

/// One vibration waveform: paired segment durations (ms) and amplitudes
/// (0–255, 0 = motor off). Entry `i` runs for `offsets_ms[i]` at
/// `amplitudes[i]`. Patterns in this engine never repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibrationPattern {
    pub offsets_ms: Cow<'static, [u64]>,
    pub amplitudes: Cow<'static, [u8]>,
    pub repeat: bool,
}

impl VibrationPattern {
    /// Caller-supplied waveform. Mismatched lengths truncate to the
    /// shorter slice rather than erroring.
    pub fn custom(offsets_ms: &[u64], amplitudes: &[u8]) -> Self {
        let len = offsets_ms.len().min(amplitudes.len());
        VibrationPattern {
            offsets_ms: Cow::Owned(offsets_ms[..len].to_vec()),
            amplitudes: Cow::Owned(amplitudes[..len].to_vec()),
            repeat: false,
        }
    }

    /// Total motor-active time plus gaps, in ms.
    pub fn duration_ms(&self) -> u64 {
        self.offsets_ms.iter().sum()
    }
}

const fn fixed(offsets_ms: &'static [u64], amplitudes: &'static [u8]) -> VibrationPattern {
    VibrationPattern {
        offsets_ms: Cow::Borrowed(offsets_ms),
        amplitudes: Cow::Borrowed(amplitudes),
        repeat: false,
    }
}

/// Triple strong buzz.
pub static SEVERE: VibrationPattern =
    fixed(&[0, 250, 100, 250, 100, 250], &[0, 255, 0, 255, 0, 255]);

/// Double buzz.
pub static HIGH: VibrationPattern = fixed(&[0, 180, 80, 180], &[0, 200, 0, 200]);

/// Single medium buzz.
pub static MODERATE: VibrationPattern = fixed(&[0, 140], &[0, 160]);

/// Predefined short tick, shared by the low interference band.
pub static TICK: VibrationPattern = fixed(&[0, 35], &[0, 120]);

/// Quality band: barely usable link.
pub static WEAK_SIGNAL: VibrationPattern = fixed(&[0, 200, 80, 200], &[0, 220, 0, 220]);

/// Quality band: degraded link.
pub static POOR_SIGNAL: VibrationPattern = fixed(&[0, 120], &[0, 150]);

/// Discrete event: a new network appeared.
pub static NETWORK_DISCOVERED: VibrationPattern = fixed(&[0, 40, 40, 40], &[0, 180, 0, 180]);

/// Discrete event: association state changed.
pub static CONNECTION_CHANGED: VibrationPattern = fixed(&[0, 60, 40, 120], &[0, 255, 0, 180]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interference_band_boundaries() {
        assert_eq!(Severity::from_interference(0.7), Some(Severity::Severe));
        assert_eq!(Severity::from_interference(0.69), Some(Severity::High));
        assert_eq!(Severity::from_interference(0.5), Some(Severity::High));
        assert_eq!(Severity::from_interference(0.49), Some(Severity::Moderate));
        assert_eq!(Severity::from_interference(0.3), Some(Severity::Moderate));
        assert_eq!(Severity::from_interference(0.1), Some(Severity::Low));
        assert_eq!(Severity::from_interference(0.09), None);
        assert_eq!(Severity::from_interference(0.0), None);
        assert_eq!(Severity::from_interference(1.0), Some(Severity::Severe));
    }

    #[test]
    fn interference_band_never_panics() {
        assert_eq!(Severity::from_interference(f64::NAN), None);
        assert_eq!(Severity::from_interference(-5.0), None);
        assert_eq!(Severity::from_interference(99.0), Some(Severity::Severe));
    }

    #[test]
    fn quality_band_boundaries() {
        assert_eq!(QualityBand::from_quality(0.2), Some(QualityBand::Weak));
        assert_eq!(QualityBand::from_quality(0.21), Some(QualityBand::Poor));
        assert_eq!(QualityBand::from_quality(0.4), Some(QualityBand::Poor));
        assert_eq!(QualityBand::from_quality(0.41), None);
        assert_eq!(QualityBand::from_quality(f64::NAN), None);
    }

    #[test]
    fn low_band_reuses_tick() {
        assert_eq!(Severity::Low.pattern(), &TICK);
    }

    #[test]
    fn fixed_patterns_are_paired_and_non_repeating() {
        for p in [
            &SEVERE,
            &HIGH,
            &MODERATE,
            &TICK,
            &WEAK_SIGNAL,
            &POOR_SIGNAL,
            &NETWORK_DISCOVERED,
            &CONNECTION_CHANGED,
        ] {
            assert_eq!(p.offsets_ms.len(), p.amplitudes.len());
            assert!(!p.repeat);
            assert!(p.duration_ms() > 0);
        }
    }

    #[test]
    fn custom_truncates_to_shorter_slice() {
        let p = VibrationPattern::custom(&[0, 50, 50], &[0, 200]);
        assert_eq!(p.offsets_ms.as_ref(), &[0, 50]);
        assert_eq!(p.amplitudes.as_ref(), &[0, 200]);
        assert!(!p.repeat);
    }
}
