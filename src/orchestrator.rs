//! Feedback orchestrator — decides when and how a signal sample becomes
//! sound and vibration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::device::{AudioOutput, HapticOutput};
use crate::dsp::tone::{self, ToneSpec};
use crate::error::FeedbackError;
use crate::haptics::renderer::{HapticEvent, HapticRenderer};
use crate::player::{FailureHook, TonePlayer};
use crate::sample::SignalSample;

/// The engine's single entry point.
///
/// Owns the enable flag per channel, the continuous-feedback loop, and both
/// renderers. Audio and haptics are independent channels: toggling or
/// failing one never affects the other. All operations fail with
/// [`FeedbackError::Disposed`] once [`release`](Self::release) has run.
///
/// Loops and one-shot dispatches run as tokio tasks, so the orchestrator
/// must live inside a runtime.
pub struct FeedbackOrchestrator {
    shared: Arc<Shared>,
    active_loop: Mutex<Option<LoopHandle>>,
}

struct Shared {
    player: TonePlayer,
    haptics: HapticRenderer,
    config: EngineConfig,
    audio_enabled: AtomicBool,
    haptic_enabled: AtomicBool,
    last_sample: Mutex<Option<SignalSample>>,
    disposed: AtomicBool,
}

struct LoopHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl FeedbackOrchestrator {
    /// Both channels start enabled.
    pub fn new(audio: Arc<dyn AudioOutput>, haptics: Arc<dyn HapticOutput>) -> Self {
        Self::with_config(audio, haptics, EngineConfig::default())
    }

    pub fn with_config(
        audio: Arc<dyn AudioOutput>,
        haptics: Arc<dyn HapticOutput>,
        config: EngineConfig,
    ) -> Self {
        FeedbackOrchestrator {
            shared: Arc::new(Shared {
                player: TonePlayer::new(audio, config.volume),
                haptics: HapticRenderer::new(haptics, config.haptic_cooldown_ms),
                config,
                audio_enabled: AtomicBool::new(true),
                haptic_enabled: AtomicBool::new(true),
                last_sample: Mutex::new(None),
                disposed: AtomicBool::new(false),
            }),
            active_loop: Mutex::new(None),
        }
    }

    pub fn audio_enabled(&self) -> Result<bool, FeedbackError> {
        self.ensure_live()?;
        Ok(self.shared.audio_enabled.load(Ordering::SeqCst))
    }

    pub fn haptic_enabled(&self) -> Result<bool, FeedbackError> {
        self.ensure_live()?;
        Ok(self.shared.haptic_enabled.load(Ordering::SeqCst))
    }

    /// Disabling audio halts any in-flight tone immediately. Haptics are
    /// untouched.
    pub fn set_audio_enabled(&self, enabled: bool) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        self.shared.audio_enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.shared.player.halt();
        }
        Ok(())
    }

    pub fn set_haptic_enabled(&self, enabled: bool) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        self.shared.haptic_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    /// Render one sample now: a 100 ms tone pitched from its rssi and the
    /// interference haptic pattern. The two dispatches are independent;
    /// neither waits for the other.
    pub fn provide_feedback(&self, sample: SignalSample) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        *self
            .shared
            .last_sample
            .lock()
            .expect("last sample mutex poisoned") = Some(sample);

        if self.shared.audio_enabled.load(Ordering::SeqCst) {
            let spec = ToneSpec::for_rssi(sample.rssi, self.shared.config.feedback_tone_ms);
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move {
                if let Err(e) = shared.player.play_tone(spec).await {
                    shared.player.report_failure(&e);
                }
            });
        }
        if self.shared.haptic_enabled.load(Ordering::SeqCst) {
            self.shared
                .haptics
                .fire_for_interference(sample.interference_score);
        }
        Ok(())
    }

    /// Haptic-only entry point for a raw quality scalar, using the
    /// secondary weak/poor banding.
    pub fn provide_quality_feedback(&self, quality: f64) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        if self.shared.haptic_enabled.load(Ordering::SeqCst) {
            self.shared.haptics.fire_for_quality(quality);
        }
        Ok(())
    }

    /// Start the continuous loop, replacing any active loop. The previous
    /// loop is cancelled and joined before the new one spawns, so no
    /// dispatch from it can land afterwards.
    ///
    /// Per iteration: pull a sample; play a 50 ms tone at its mapped
    /// frequency, fire the interference haptic when the score exceeds the
    /// configured threshold, then sleep an interval shrinking linearly
    /// with quality. An empty pull sleeps the idle interval and retries.
    pub async fn start_continuous_feedback<F>(&self, provider: F) -> Result<(), FeedbackError>
    where
        F: FnMut() -> Option<SignalSample> + Send + 'static,
    {
        self.ensure_live()?;
        self.cancel_active_loop().await;

        let token = CancellationToken::new();
        let shared = Arc::clone(&self.shared);
        let join = tokio::spawn(continuous_loop(shared, provider, token.clone()));
        *self
            .active_loop
            .lock()
            .expect("active loop mutex poisoned") = Some(LoopHandle { token, join });
        Ok(())
    }

    /// Start geiger mode, replacing any active loop: one short click per
    /// reading, with pitch and spacing both driven by rssi, so clicks
    /// accelerate and rise as the signal strengthens.
    ///
    /// Audio-only by definition: a no-op when audio is disabled at call
    /// time, and the loop ends if audio is disabled while it runs.
    pub async fn start_geiger_mode<F>(&self, mut provider: F) -> Result<(), FeedbackError>
    where
        F: FnMut() -> i32 + Send + 'static,
    {
        self.ensure_live()?;
        if !self.shared.audio_enabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.cancel_active_loop().await;

        let token = CancellationToken::new();
        let shared = Arc::clone(&self.shared);
        let loop_token = token.clone();
        let join = tokio::spawn(async move {
            tracing::debug!("geiger mode started");
            let flags = Arc::clone(&shared);
            let click_ms = shared.config.geiger_click_ms;
            shared
                .player
                .stream_clicks(
                    move || {
                        if flags.audio_enabled.load(Ordering::SeqCst) {
                            Some(provider())
                        } else {
                            None
                        }
                    },
                    click_ms,
                    loop_token,
                )
                .await;
            tracing::debug!("geiger mode stopped");
        });
        *self
            .active_loop
            .lock()
            .expect("active loop mutex poisoned") = Some(LoopHandle { token, join });
        Ok(())
    }

    /// Cancel any active loop and halt the current tone. Idempotent.
    pub async fn stop(&self) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        self.cancel_active_loop().await;
        self.shared.player.halt();
        Ok(())
    }

    /// Stop, then permanently release the audio device. Terminal: every
    /// later operation fails with [`FeedbackError::Disposed`].
    pub async fn release(&self) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        self.cancel_active_loop().await;
        self.shared.player.close();
        self.shared.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Single-shot event haptic; bypasses cooldown.
    pub fn on_network_discovered(&self) -> Result<(), FeedbackError> {
        self.fire_event(HapticEvent::NetworkDiscovered)
    }

    /// Single-shot event haptic; bypasses cooldown.
    pub fn on_connection_changed(&self) -> Result<(), FeedbackError> {
        self.fire_event(HapticEvent::ConnectionChanged)
    }

    /// Play a caller-supplied waveform, bypassing band lookup and cooldown.
    pub fn fire_custom_pattern(
        &self,
        offsets_ms: &[u64],
        amplitudes: &[u8],
    ) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        if self.shared.haptic_enabled.load(Ordering::SeqCst) {
            self.shared.haptics.fire_custom(offsets_ms, amplitudes);
        }
        Ok(())
    }

    /// Most recent sample seen by either feedback path, for diagnostics.
    pub fn last_sample(&self) -> Result<Option<SignalSample>, FeedbackError> {
        self.ensure_live()?;
        Ok(*self
            .shared
            .last_sample
            .lock()
            .expect("last sample mutex poisoned"))
    }

    /// Register a callback for playback failures. Failures are best-effort
    /// suppressed, never escalated; this is the observation point.
    pub fn set_diagnostics_hook(&self, hook: FailureHook) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        self.shared.player.set_failure_hook(hook);
        Ok(())
    }

    fn fire_event(&self, event: HapticEvent) -> Result<(), FeedbackError> {
        self.ensure_live()?;
        if self.shared.haptic_enabled.load(Ordering::SeqCst) {
            self.shared.haptics.fire_event(event);
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), FeedbackError> {
        if self.shared.disposed.load(Ordering::SeqCst) {
            Err(FeedbackError::Disposed)
        } else {
            Ok(())
        }
    }

    async fn cancel_active_loop(&self) {
        let previous = self
            .active_loop
            .lock()
            .expect("active loop mutex poisoned")
            .take();
        if let Some(handle) = previous {
            handle.token.cancel();
            let _ = handle.join.await;
        }
    }
}

async fn continuous_loop<F>(shared: Arc<Shared>, mut provider: F, token: CancellationToken)
where
    F: FnMut() -> Option<SignalSample> + Send + 'static,
{
    tracing::debug!("continuous feedback started");
    loop {
        if token.is_cancelled() {
            break;
        }
        let sleep_ms = match provider() {
            Some(sample) => {
                *shared
                    .last_sample
                    .lock()
                    .expect("last sample mutex poisoned") = Some(sample);

                if shared.audio_enabled.load(Ordering::SeqCst) {
                    let spec = ToneSpec::for_rssi(sample.rssi, shared.config.loop_tone_ms);
                    let audio = Arc::clone(&shared);
                    // Fire-and-forget relative to the loop; the device
                    // mutex still serializes it against other tones.
                    tokio::spawn(async move {
                        if let Err(e) = audio.player.play_tone(spec).await {
                            audio.player.report_failure(&e);
                        }
                    });
                }
                if shared.haptic_enabled.load(Ordering::SeqCst)
                    && sample.interference_score > shared.config.interference_threshold
                {
                    shared
                        .haptics
                        .fire_for_interference(sample.interference_score);
                }
                tone::interval_from_quality(sample.signal_quality)
            }
            None => shared.config.idle_poll_ms,
        };
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_millis(sleep_ms)) => {}
        }
    }
    tracing::debug!("continuous feedback stopped");
}
