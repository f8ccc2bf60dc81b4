//! Tone playback — serialized access to the audio output device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::device::AudioOutput;
use crate::dsp::tone::{self, ToneSpec};
use crate::error::AudioError;

/// Callback invoked on playback failures, for the surrounding application.
pub type FailureHook = Arc<dyn Fn(&AudioError) + Send + Sync>;

/// Plays synthesized tones on a single exclusively-owned output device.
///
/// Every playback path funnels through one async mutex, so no two buffers
/// are ever written concurrently. Waiters queue in FIFO order: a one-shot
/// tone issued while a loop tone plays waits its turn rather than being
/// dropped.
pub struct TonePlayer {
    output: Arc<dyn AudioOutput>,
    volume: f64,
    device_lock: tokio::sync::Mutex<()>,
    /// Rotated by `halt()`; in-flight tones watch the token they started
    /// with, so a halt ends their wait without affecting later tones.
    halt: Mutex<CancellationToken>,
    closed: AtomicBool,
    failure_hook: Mutex<Option<FailureHook>>,
}

impl TonePlayer {
    pub fn new(output: Arc<dyn AudioOutput>, volume: f64) -> Self {
        TonePlayer {
            output,
            volume,
            device_lock: tokio::sync::Mutex::new(()),
            halt: Mutex::new(CancellationToken::new()),
            closed: AtomicBool::new(false),
            failure_hook: Mutex::new(None),
        }
    }

    /// Synthesize and play one tone, suspending for its duration.
    ///
    /// The mute gate is checked before buffer generation. A halt request
    /// ends the duration wait early; the samples already written drain on
    /// the device rather than being torn out mid-buffer.
    pub async fn play_tone(&self, spec: ToneSpec) -> Result<(), AudioError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AudioError::Closed);
        }
        let token = self.current_token();
        if self.output.is_muted() {
            return Ok(());
        }

        let buffer = tone::generate_buffer(spec.frequency_hz, spec.duration_ms, self.volume);
        if buffer.is_empty() {
            return Ok(());
        }

        let _guard = self.device_lock.lock().await;
        // No new buffer starts once a halt is requested.
        if token.is_cancelled() {
            return Ok(());
        }
        self.output.write(&buffer)?;
        let duration = Duration::from_millis(spec.duration_ms);
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(duration) => {}
        }
        Ok(())
    }

    /// Consume a lazy rssi sequence, emitting one click per element at the
    /// mapped frequency and spacing. `None` from the provider ends the
    /// stream. Write failures suppress that single click and continue.
    pub async fn stream_clicks<F>(&self, mut next_rssi: F, click_ms: u64, cancel: CancellationToken)
    where
        F: FnMut() -> Option<i32> + Send,
    {
        loop {
            if cancel.is_cancelled() || self.closed.load(Ordering::SeqCst) {
                break;
            }
            let Some(rssi) = next_rssi() else { break };

            if !self.output.is_muted() {
                let buffer =
                    tone::generate_buffer(tone::frequency_from_rssi(rssi), click_ms, self.volume);
                let guard = self.device_lock.lock().await;
                if cancel.is_cancelled() {
                    break;
                }
                if let Err(e) = self.output.write(&buffer) {
                    self.report_failure(&e);
                }
                drop(guard);
            }

            let interval = Duration::from_millis(tone::interval_from_rssi(rssi));
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// End the current tone's wait early. Later tones are unaffected.
    pub fn halt(&self) {
        let mut token = self.halt.lock().expect("halt token mutex poisoned");
        token.cancel();
        *token = CancellationToken::new();
    }

    /// Permanently release the device. All later plays fail with `Closed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.halt();
    }

    pub fn set_failure_hook(&self, hook: FailureHook) {
        *self.failure_hook.lock().expect("failure hook mutex poisoned") = Some(hook);
    }

    /// Log a playback failure and forward it to the diagnostic hook.
    pub(crate) fn report_failure(&self, err: &AudioError) {
        tracing::warn!("tone playback failed: {err}");
        let hook = self
            .failure_hook
            .lock()
            .expect("failure hook mutex poisoned")
            .clone();
        if let Some(hook) = hook {
            hook(err);
        }
    }

    fn current_token(&self) -> CancellationToken {
        self.halt.lock().expect("halt token mutex poisoned").clone()
    }
}
