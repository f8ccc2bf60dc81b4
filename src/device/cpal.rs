//! cpal-backed audio output for desktop hosts.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::device::AudioOutput;
use crate::dsp::tone::SAMPLE_RATE;
use crate::error::AudioError;

/// An `AudioOutput` over the host's default output device.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated thread
/// for its whole life; this handle only touches the shared sample queue.
/// The output callback drains the queue and fills underruns with silence.
pub struct CpalOutput {
    queue: Arc<Mutex<VecDeque<i16>>>,
    shutdown: mpsc::Sender<()>,
}

impl CpalOutput {
    /// Open the default output device at the engine's fixed format.
    pub fn open() -> Result<Self, AudioError> {
        let queue: Arc<Mutex<VecDeque<i16>>> = Arc::new(Mutex::new(VecDeque::new()));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let callback_queue = Arc::clone(&queue);
        std::thread::spawn(move || {
            let stream = match build_stream(callback_queue) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            // Keep the stream alive until the handle drops.
            let _ = shutdown_rx.recv();
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(CpalOutput {
                queue,
                shutdown: shutdown_tx,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AudioError::DeviceUnavailable {
                reason: "output stream thread exited during setup".to_string(),
            }),
        }
    }
}

fn build_stream(queue: Arc<Mutex<VecDeque<i16>>>) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::DeviceUnavailable {
            reason: "no default output device".to_string(),
        })?;

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut queue = queue.lock().expect("output queue mutex poisoned");
                for slot in data.iter_mut() {
                    *slot = queue
                        .pop_front()
                        .map(|s| s as f32 / 32768.0)
                        .unwrap_or(0.0);
                }
            },
            |err| tracing::warn!("output stream error: {err}"),
            None,
        )
        .map_err(|e| AudioError::DeviceUnavailable {
            reason: e.to_string(),
        })?;

    stream.play().map_err(|e| AudioError::DeviceUnavailable {
        reason: e.to_string(),
    })?;

    Ok(stream)
}

impl AudioOutput for CpalOutput {
    fn is_muted(&self) -> bool {
        // Desktop hosts expose no system-wide do-not-disturb query.
        false
    }

    fn write(&self, samples: &[i16]) -> Result<(), AudioError> {
        let mut queue = self.queue.lock().map_err(|_| AudioError::WriteFailed {
            reason: "output queue mutex poisoned".to_string(),
        })?;
        queue.extend(samples.iter().copied());
        Ok(())
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}
