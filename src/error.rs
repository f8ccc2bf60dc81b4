use std::fmt;

#[derive(Debug)]
pub enum FeedbackError {
    /// The orchestrator was released and can no longer be used.
    Disposed,
    Audio(AudioError),
}

#[derive(Debug)]
pub enum AudioError {
    DeviceUnavailable { reason: String },
    WriteFailed { reason: String },
    /// The output device was released.
    Closed,
}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackError::Disposed => write!(f, "feedback engine has been released"),
            FeedbackError::Audio(e) => write!(f, "Audio error: {e}"),
        }
    }
}

impl std::error::Error for FeedbackError {}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::DeviceUnavailable { reason } => {
                write!(f, "Audio output device unavailable: {reason}")
            }
            AudioError::WriteFailed { reason } => write!(f, "Audio write failed: {reason}"),
            AudioError::Closed => write!(f, "Audio output device has been released"),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<AudioError> for FeedbackError {
    fn from(e: AudioError) -> Self {
        FeedbackError::Audio(e)
    }
}
