use thiserror::Error;
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("sample rate must be greater than zero, got {0}")]
    InvalidSampleRate(f64),
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("acquisition frame carries no samples")]
    EmptyFrame,
    #[error("frame length {0} is not a positive even number of points")]
    InvalidFrameLength(usize),
    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
