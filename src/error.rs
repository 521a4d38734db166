use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// No output device could be acquired (missing, busy, or unreadable config).
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device was found but the processing graph or its stream could not be built.
    #[error("processing unit failed to load: {0}")]
    ProcessingUnitLoadFailed(String),

    /// A stream was built but refused to start playing.
    #[error("audio stream failed: {0}")]
    StreamFailed(String),

    #[error("invalid render config: {0}")]
    InvalidRenderConfig(String),

    #[error("WAV encoding failed: {0}")]
    WavEncodeFailed(String),
}
