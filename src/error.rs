use thiserror::Error;

/// Reasons the coefficient designer refuses a parameter set.
///
/// Every variant means the previous coefficient set stays in place. None of these are ever
/// surfaced mid-stream.
#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum DesignError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("center frequency {frequency} Hz is outside (0, {nyquist}) Hz")]
    FrequencyOutOfRange { frequency: f32, nyquist: f32 },

    #[error("Q must be positive and finite, got {0}")]
    InvalidQ(f32),

    #[error("gain must be finite, got {0} dB")]
    InvalidGain(f32),

    #[error("the design produced non-finite coefficients")]
    NonFiniteCoefficients,
}

#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum EngineError {
    #[error("the equalizer needs at least one channel")]
    NoChannels,

    #[error("the equalizer has not been configured")]
    Unconfigured,

    #[error("buffer has {actual} channels but the equalizer was configured for {expected}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("{frequency} Hz with Q {q} puts a pole on or outside the unit circle")]
    Unstable { frequency: i32, q: f32 },

    #[error("parameter change rejected: {0}")]
    Rejected(#[from] DesignError),
}

impl EngineError {
    /// `true` for refused parameter changes, where the engine keeps running on its previous
    /// coefficients. Everything else is a precondition the caller broke.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Unstable { .. })
    }
}
