use nih_plug::prelude::*;
use std::ops::RangeInclusive;

/// Center frequency in Hz.
pub const FREQUENCY_RANGE: RangeInclusive<i32> = 20..=20_000;
/// Peak boost or cut in dB.
pub const GAIN_RANGE: RangeInclusive<f32> = -24.0..=24.0;
/// Gain moves in half dB steps on the host's controls.
pub const GAIN_STEP_DB: f32 = 0.5;
pub const Q_RANGE: RangeInclusive<f32> = 0.1..=100.0;

pub const DEFAULT_FREQUENCY_HZ: i32 = 1000;
pub const DEFAULT_GAIN_DB: f32 = 0.0;
pub const DEFAULT_Q: f32 = 1.0;

/// The three values the filter is designed from, as read at one block boundary.
///
/// Equality is exact on purpose: any difference at all, even in the last bit, is a change that
/// has to be designed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    /// Center frequency in Hz.
    pub frequency: i32,
    /// Peak boost (positive) or cut (negative) in dB.
    pub gain_db: f32,
    /// Bandwidth control, higher is narrower.
    pub q: f32,
}

impl ParameterSnapshot {
    pub fn new(frequency: i32, gain_db: f32, q: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q,
        }
    }

    /// Pulls every field into its declared range. NaN is left alone so callers can refuse it.
    pub fn clamped(self) -> Self {
        Self {
            frequency: clamp_frequency(self.frequency),
            gain_db: clamp_gain_db(self.gain_db),
            q: clamp_q(self.q),
        }
    }
}

pub fn clamp_frequency(frequency: i32) -> i32 {
    frequency.clamp(*FREQUENCY_RANGE.start(), *FREQUENCY_RANGE.end())
}

pub fn clamp_gain_db(gain_db: f32) -> f32 {
    gain_db.clamp(*GAIN_RANGE.start(), *GAIN_RANGE.end())
}

pub fn clamp_q(q: f32) -> f32 {
    q.clamp(*Q_RANGE.start(), *Q_RANGE.end())
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self::new(DEFAULT_FREQUENCY_HZ, DEFAULT_GAIN_DB, DEFAULT_Q)
    }
}

/// Host facing parameters. nih-plug stores every value atomically and persists them with the
/// plugin state, so the audio thread only ever does plain loads here.
#[derive(Params)]
pub struct PeakingEqParams {
    #[id = "freq"]
    pub frequency: IntParam,

    #[id = "gain"]
    pub gain: FloatParam,

    #[id = "q"]
    pub q: FloatParam,
}

impl PeakingEqParams {
    /// One load per parameter. Called once at the start of every block.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            frequency: self.frequency.value(),
            gain_db: self.gain.value(),
            q: self.q.value(),
        }
    }
}

impl Default for PeakingEqParams {
    fn default() -> Self {
        // No smoothers: a parameter change lands as a single coefficient jump at the next block
        Self {
            frequency: IntParam::new(
                "Frequency",
                DEFAULT_FREQUENCY_HZ,
                IntRange::Linear {
                    min: *FREQUENCY_RANGE.start(),
                    max: *FREQUENCY_RANGE.end(),
                },
            )
            .with_unit(" Hz"),

            gain: FloatParam::new(
                "Gain",
                DEFAULT_GAIN_DB,
                FloatRange::Linear {
                    min: *GAIN_RANGE.start(),
                    max: *GAIN_RANGE.end(),
                },
            )
            .with_step_size(GAIN_STEP_DB)
            .with_unit(" dB")
            .with_value_to_string(formatters::v2s_f32_rounded(1)),

            q: FloatParam::new(
                "Q",
                DEFAULT_Q,
                FloatRange::Skewed {
                    min: *Q_RANGE.start(),
                    max: *Q_RANGE.end(),
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_value_to_string(formatters::v2s_f32_rounded(2)),
        }
    }
}
