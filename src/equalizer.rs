use crate::biquad::{Coefficients, DelayState};
use crate::error::{DesignError, EngineError};
use crate::params::ParameterSnapshot;

/// The single band filter engine that runs on the audio thread.
///
/// Lifecycle per session: [`configure()`][Self::configure] once the host has settled on a channel
/// count and sample rate, then for every block [`notify_parameter_change()`][Self::notify_parameter_change]
/// followed by [`process_block()`][Self::process_block]. [`reset()`][Self::reset] clears the filter
/// memory whenever playback restarts.
///
/// Nothing past `configure()` allocates or blocks.
#[derive(Debug, Clone)]
pub struct PeakingEqualizer {
    /// `None` until the first successful `configure()`.
    sample_rate: Option<f32>,
    /// One delay line per channel, sized by `configure()`.
    channels: Vec<DelayState>,

    coefficients: Coefficients,
    /// The snapshot `coefficients` were designed from.
    applied: Option<ParameterSnapshot>,
    /// The last snapshot handed in, including one the designer refused. Change detection runs
    /// against this so a refused snapshot is not redesigned every block.
    observed: Option<ParameterSnapshot>,
    coefficient_updates: u64,
}

impl PeakingEqualizer {
    pub fn new() -> Self {
        Self {
            sample_rate: None,
            channels: Vec::new(),
            coefficients: Coefficients::PASSTHROUGH,
            applied: None,
            observed: None,
            coefficient_updates: 0,
        }
    }

    /// (Re)sizes the delay lines for `channel_count` channels and zeroes them.
    ///
    /// The coefficients fall back to passthrough and the next parameter notification always
    /// redesigns, since the old design belongs to the old sample rate. On error the previous
    /// configuration is kept.
    pub fn configure(&mut self, channel_count: usize, sample_rate: f32) -> Result<(), EngineError> {
        if channel_count == 0 {
            return Err(EngineError::NoChannels);
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DesignError::InvalidSampleRate(sample_rate).into());
        }

        self.channels.clear();
        self.channels.resize(channel_count, DelayState::new());
        self.sample_rate = Some(sample_rate);
        self.coefficients = Coefficients::PASSTHROUGH;
        self.applied = None;
        self.observed = None;

        Ok(())
    }

    /// Redesigns the filter if `snapshot` differs from the one seen last.
    ///
    /// Returns `Ok(true)` when new coefficients were swapped in and `Ok(false)` when nothing
    /// changed. A snapshot that can't be designed, or whose design would be unstable, leaves the
    /// current coefficients in place and is reported once; handing in the same snapshot again is
    /// then a no-op, and so is returning to the snapshot the current coefficients came from. Call
    /// this at most once per block, before [`process_block()`][Self::process_block].
    pub fn notify_parameter_change(
        &mut self,
        snapshot: ParameterSnapshot,
    ) -> Result<bool, EngineError> {
        let sample_rate = self.sample_rate.ok_or(EngineError::Unconfigured)?;
        if self.observed == Some(snapshot) {
            return Ok(false);
        }
        self.observed = Some(snapshot);
        if self.applied == Some(snapshot) {
            return Ok(false);
        }

        let coefficients = Coefficients::peaking(snapshot, sample_rate)?;
        if !coefficients.is_stable() {
            return Err(EngineError::Unstable {
                frequency: snapshot.frequency,
                q: snapshot.q,
            });
        }
        self.coefficients = coefficients;
        self.applied = Some(snapshot);
        self.coefficient_updates += 1;

        Ok(true)
    }

    /// Filters every channel in place. `channels` must hold exactly as many channels as the
    /// engine was configured for. On error the buffer is left untouched.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) -> Result<(), EngineError> {
        if self.sample_rate.is_none() {
            return Err(EngineError::Unconfigured);
        }
        if channels.len() != self.channels.len() {
            return Err(EngineError::ChannelMismatch {
                expected: self.channels.len(),
                actual: channels.len(),
            });
        }

        let coefficients = self.coefficients;
        for (samples, state) in channels.iter_mut().zip(self.channels.iter_mut()) {
            // Sample order within a channel matters, every output feeds the next one
            for sample in samples.iter_mut() {
                *sample = state.process_sample(*sample, &coefficients);
            }
        }

        Ok(())
    }

    /// Zeroes every channel's delay line. Coefficients are kept.
    pub fn reset(&mut self) {
        for state in self.channels.iter_mut() {
            state.reset();
        }
    }

    pub fn is_configured(&self) -> bool {
        self.sample_rate.is_some()
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn applied_snapshot(&self) -> Option<ParameterSnapshot> {
        self.applied
    }

    pub fn delay_state(&self, channel: usize) -> Option<&DelayState> {
        self.channels.get(channel)
    }

    /// How many times new coefficients have been swapped in since construction.
    pub fn coefficient_updates(&self) -> u64 {
        self.coefficient_updates
    }
}

impl Default for PeakingEqualizer {
    fn default() -> Self {
        Self::new()
    }
}
