use std::f32::consts::PI;

use crate::error::DesignError;
use crate::params::ParameterSnapshot;

/// One designed peaking section. Replaced wholesale on every redesign, never patched in place.
///
/// The recursion produces a band signal `z` from `a0..a2` (feedforward) and `b1, b2` (feedback),
/// and the output mixes it back with the dry input: `out = z * c0 + x * d0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub b1: f32,
    pub b2: f32,
    pub c0: f32,
    pub d0: f32,
}

impl Coefficients {
    /// Mixes none of the band signal back in, so the output is the input.
    pub const PASSTHROUGH: Self = Self {
        a0: 0.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
        c0: 0.0,
        d0: 1.0,
    };

    pub fn peaking(snapshot: ParameterSnapshot, sample_rate: f32) -> Result<Self, DesignError> {
        design_peaking(
            snapshot.frequency as f32,
            snapshot.gain_db,
            snapshot.q,
            sample_rate,
        )
    }

    pub fn is_finite(&self) -> bool {
        [self.a0, self.a1, self.a2, self.b1, self.b2, self.c0, self.d0]
            .iter()
            .all(|c| c.is_finite())
    }

    /// Both poles of `1 + b1 z^-1 + b2 z^-2` strictly inside the unit circle. Low Q near the top
    /// of the band pushes the tangent in the design past its first pole and fails this.
    pub fn is_stable(&self) -> bool {
        self.b2.abs() < 1.0 && self.b1.abs() < 1.0 + self.b2
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// Peaking equalizer through the bilinear transform.
///
/// Pure and allocation free, so it can run on the audio thread or anywhere else. Nothing is
/// clamped here: arguments outside the domain are refused, never bent into it. Every frequency
/// below Nyquist with a positive Q designs, stable or not; whether a design may reach the audio
/// path is the engine's call (see [`Coefficients::is_stable()`]).
pub fn design_peaking(
    frequency: f32,
    gain_db: f32,
    q: f32,
    sample_rate: f32,
) -> Result<Coefficients, DesignError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(DesignError::InvalidSampleRate(sample_rate));
    }
    if !(q.is_finite() && q > 0.0) {
        return Err(DesignError::InvalidQ(q));
    }
    if !gain_db.is_finite() {
        return Err(DesignError::InvalidGain(gain_db));
    }

    // At Nyquist the tangent below sits on its pole and still returns a finite (huge) number,
    // so the bound has to be checked up front
    let nyquist = sample_rate / 2.0;
    if !(frequency > 0.0 && frequency < nyquist) {
        return Err(DesignError::FrequencyOutOfRange { frequency, nyquist });
    }

    let theta = 2.0 * PI * frequency / sample_rate;
    let mu = 10f32.powf(gain_db / 20.0);
    let xi = 4.0 / (1.0 + mu);
    let tan = (theta / (2.0 * q)).tan();
    let beta = 0.5 * ((1.0 - xi * tan) / (1.0 + xi * tan));
    let gamma = (0.5 + beta) * theta.cos();

    let coefficients = Coefficients {
        a0: 0.5 - beta,
        a1: 0.0,
        a2: -(0.5 - beta),
        b1: -2.0 * gamma,
        b2: 2.0 * beta,
        c0: mu - 1.0,
        d0: 1.0,
    };

    if !coefficients.is_finite() {
        return Err(DesignError::NonFiniteCoefficients);
    }

    Ok(coefficients)
}

/// Direct form I memory for one channel: the last two inputs and the last two band outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DelayState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl DelayState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32, coefficients: &Coefficients) -> f32 {
        let c = coefficients;
        let z = c.a0 * x + c.a1 * self.x1 + c.a2 * self.x2 - c.b1 * self.y1 - c.b2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = z;

        z * c.c0 + x * c.d0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `true` when every tap is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.x1 == 0.0 && self.x2 == 0.0 && self.y1 == 0.0 && self.y2 == 0.0
    }

    /// `(x[n-1], x[n-2], z[n-1], z[n-2])`
    pub fn taps(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.x2, self.y1, self.y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The closed form evaluated in double precision.
    fn reference(frequency: f64, gain_db: f64, q: f64, sample_rate: f64) -> (f64, f64) {
        let theta = 2.0 * std::f64::consts::PI * frequency / sample_rate;
        let mu = 10f64.powf(gain_db / 20.0);
        let xi = 4.0 / (1.0 + mu);
        let tan = (theta / (2.0 * q)).tan();
        let beta = 0.5 * (1.0 - xi * tan) / (1.0 + xi * tan);
        let gamma = (0.5 + beta) * theta.cos();
        (beta, gamma)
    }

    #[test]
    fn matches_closed_form_at_1khz() {
        let c = design_peaking(1000.0, 6.0, 1.0, 44100.0).unwrap();
        let (beta, gamma) = reference(1000.0, 6.0, 1.0, 44100.0);

        assert!((c.b1 as f64 - (-2.0 * gamma)).abs() < 1e-5);
        assert!((c.b2 as f64 - 2.0 * beta).abs() < 1e-5);
        assert!((c.a0 as f64 - (0.5 - beta)).abs() < 1e-5);
        assert!((c.a2 as f64 + (0.5 - beta)).abs() < 1e-5);
        assert_eq!(c.a1, 0.0);
        assert_eq!(c.d0, 1.0);
        assert!((c.c0 as f64 - (10f64.powf(6.0 / 20.0) - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn identical_inputs_give_identical_bits() {
        let first = design_peaking(3150.0, -7.5, 2.3, 48000.0).unwrap();
        let second = design_peaking(3150.0, -7.5, 2.3, 48000.0).unwrap();

        assert_eq!(first.b1.to_bits(), second.b1.to_bits());
        assert_eq!(first.b2.to_bits(), second.b2.to_bits());
        assert_eq!(first.a0.to_bits(), second.a0.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn nyquist_is_rejected() {
        assert_eq!(
            design_peaking(22050.0, 6.0, 1.0, 44100.0),
            Err(DesignError::FrequencyOutOfRange {
                frequency: 22050.0,
                nyquist: 22050.0
            })
        );
        assert!(design_peaking(30000.0, 0.0, 1.0, 44100.0).is_err());
    }

    #[test]
    fn top_of_range_below_nyquist_is_finite() {
        let c = design_peaking(20000.0, 12.0, 1.0, 44100.0).unwrap();
        assert!(c.is_finite());
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert_eq!(
            design_peaking(1000.0, 0.0, 1.0, 0.0),
            Err(DesignError::InvalidSampleRate(0.0))
        );
        assert_eq!(
            design_peaking(1000.0, 0.0, 0.0, 44100.0),
            Err(DesignError::InvalidQ(0.0))
        );
        assert_eq!(
            design_peaking(1000.0, 0.0, -1.0, 44100.0),
            Err(DesignError::InvalidQ(-1.0))
        );
        assert!(matches!(
            design_peaking(1000.0, f32::NAN, 1.0, 44100.0),
            Err(DesignError::InvalidGain(_))
        ));
        assert!(matches!(
            design_peaking(0.0, 0.0, 1.0, 44100.0),
            Err(DesignError::FrequencyOutOfRange { .. })
        ));
    }

    #[test]
    fn low_q_in_the_upper_band_designs_but_is_unstable() {
        let c = design_peaking(3000.0, 6.0, 0.1, 44100.0).unwrap();
        assert!(c.is_finite());
        assert!(!c.is_stable());

        let c = design_peaking(20000.0, 6.0, 0.5, 44100.0).unwrap();
        assert!(c.is_finite());
        assert!(!c.is_stable());
    }

    #[test]
    fn ordinary_designs_are_stable() {
        for (frequency, q) in [(20.0, 100.0), (1000.0, 1.0), (20000.0, 1.0), (300.0, 0.1)] {
            let c = design_peaking(frequency, 12.0, q, 44100.0).unwrap();
            assert!(c.is_stable(), "{frequency} Hz, Q {q}");
        }
    }

    #[test]
    fn zero_gain_mixes_no_band_signal() {
        let c = design_peaking(500.0, 0.0, 4.0, 44100.0).unwrap();
        assert_eq!(c.c0, 0.0);
        assert_eq!(c.d0, 1.0);
    }

    #[test]
    fn peaking_uses_snapshot_fields() {
        let snapshot = ParameterSnapshot::new(2000, -3.0, 0.5);
        assert_eq!(
            Coefficients::peaking(snapshot, 96000.0),
            design_peaking(2000.0, -3.0, 0.5, 96000.0)
        );
    }

    #[test]
    fn passthrough_returns_input() {
        let mut state = DelayState::new();
        for i in 0..16 {
            let x = (i as f32 * 0.37).sin();
            assert_eq!(state.process_sample(x, &Coefficients::PASSTHROUGH), x);
        }
    }

    #[test]
    fn delay_taps_shift_one_sample_per_call() {
        let c = design_peaking(1000.0, 6.0, 1.0, 44100.0).unwrap();
        let mut state = DelayState::new();

        state.process_sample(1.0, &c);
        let (x1, x2, y1, y2) = state.taps();
        assert_eq!((x1, x2), (1.0, 0.0));
        assert_eq!(y1, c.a0);
        assert_eq!(y2, 0.0);

        state.process_sample(0.5, &c);
        let (x1, x2, _, y2) = state.taps();
        assert_eq!((x1, x2), (0.5, 1.0));
        assert_eq!(y2, c.a0);
    }

    #[test]
    fn impulse_response_follows_the_recursion() {
        let c = design_peaking(1000.0, 6.0, 1.0, 44100.0).unwrap();
        let mut state = DelayState::new();

        let out0 = state.process_sample(1.0, &c);
        let z0 = c.a0;
        assert!((out0 - (z0 * c.c0 + 1.0)).abs() < 1e-7);

        let out1 = state.process_sample(0.0, &c);
        let z1 = c.a1 - c.b1 * z0;
        assert!((out1 - z1 * c.c0).abs() < 1e-7);

        let out2 = state.process_sample(0.0, &c);
        let z2 = c.a2 - c.b1 * z1 - c.b2 * z0;
        assert!((out2 - z2 * c.c0).abs() < 1e-7);
    }

    #[test]
    fn reset_clears_every_tap() {
        let c = design_peaking(250.0, -12.0, 0.7, 48000.0).unwrap();
        let mut state = DelayState::new();
        for _ in 0..32 {
            state.process_sample(0.8, &c);
        }
        assert!(!state.is_silent());

        state.reset();
        assert!(state.is_silent());
    }
}
