use nih_plug::prelude::*;
use std::sync::Arc;

pub mod biquad;
pub mod equalizer;
pub mod error;
pub mod params;
pub mod store;

pub use biquad::{design_peaking, Coefficients, DelayState};
pub use equalizer::PeakingEqualizer;
pub use error::{DesignError, EngineError};
pub use params::{ParameterSnapshot, PeakingEqParams};
pub use store::ParameterStore;

/// A single band peaking equalizer: boost or cut around a center frequency with adjustable Q.
pub struct PeakingEq {
    params: Arc<PeakingEqParams>,
    equalizer: PeakingEqualizer,
}

impl Default for PeakingEq {
    fn default() -> Self {
        // The engine stays unconfigured until the host calls `initialize`
        Self {
            params: Arc::new(PeakingEqParams::default()),
            equalizer: PeakingEqualizer::new(),
        }
    }
}

impl Plugin for PeakingEq {
    const NAME: &'static str = "Peaking EQ";
    const VENDOR: &'static str = "Kakeru3";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    // Coefficients are refreshed once per host block, splitting blocks on automation would
    // only add redesigns
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let channel_count = audio_io_layout
            .main_output_channels
            .map(NonZeroU32::get)
            .unwrap_or(0) as usize;

        if let Err(err) = self
            .equalizer
            .configure(channel_count, buffer_config.sample_rate)
        {
            nih_warn!("Refusing configuration: {err}");
            return false;
        }
        nih_log!(
            "Configured for {} channel(s) at {} Hz",
            channel_count,
            buffer_config.sample_rate
        );

        // Design up front so the first block doesn't have to. A refusal here only means the
        // current frequency can't be realized at this sample rate, audio passes through until the
        // parameters change
        let snapshot = self.params.snapshot();
        if let Err(err) = self.equalizer.notify_parameter_change(snapshot) {
            nih_warn!("Initial parameters {snapshot:?} not usable: {err}");
        }

        true
    }

    fn reset(&mut self) {
        self.equalizer.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One read per block, a value published mid-block lands at the next one
        let snapshot = self.params.snapshot();
        match self.equalizer.notify_parameter_change(snapshot) {
            // A refused design keeps the previous coefficients
            Ok(_) => (),
            Err(err) if err.is_recoverable() => (),
            Err(_) => return ProcessStatus::Error("process called before initialize"),
        }

        match self.equalizer.process_block(buffer.as_slice()) {
            Ok(()) => ProcessStatus::Normal,
            Err(EngineError::ChannelMismatch { .. }) => {
                ProcessStatus::Error("channel count changed without reinitializing")
            }
            Err(_) => ProcessStatus::Error("process called before initialize"),
        }
    }
}

impl ClapPlugin for PeakingEq {
    const CLAP_ID: &'static str = "com.kakeru3.peaking-eq";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Single band parametric equalizer with frequency, gain and Q");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Equalizer,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for PeakingEq {
    const VST3_CLASS_ID: [u8; 16] = *b"PeakingEqKakeru3";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Eq];
}

nih_export_clap!(PeakingEq);
nih_export_vst3!(PeakingEq);
