//! Offline rendering: runs the mixer against a [`ManualClock`] and writes
//! what an output device would have heard.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use log::info;

use crate::error::MixerError;
use crate::mixer::clock::ManualClock;
use crate::mixer::Mixer;

/// What to render and how often to trigger the scheduled effect.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub duration: Duration,
    pub cycle: Duration,
    pub effect: Option<String>,
    pub effect_interval: Duration,
}

/// Result of a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    /// Frames (samples per channel) rendered.
    pub frames: usize,
    pub effects_triggered: usize,
    pub peak: f32,
}

/// Error type for offline rendering.
#[derive(Debug)]
pub enum RenderError {
    Mixer(MixerError),
    Wav(hound::Error),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mixer(err) => write!(f, "{}", err),
            Self::Wav(err) => write!(f, "wav error: {}", err),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<MixerError> for RenderError {
    fn from(value: MixerError) -> Self {
        Self::Mixer(value)
    }
}

impl From<hound::Error> for RenderError {
    fn from(value: hound::Error) -> Self {
        Self::Wav(value)
    }
}

/// Render `plan.duration` of audio into an interleaved vector.
///
/// `clock` must be the clock the mixer was initialized with. Each step
/// triggers any due effects, produces, then advances the clock by one cycle.
/// The cycle is kept between one sample period and the buffer length.
///
/// # Errors
/// Returns [`MixerError::ShutDown`] for a stopped mixer and any error from
/// triggering the scheduled effect.
pub fn render_frames(
    mixer: &Mixer,
    clock: &ManualClock,
    plan: &RenderPlan,
) -> Result<(Vec<f32>, RenderSummary), MixerError> {
    if mixer.is_shut_down() {
        return Err(MixerError::ShutDown);
    }

    let spec = mixer.spec();
    let channels = spec.channel_count();
    let frames = spec.samples_for_duration(plan.duration);
    // Shorter cycles than one sample period would never produce anything.
    let min_cycle = Duration::from_nanos(1_000_000_000 / spec.frequency as u64 + 1);
    // Longer cycles than the buffer would drop time the mixer cannot fill.
    let buffer_span = Duration::from_nanos(
        mixer.buffer_capacity() as u64 * 1_000_000_000 / spec.frequency as u64,
    );
    let cycle = plan.cycle.clamp(min_cycle, buffer_span.max(min_cycle));
    let interval = plan.effect_interval.max(Duration::from_millis(1));

    let mut out = Vec::with_capacity((frames + mixer.buffer_capacity()) * channels);
    let mut elapsed = Duration::ZERO;
    let mut next_trigger = Duration::ZERO;
    let mut effects_triggered = 0;

    while out.len() < frames * channels {
        if let Some(effect) = plan.effect.as_deref() {
            while elapsed >= next_trigger {
                mixer.request_playback(effect)?;
                effects_triggered += 1;
                next_trigger += interval;
            }
        }

        mixer.produce_interleaved(&mut out);
        clock.advance(cycle);
        elapsed += cycle;
    }
    out.truncate(frames * channels);

    let peak = out.iter().fold(0.0_f32, |peak, sample| peak.max(sample.abs()));
    Ok((
        out,
        RenderSummary {
            frames,
            effects_triggered,
            peak,
        },
    ))
}

/// Render to a 32-bit float WAV file at `path`.
pub fn render_to_wav(
    mixer: &Mixer,
    clock: &ManualClock,
    plan: &RenderPlan,
    path: &str,
) -> Result<RenderSummary, RenderError> {
    let (samples, summary) = render_frames(mixer, clock, plan)?;

    let spec = hound::WavSpec {
        channels: mixer.spec().channel_count() as u16,
        sample_rate: mixer.spec().frequency,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!(
        "rendered {} frame(s) to {} ({} effect trigger(s), peak {:.3})",
        summary.frames, path, summary.effects_triggered, summary.peak
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, MemoryLoader};
    use crate::audio::spec::AudioSpec;
    use crate::mixer::MixerConfig;
    use std::sync::Arc;

    fn mixer(clock: &ManualClock) -> Mixer {
        let loader = Arc::new(MemoryLoader::new());
        loader.insert("music", Asset::mono(1_000, vec![0.25]).unwrap());
        loader.insert("blip", Asset::mono(1_000, vec![0.5; 10]).unwrap());
        let config = MixerConfig::new(AudioSpec::mono(1_000), "music");
        Mixer::initialize(config, loader, Arc::new(clock.clone())).unwrap()
    }

    fn plan() -> RenderPlan {
        RenderPlan {
            duration: Duration::from_secs(1),
            cycle: Duration::from_millis(10),
            effect: Some("blip".to_string()),
            effect_interval: Duration::from_millis(500),
        }
    }

    #[test]
    fn scheduled_effects_land_where_the_device_would_play_them() {
        let clock = ManualClock::new();
        let mixer = mixer(&clock);

        let (out, summary) = render_frames(&mixer, &clock, &plan()).unwrap();
        assert_eq!(out.len(), 1_000);
        assert_eq!(summary.frames, 1_000);
        assert_eq!(summary.effects_triggered, 2);
        assert_eq!(summary.peak, 0.75);

        assert!(out[..10].iter().all(|s| *s == 0.75));
        assert_eq!(out[10], 0.25);
        // The second trigger lands behind the 100 ms of audio already queued.
        assert_eq!(out[589], 0.25);
        assert!(out[590..600].iter().all(|s| *s == 0.75));
        assert_eq!(out[600], 0.25);
    }

    #[test]
    fn cycles_longer_than_the_buffer_keep_the_timeline() {
        let clock = ManualClock::new();
        let mixer = mixer(&clock);
        let plan = RenderPlan {
            cycle: Duration::from_millis(300),
            ..plan()
        };

        let (out, summary) = render_frames(&mixer, &clock, &plan).unwrap();
        assert_eq!(out.len(), 1_000);
        assert_eq!(summary.effects_triggered, 2);
        assert_eq!(out[499], 0.25);
        assert!(out[500..510].iter().all(|s| *s == 0.75));
        assert_eq!(out[510], 0.25);
    }

    #[test]
    fn missing_effect_aborts_the_render() {
        let clock = ManualClock::new();
        let mixer = mixer(&clock);
        let plan = RenderPlan {
            effect: Some("nothing".to_string()),
            ..plan()
        };
        assert!(matches!(
            render_frames(&mixer, &clock, &plan),
            Err(MixerError::AssetLoad(_))
        ));
    }

    #[test]
    fn shut_down_mixers_cannot_render() {
        let clock = ManualClock::new();
        let mixer = mixer(&clock);
        mixer.shutdown();
        assert!(matches!(
            render_frames(&mixer, &clock, &plan()),
            Err(MixerError::ShutDown)
        ));
    }

    #[test]
    fn writes_a_float_wav() {
        let clock = ManualClock::new();
        let mixer = mixer(&clock);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.wav");
        let path = path.to_str().unwrap();

        let summary = render_to_wav(&mixer, &clock, &plan(), path).unwrap();
        let reader = hound::WavReader::open(path).unwrap();
        assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);
        assert_eq!(reader.spec().sample_rate, 1_000);
        assert_eq!(reader.len() as usize, summary.frames);
    }
}
