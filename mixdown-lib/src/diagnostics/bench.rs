//! Synthetic benchmarks for the mixing loop.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::asset::{Asset, MemoryLoader};
use crate::audio::spec::{AudioSpec, Channel};
use crate::mixer::clock::ManualClock;
use crate::mixer::{Mixer, MixerConfig};

/// Configuration parameters for a mixing benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct MixBenchConfig {
    pub frequency: u32,
    pub channels: usize,
    pub buffer_ms: u32,
    pub effects: usize,
    pub iterations: usize,
}

/// Timing results from a benchmark run.
#[derive(Debug, Clone, Copy)]
pub struct MixBenchResult {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub audio_time_ms: f64,
    pub rt_factor: f64,
}

const LAYOUT: [Channel; 6] = [
    Channel::FrontLeft,
    Channel::FrontRight,
    Channel::FrontCentre,
    Channel::Lfe,
    Channel::RearLeft,
    Channel::RearRight,
];

fn noise(frequency: u32, channels: usize, seconds: f32) -> Option<Asset> {
    let len = (frequency as f32 * seconds).max(1.0) as usize;
    let mut rng = rand::thread_rng();
    let data = (0..channels)
        .map(|_| (0..len).map(|_| rng.gen_range(-0.5_f32..0.5_f32)).collect())
        .collect();
    Asset::from_channels(frequency, data).ok()
}

/// Time full-buffer productions with `effects` one-shots playing.
///
/// Returns `None` if the benchmark mixer cannot be built from the config.
pub fn bench_mixer(config: MixBenchConfig) -> Option<MixBenchResult> {
    let channels = config.channels.clamp(1, LAYOUT.len());
    let spec = AudioSpec::new(config.frequency, LAYOUT[..channels].to_vec());

    let loader = Arc::new(MemoryLoader::new());
    loader.insert("music", noise(config.frequency, channels, 2.0)?);
    let effect = loader.insert("effect", noise(config.frequency, channels, 60.0)?);

    let clock = ManualClock::new();
    let mixer_config = MixerConfig::new(spec, "music").with_buffer_ms(config.buffer_ms);
    let mixer = Mixer::initialize(mixer_config, loader, Arc::new(clock.clone())).ok()?;
    for _ in 0..config.effects {
        mixer.play(effect.clone()).ok()?;
    }

    let block = Duration::from_millis(config.buffer_ms as u64);
    let mut times: Vec<f64> = Vec::with_capacity(config.iterations.max(1));
    let mut out = Vec::new();
    mixer.produce_interleaved(&mut out);

    for _ in 0..config.iterations.max(1) {
        out.clear();
        clock.advance(block);
        let start = std::time::Instant::now();
        let _ = mixer.produce_interleaved(&mut out);
        times.push(start.elapsed().as_secs_f64() * 1000.0);
    }

    let min_ms = times.iter().copied().fold(f64::INFINITY, |a, b| a.min(b));
    let max_ms = times.iter().copied().fold(0.0_f64, |a, b| a.max(b));
    let avg_ms = times.iter().sum::<f64>() / times.len() as f64;
    let audio_time_ms = config.buffer_ms as f64;
    let rt_factor = if audio_time_ms > 0.0 {
        avg_ms / audio_time_ms
    } else {
        0.0
    };

    Some(MixBenchResult {
        avg_ms,
        min_ms: if min_ms.is_finite() { min_ms } else { 0.0 },
        max_ms,
        audio_time_ms,
        rt_factor,
    })
}

/// Run the benchmark for several effect counts using a shared base config.
pub fn bench_mixer_sweep(
    base: MixBenchConfig,
    effect_counts: &[usize],
) -> Vec<(usize, MixBenchResult)> {
    let mut results = Vec::new();
    for &effects in effect_counts {
        let config = MixBenchConfig { effects, ..base };
        if let Some(result) = bench_mixer(config) {
            results.push((effects, result));
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bench_reports_sane_timings() {
        let result = bench_mixer(MixBenchConfig {
            frequency: 8_000,
            channels: 2,
            buffer_ms: 50,
            effects: 4,
            iterations: 3,
        })
        .expect("bench runs");
        assert!(result.min_ms <= result.avg_ms);
        assert!(result.avg_ms <= result.max_ms);
        assert_eq!(result.audio_time_ms, 50.0);
    }
}
