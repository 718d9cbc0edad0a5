//! Real-time mixer for a looping background track and one-shot effects.
//!
//! A [`Mixer`] is shared between one output context, which calls
//! [`Mixer::produce`] once per cycle, and any number of contexts calling
//! [`Mixer::request_playback`]. All mutable state sits behind a single
//! mutex; asset decoding happens before that mutex is taken.

pub mod clock;
mod state;

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::asset::{Asset, AssetLoader, CachingLoader, SymphoniaLoader};
use crate::audio::buffer::MasterTrack;
use crate::audio::spec::AudioSpec;
use crate::constants::DEFAULT_BUFFER_MS;
use crate::error::MixerError;

use self::clock::{Clock, SystemClock};
use self::state::{MixState, Voice};

/// Everything needed to bring up a mixer.
#[derive(Debug, Clone, PartialEq)]
pub struct MixerConfig {
    pub spec: AudioSpec,
    /// Path of the looping background track, resolved by the loader.
    pub background: String,
    /// Length of the master buffer in milliseconds.
    pub buffer_ms: u32,
}

impl MixerConfig {
    pub fn new(spec: AudioSpec, background: &str) -> Self {
        Self {
            spec,
            background: background.to_string(),
            buffer_ms: DEFAULT_BUFFER_MS,
        }
    }

    pub fn with_buffer_ms(mut self, buffer_ms: u32) -> Self {
        self.buffer_ms = buffer_ms;
        self
    }
}

/// Software mixer producing PCM blocks on demand.
pub struct Mixer {
    spec: AudioSpec,
    loader: Arc<dyn AssetLoader>,
    clock: Arc<dyn Clock>,
    state: Mutex<MixState>,
}

impl Mixer {
    /// Validate and echo the output spec the mixer will run with.
    ///
    /// # Errors
    /// Returns [`MixerError::InvalidSpec`] for a zero frequency or an empty
    /// or repeated channel set.
    pub fn configure(spec: AudioSpec) -> Result<AudioSpec, MixerError> {
        spec.validate()?;
        Ok(spec)
    }

    /// Bring up a mixer that decodes files from disk and paces itself by the
    /// system clock.
    pub fn open(config: MixerConfig) -> Result<Self, MixerError> {
        let loader = CachingLoader::new(SymphoniaLoader::new(config.spec.clone()));
        Self::initialize(config, Arc::new(loader), Arc::new(SystemClock))
    }

    /// Load the background track, allocate the master buffer and start the
    /// pacing clock.
    ///
    /// # Errors
    /// Returns [`MixerError::InvalidSpec`] when the spec or buffer length is
    /// unusable, [`MixerError::AssetLoad`] when the background cannot be
    /// loaded, and [`MixerError::ChannelMismatch`] when its channel count
    /// differs from the spec. No mixer exists after a failure.
    pub fn initialize(
        config: MixerConfig,
        loader: Arc<dyn AssetLoader>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MixerError> {
        let MixerConfig {
            spec,
            background,
            buffer_ms,
        } = config;
        let spec = Self::configure(spec)?;

        let capacity = spec.samples_for_ms(buffer_ms);
        if capacity == 0 {
            return Err(MixerError::InvalidSpec(format!(
                "a {} ms buffer holds no samples at {} Hz",
                buffer_ms, spec.frequency
            )));
        }

        let music = loader.load(&background).map_err(|err| {
            warn!("failed to load background {}: {}", background, err);
            MixerError::from(err)
        })?;
        check_channels(&spec, &background, &music)?;

        info!(
            "mixer ready: {} Hz, {} channel(s), buffer {} samples, background {} ({} samples)",
            spec.frequency,
            spec.channel_count(),
            capacity,
            background,
            music.duration_samples()
        );

        let master = MasterTrack::new(&spec.channels, capacity);
        let state = MixState::new(master, music, clock.now());

        Ok(Self {
            spec,
            loader,
            clock,
            state: Mutex::new(state),
        })
    }

    /// Mix every sample due since the previous call.
    ///
    /// Returns the number of samples written and a copy of the master buffer.
    /// Only the first `count` samples of each channel belong to this call.
    /// The copy allocates the whole buffer; output loops should use
    /// [`produce_interleaved`](Self::produce_interleaved) instead.
    pub fn produce(&self) -> (usize, MasterTrack) {
        let mut state = self.lock_state();
        let samples = self.mix_locked(&mut state);
        (samples, state.master.clone())
    }

    /// Like [`produce`](Self::produce) but appends the new samples to `out`,
    /// interleaved by channel, without copying the whole buffer.
    pub fn produce_interleaved(&self, out: &mut Vec<f32>) -> usize {
        let mut state = self.lock_state();
        let samples = self.mix_locked(&mut state);
        state.master.interleave_into(samples, out);
        samples
    }

    /// Load `path` and start it as a one-shot effect.
    ///
    /// # Errors
    /// Returns [`MixerError::AssetLoad`] or [`MixerError::ChannelMismatch`]
    /// when the asset cannot be used and [`MixerError::ShutDown`] after
    /// [`shutdown`](Self::shutdown). Nothing is queued on error.
    pub fn request_playback(&self, path: &str) -> Result<(), MixerError> {
        if self.is_shut_down() {
            return Err(MixerError::ShutDown);
        }

        let asset = self.loader.load(path).map_err(|err| {
            warn!("failed to load effect {}: {}", path, err);
            MixerError::from(err)
        })?;
        check_channels(&self.spec, path, &asset)?;
        self.push_effect(asset)?;
        debug!("effect started: {}", path);
        Ok(())
    }

    /// Load `path` through the loader without playing it, so a caching loader
    /// has it ready for later requests.
    ///
    /// # Errors
    /// Same load and channel errors as [`request_playback`](Self::request_playback).
    pub fn preload(&self, path: &str) -> Result<(), MixerError> {
        let asset = self.loader.load(path)?;
        check_channels(&self.spec, path, &asset)
    }

    /// Start an already loaded asset as a one-shot effect.
    ///
    /// # Errors
    /// Returns [`MixerError::ChannelMismatch`] or [`MixerError::ShutDown`].
    pub fn play(&self, asset: Arc<Asset>) -> Result<(), MixerError> {
        check_channels(&self.spec, "<asset>", &asset)?;
        self.push_effect(asset)
    }

    fn push_effect(&self, asset: Arc<Asset>) -> Result<(), MixerError> {
        let mut state = self.lock_state();
        if state.shut_down {
            return Err(MixerError::ShutDown);
        }
        state.effects.push(Voice::new(asset));
        Ok(())
    }

    /// Drop all playing effects and stop producing audio.
    pub fn shutdown(&self) {
        let mut state = self.lock_state();
        if state.shut_down {
            return;
        }
        let dropped = state.effects.len();
        state.effects.clear();
        state.pending_samples = 0;
        state.shut_down = true;
        info!("mixer shut down ({} effect(s) dropped)", dropped);
    }

    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    /// Master buffer length in samples per channel.
    pub fn buffer_capacity(&self) -> usize {
        self.lock_state().master.capacity()
    }

    /// Number of effects still playing.
    pub fn active_effects(&self) -> usize {
        self.lock_state().effects.len()
    }

    /// Read position in the background track.
    pub fn background_cursor(&self) -> usize {
        self.lock_state().background.cursor
    }

    /// Samples produced but not yet consumed according to the clock.
    pub fn pending_samples(&self) -> usize {
        self.lock_state().pending_samples as usize
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock_state().shut_down
    }

    fn mix_locked(&self, state: &mut MixState) -> usize {
        let now = self.clock.now();
        if state.shut_down {
            state.last_time = now;
            return 0;
        }

        let samples = state.samples_due(now, self.spec.frequency);
        let retired = state.fill(samples);
        if retired > 0 {
            debug!(
                "{} effect(s) finished, {} still playing",
                retired,
                state.effects.len()
            );
        }
        samples
    }

    // A panic on another thread must not silence the output.
    fn lock_state(&self) -> MutexGuard<'_, MixState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn check_channels(spec: &AudioSpec, path: &str, asset: &Asset) -> Result<(), MixerError> {
    if asset.channel_count() != spec.channel_count() {
        return Err(MixerError::ChannelMismatch {
            path: path.to_string(),
            expected: spec.channel_count(),
            found: asset.channel_count(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetLoadError, MemoryLoader};
    use crate::mixer::clock::ManualClock;
    use std::thread;
    use std::time::Duration;

    const BACKGROUND: [f32; 4] = [0.5, -0.5, 0.25, -0.25];

    fn mono_mixer(
        frequency: u32,
        buffer_ms: u32,
        background: Vec<f32>,
    ) -> (Mixer, Arc<MemoryLoader>, ManualClock) {
        let loader = Arc::new(MemoryLoader::new());
        loader.insert("music", Asset::mono(frequency, background).unwrap());
        let clock = ManualClock::new();
        let config = MixerConfig::new(AudioSpec::mono(frequency), "music").with_buffer_ms(buffer_ms);
        let mixer = Mixer::initialize(config, loader.clone(), Arc::new(clock.clone()))
            .expect("initialize mixer");
        (mixer, loader, clock)
    }

    #[test]
    fn configure_echoes_valid_specs() {
        let spec = AudioSpec::stereo(48_000);
        assert_eq!(Mixer::configure(spec.clone()).unwrap(), spec);
        assert!(Mixer::configure(AudioSpec::stereo(0)).is_err());
    }

    #[test]
    fn default_buffer_is_a_tenth_of_a_second() {
        let (mixer, _, _) = mono_mixer(44_100, DEFAULT_BUFFER_MS, BACKGROUND.to_vec());
        assert_eq!(mixer.buffer_capacity(), 4_410);
    }

    #[test]
    fn background_cycles_after_a_tenth_of_a_second() {
        let (mixer, _, clock) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        clock.advance(Duration::from_millis(100));

        let (produced, track) = mixer.produce();
        assert!(produced <= 4_410);
        assert!(produced > 0);
        for (slot, sample) in track.channel(0)[..produced].iter().enumerate() {
            assert_eq!(*sample, BACKGROUND[slot % 4]);
        }
        assert_eq!(mixer.background_cursor(), produced % 4);
    }

    #[test]
    fn zero_elapsed_time_produces_nothing() {
        let (mixer, _, _) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        let (first, _) = mixer.produce();
        assert_eq!(first, 4_410);

        let cursor = mixer.background_cursor();
        let (second, _) = mixer.produce();
        assert_eq!(second, 0);
        assert_eq!(mixer.background_cursor(), cursor);
    }

    #[test]
    fn production_stays_within_capacity() {
        let (mixer, _, clock) = mono_mixer(1_000, 100, BACKGROUND.to_vec());
        let steps = [0, 1, 7, 50, 99, 100, 101, 250, 3_600_000, 0, 3];
        let mut cursor = mixer.background_cursor();
        for ms in steps {
            clock.advance(Duration::from_millis(ms));
            let (produced, _) = mixer.produce();
            assert!(produced <= mixer.buffer_capacity());
            assert!(mixer.pending_samples() <= mixer.buffer_capacity());
            cursor = (cursor + produced) % BACKGROUND.len();
            assert_eq!(mixer.background_cursor(), cursor);
        }
    }

    #[test]
    fn short_effect_plays_once_then_retires() {
        let (mixer, loader, _) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        loader.insert("blip", Asset::mono(44_100, vec![1.0, 1.0]).unwrap());

        mixer.request_playback("blip").unwrap();
        assert_eq!(mixer.active_effects(), 1);

        let (produced, track) = mixer.produce();
        assert!(produced >= 2);
        let out = track.channel(0);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 0.5);
        assert_eq!(out[2], 0.25);
        assert_eq!(mixer.active_effects(), 0);
    }

    #[test]
    fn effect_retires_after_exactly_its_duration_across_calls() {
        // 100 Hz with a 100 ms buffer gives a 10 sample capacity.
        let (mixer, loader, clock) = mono_mixer(100, 100, vec![0.0]);
        loader.insert("tail", Asset::mono(100, vec![0.1; 25]).unwrap());
        mixer.request_playback("tail").unwrap();

        assert_eq!(mixer.produce().0, 10);
        assert_eq!(mixer.active_effects(), 1);

        clock.advance(Duration::from_millis(50));
        assert_eq!(mixer.produce().0, 5);
        assert_eq!(mixer.active_effects(), 1);

        clock.advance(Duration::from_millis(100));
        let (produced, track) = mixer.produce();
        assert_eq!(produced, 10);
        assert!(track.channel(0)[..10].iter().all(|s| *s == 0.1));
        assert_eq!(mixer.active_effects(), 0);

        clock.advance(Duration::from_millis(100));
        let (produced, track) = mixer.produce();
        assert_eq!(produced, 10);
        assert!(track.channel(0)[..10].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn overlapping_effects_are_clipped() {
        let (mixer, loader, _) = mono_mixer(44_100, 100, vec![0.8]);
        loader.insert("hit", Asset::mono(44_100, vec![0.8; 3]).unwrap());
        loader.insert("dip", Asset::mono(44_100, vec![-1.0; 3]).unwrap());
        mixer.request_playback("hit").unwrap();

        let (_, track) = mixer.produce();
        assert_eq!(&track.channel(0)[..4], &[1.0, 1.0, 1.0, 0.8]);

        mixer.request_playback("dip").unwrap();
        mixer.request_playback("dip").unwrap();
        // Nothing is due until the clock moves.
        assert_eq!(mixer.produce().0, 0);
        assert_eq!(mixer.active_effects(), 2);
    }

    #[test]
    fn failed_requests_leave_no_effect_behind() {
        let (mixer, loader, _) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        let result = mixer.request_playback("missing");
        assert!(matches!(
            result,
            Err(MixerError::AssetLoad(AssetLoadError::NotFound(_)))
        ));

        loader.insert("wide", Asset::from_channels(44_100, vec![vec![0.1]; 2]).unwrap());
        let result = mixer.request_playback("wide");
        assert!(matches!(
            result,
            Err(MixerError::ChannelMismatch {
                expected: 1,
                found: 2,
                ..
            })
        ));
        assert_eq!(mixer.active_effects(), 0);
    }

    #[test]
    fn preload_validates_without_playing() {
        let (mixer, loader, _) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        loader.insert("blip", Asset::mono(44_100, vec![1.0]).unwrap());
        mixer.preload("blip").unwrap();
        assert_eq!(mixer.active_effects(), 0);
        assert!(mixer.preload("missing").is_err());
    }

    #[test]
    fn initialize_fails_without_background() {
        let loader = Arc::new(MemoryLoader::new());
        let config = MixerConfig::new(AudioSpec::stereo(44_100), "nope.wav");
        let result = Mixer::initialize(config, loader, Arc::new(ManualClock::new()));
        assert!(matches!(result, Err(MixerError::AssetLoad(_))));
    }

    #[test]
    fn produce_hands_out_an_independent_copy() {
        let (mixer, _, clock) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        let (first_count, first) = mixer.produce();
        assert_eq!(first_count, 4_410);
        assert_eq!(first.capacity(), mixer.buffer_capacity());

        clock.advance(Duration::from_millis(1));
        let (count, second) = mixer.produce();
        assert_eq!(count, 44);
        // 4410 % 4 == 2, so the second block starts on the third value.
        assert_eq!(second.channel(0)[0], 0.25);
        assert_eq!(first.channel(0)[0], 0.5);
    }

    #[test]
    fn initialize_rejects_background_with_wrong_channels() {
        let loader = Arc::new(MemoryLoader::new());
        loader.insert("music", Asset::mono(100, vec![0.5, -0.5]).unwrap());
        let config = MixerConfig::new(AudioSpec::stereo(100), "music");
        let result = Mixer::initialize(config, loader, Arc::new(ManualClock::new()));
        assert!(matches!(
            result,
            Err(MixerError::ChannelMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn initialize_rejects_empty_buffers() {
        let loader = Arc::new(MemoryLoader::new());
        loader.insert("music", Asset::mono(10, vec![0.0]).unwrap());
        let config = MixerConfig::new(AudioSpec::mono(10), "music").with_buffer_ms(50);
        let result = Mixer::initialize(config, loader, Arc::new(ManualClock::new()));
        assert!(matches!(result, Err(MixerError::InvalidSpec(_))));
    }

    #[test]
    fn stereo_blocks_interleave() {
        let loader = Arc::new(MemoryLoader::new());
        loader.insert(
            "music",
            Asset::from_channels(100, vec![vec![0.25, 0.5], vec![-0.25, -0.5]]).unwrap(),
        );
        let clock = ManualClock::new();
        let config = MixerConfig::new(AudioSpec::stereo(100), "music").with_buffer_ms(30);
        let mixer = Mixer::initialize(config, loader, Arc::new(clock.clone())).unwrap();

        let mut out = Vec::new();
        assert_eq!(mixer.produce_interleaved(&mut out), 3);
        assert_eq!(out, vec![0.25, -0.25, 0.5, -0.5, 0.25, -0.25]);

        clock.advance(Duration::from_millis(10));
        out.clear();
        assert_eq!(mixer.produce_interleaved(&mut out), 1);
        assert_eq!(out, vec![0.5, -0.5]);
    }

    #[test]
    fn shutdown_stops_production_and_requests() {
        let (mixer, loader, clock) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        loader.insert("blip", Asset::mono(44_100, vec![1.0; 100]).unwrap());
        mixer.request_playback("blip").unwrap();

        mixer.shutdown();
        assert!(mixer.is_shut_down());
        assert_eq!(mixer.active_effects(), 0);

        clock.advance(Duration::from_millis(100));
        assert_eq!(mixer.produce().0, 0);
        assert!(matches!(
            mixer.request_playback("blip"),
            Err(MixerError::ShutDown)
        ));
    }

    #[test]
    fn requests_from_many_threads_all_land() {
        let (mixer, loader, _) = mono_mixer(44_100, 100, BACKGROUND.to_vec());
        loader.insert("long", Asset::mono(44_100, vec![0.0; 100_000]).unwrap());
        let mixer = Arc::new(mixer);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mixer = mixer.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        mixer.request_playback("long").unwrap();
                        mixer.produce();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(mixer.active_effects(), 100);
        assert!(mixer.pending_samples() <= mixer.buffer_capacity());
    }
}
