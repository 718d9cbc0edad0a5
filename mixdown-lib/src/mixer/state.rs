//! Lock-protected mixer state and the sample production loop.

use std::sync::Arc;
use std::time::Instant;

use crate::asset::Asset;
use crate::audio::buffer::MasterTrack;

/// A playing asset and its read position.
#[derive(Debug, Clone)]
pub(super) struct Voice {
    pub(super) asset: Arc<Asset>,
    pub(super) cursor: usize,
}

impl Voice {
    pub(super) fn new(asset: Arc<Asset>) -> Self {
        Self { asset, cursor: 0 }
    }
}

/// Everything the mixer mutates, guarded as one unit.
#[derive(Debug)]
pub(super) struct MixState {
    pub(super) master: MasterTrack,
    pub(super) background: Voice,
    pub(super) effects: Vec<Voice>,
    pub(super) pending_samples: i64,
    pub(super) last_time: Instant,
    pub(super) shut_down: bool,
}

impl MixState {
    pub(super) fn new(master: MasterTrack, background: Arc<Asset>, now: Instant) -> Self {
        Self {
            master,
            background: Voice::new(background),
            effects: Vec::new(),
            pending_samples: 0,
            last_time: now,
            shut_down: false,
        }
    }

    /// Work out how many samples to produce at `now` and book them as pending.
    ///
    /// Samples consumed since the last call are taken off the pending count,
    /// then the buffer is topped back up to capacity. The result never
    /// exceeds the master buffer capacity.
    pub(super) fn samples_due(&mut self, now: Instant, frequency: u32) -> usize {
        let delta = now.saturating_duration_since(self.last_time);
        self.last_time = now;

        let delta_samples = (delta.as_nanos() * frequency as u128 / 1_000_000_000)
            .min(i64::MAX as u128) as i64;
        self.pending_samples = self.pending_samples.saturating_sub(delta_samples).max(0);

        let capacity = self.master.capacity() as i64;
        let samples = (capacity - self.pending_samples).clamp(0, capacity);
        self.pending_samples += samples;

        samples as usize
    }

    /// Mix `samples` frames into the front of the master buffer.
    ///
    /// Returns the number of effects that finished during this block.
    pub(super) fn fill(&mut self, samples: usize) -> usize {
        let MixState {
            master,
            background,
            effects,
            ..
        } = self;

        let samples = samples.min(master.capacity());
        let background_len = background.asset.duration_samples();
        let mut retired = 0;

        for slot in 0..samples {
            let background_cursor = (background.cursor + slot) % background_len;
            for (channel, out) in master.channels_mut().iter_mut().enumerate() {
                let mut sample = background.asset.sample(channel, background_cursor);
                for effect in effects.iter() {
                    sample += effect.asset.sample(channel, effect.cursor);
                }
                out[slot] = sample.clamp(-1.0, 1.0);
            }

            let before = effects.len();
            effects.retain_mut(|effect| {
                effect.cursor += 1;
                effect.cursor < effect.asset.duration_samples()
            });
            retired += before - effects.len();
        }

        if samples > 0 {
            background.cursor = (background.cursor + samples) % background_len;
        }

        retired
    }
}
