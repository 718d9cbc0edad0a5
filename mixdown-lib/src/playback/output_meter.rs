//! Output meter for tracking playback levels.

use dasp_ring_buffer::Bounded;

use crate::audio::samples::block_peaks;

/// Default number of blocks remembered for the peak hold.
pub const DEFAULT_HOLD_BLOCKS: usize = 30;

/// Per-channel level meter fed with the blocks sent to the output.
#[derive(Debug)]
pub struct OutputMeter {
    channels: usize,
    hold_blocks: usize,
    levels: Vec<f32>,
    history: Vec<Bounded<Vec<f32>>>,
}

impl OutputMeter {
    pub fn new(channels: usize, hold_blocks: usize) -> Self {
        let channels = channels.max(1);
        let hold_blocks = hold_blocks.max(1);
        Self {
            channels,
            hold_blocks,
            levels: vec![0.0; channels],
            history: (0..channels)
                .map(|_| Bounded::from(vec![0.0; hold_blocks]))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.channels, self.hold_blocks);
    }

    /// Record the peaks of one interleaved block.
    pub fn push_block(&mut self, interleaved: &[f32]) {
        if interleaved.is_empty() {
            return;
        }
        let peaks = block_peaks(interleaved, self.channels);
        for (history, peak) in self.history.iter_mut().zip(&peaks) {
            history.push(*peak);
        }
        self.levels = peaks;
    }

    /// Peaks of the most recent block.
    pub fn levels(&self) -> Vec<f32> {
        self.levels.clone()
    }

    /// Highest peak per channel over the remembered blocks.
    pub fn peak_hold(&self) -> Vec<f32> {
        self.history
            .iter()
            .map(|history| history.iter().fold(0.0_f32, |hold, peak| hold.max(*peak)))
            .collect()
    }
}
