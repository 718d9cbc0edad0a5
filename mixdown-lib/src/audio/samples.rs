//! Helpers for handing mixed blocks to `rodio`.

use rodio::buffer::SamplesBuffer;

/// Wrap an interleaved block as a [`SamplesBuffer`] ready for a sink.
///
/// # Example
/// ```rust
/// use mixdown_lib::audio::samples::to_samples_buffer;
/// use rodio::Source;
///
/// let buffer = to_samples_buffer(vec![0.0f32; 4], 2, 48_000);
/// assert_eq!(buffer.channels(), 2);
/// assert_eq!(buffer.count(), 4);
/// ```
pub fn to_samples_buffer(interleaved: Vec<f32>, channels: usize, sample_rate: u32) -> SamplesBuffer {
    SamplesBuffer::new(channels.max(1) as u16, sample_rate, interleaved)
}

/// Per-channel absolute peak of an interleaved block.
pub fn block_peaks(interleaved: &[f32], channels: usize) -> Vec<f32> {
    let channels = channels.max(1);
    let mut peaks = vec![0.0_f32; channels];
    for frame in interleaved.chunks(channels) {
        for (peak, sample) in peaks.iter_mut().zip(frame) {
            *peak = peak.max(sample.abs());
        }
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_are_tracked_per_channel() {
        let peaks = block_peaks(&[0.1, -0.9, -0.4, 0.2, 0.3, 0.0], 2);
        assert_eq!(peaks, vec![0.4, 0.9]);
    }

    #[test]
    fn empty_block_has_zero_peaks() {
        assert_eq!(block_peaks(&[], 2), vec![0.0, 0.0]);
    }
}
