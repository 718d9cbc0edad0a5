//! Fixed-capacity per-channel staging buffer the mixer writes into.

use super::spec::Channel;

/// One sample vector per output channel, all of the same fixed capacity.
///
/// The mixer overwrites a prefix of every channel on each production call;
/// only that prefix is meaningful to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterTrack {
    channels: Vec<Channel>,
    data: Vec<Vec<f32>>,
}

impl MasterTrack {
    /// Allocate a silent buffer of `capacity` samples for each channel.
    pub fn new(channels: &[Channel], capacity: usize) -> Self {
        Self {
            channels: channels.to_vec(),
            data: vec![vec![0.0; capacity]; channels.len()],
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.first().map(Vec::len).unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Samples of the channel at position `index` in the layout.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.data[index]
    }

    /// Samples of the given speaker channel, if it is part of the layout.
    pub fn get(&self, channel: Channel) -> Option<&[f32]> {
        self.channels
            .iter()
            .position(|c| *c == channel)
            .map(|index| self.data[index].as_slice())
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.data
    }

    /// Append the first `samples` frames to `out`, interleaved by channel.
    pub fn interleave_into(&self, samples: usize, out: &mut Vec<f32>) {
        let samples = samples.min(self.capacity());
        out.reserve(samples * self.channel_count());
        for frame in 0..samples {
            for channel in &self.data {
                out.push(channel[frame]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_track_is_silent() {
        let track = MasterTrack::new(&[Channel::FrontLeft, Channel::FrontRight], 8);
        assert_eq!(track.capacity(), 8);
        assert_eq!(track.channel_count(), 2);
        assert!(track.channel(1).iter().all(|s| *s == 0.0));
        assert!(track.get(Channel::Lfe).is_none());
    }

    #[test]
    fn interleave_respects_prefix() {
        let mut track = MasterTrack::new(&[Channel::FrontLeft, Channel::FrontRight], 4);
        track.channels_mut()[0].copy_from_slice(&[0.1, 0.2, 0.3, 0.4]);
        track.channels_mut()[1].copy_from_slice(&[-0.1, -0.2, -0.3, -0.4]);

        let mut out = Vec::new();
        track.interleave_into(2, &mut out);
        assert_eq!(out, vec![0.1, -0.1, 0.2, -0.2]);
        assert_eq!(track.get(Channel::FrontRight).unwrap()[3], -0.4);
    }
}
