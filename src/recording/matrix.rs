use std::iter::StepBy;
use std::slice::Iter;

use super::sample::Sample;
use crate::error::{Error, Result};

/// Multichannel recording laid out frame-major: rows are time steps,
/// columns are channels.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameMatrix<S: Sample = i16> {
    samples: Vec<S>,
    num_channels: usize,
}

/// Column view over one channel of a [`FrameMatrix`].
pub type ChannelIter<'a, S> = StepBy<Iter<'a, S>>;

impl<S: Sample> FrameMatrix<S> {
    /// Build from a flat frame-major vector holding a whole number of frames.
    pub fn from_samples(samples: Vec<S>, num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(Error::InvalidChannelCount(num_channels));
        }
        if samples.len() % num_channels != 0 {
            return Err(Error::ShapeMismatch {
                left: (samples.len() / num_channels, num_channels),
                right: (samples.len(), 1),
            });
        }
        Ok(Self {
            samples,
            num_channels,
        })
    }

    /// (frames, channels)
    pub fn shape(&self) -> (usize, usize) {
        (self.num_frames(), self.num_channels)
    }

    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.num_channels
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples, frame-major.
    pub fn samples(&self) -> &[S] {
        &self.samples
    }

    pub fn frame(&self, index: usize) -> Option<&[S]> {
        let start = index.checked_mul(self.num_channels)?;
        let end = start.checked_add(self.num_channels)?;
        self.samples.get(start..end)
    }

    pub fn frames(&self) -> std::slice::ChunksExact<'_, S> {
        self.samples.chunks_exact(self.num_channels)
    }

    pub fn channel(&self, channel: usize) -> Result<ChannelIter<'_, S>> {
        if channel >= self.num_channels {
            return Err(Error::ChannelOutOfRange {
                channel,
                channels: self.num_channels,
            });
        }
        Ok(self.samples[channel..].iter().step_by(self.num_channels))
    }

    /// Channel samples widened to `f64`.
    pub fn channel_f64(&self, channel: usize) -> Result<Vec<f64>> {
        Ok(self.channel(channel)?.map(|s| s.to_f64()).collect())
    }

    /// Keep at most the first `max_frames` frames.
    pub fn truncated(&self, max_frames: usize) -> Self {
        let frames = self.num_frames().min(max_frames);
        Self {
            samples: self.samples[..frames * self.num_channels].to_vec(),
            num_channels: self.num_channels,
        }
    }

    pub fn min(&self) -> Option<S> {
        self.samples
            .iter()
            .copied()
            .reduce(|a, b| if b < a { b } else { a })
    }

    pub fn max(&self) -> Option<S> {
        self.samples
            .iter()
            .copied()
            .reduce(|a, b| if b > a { b } else { a })
    }

    /// Frame timestamps in seconds.
    pub fn time_axis(&self, sample_rate: f64) -> Vec<f64> {
        (0..self.num_frames())
            .map(|i| i as f64 / sample_rate)
            .collect()
    }

    /// Serialize back to the headerless little-endian file layout.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.samples.len() * S::WIDTH];
        S::write_le_into(&self.samples, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, channels: usize) -> FrameMatrix<i16> {
        let samples = (0..(frames * channels) as i16).collect();
        FrameMatrix::from_samples(samples, channels).unwrap()
    }

    #[test]
    fn rows_are_frames_columns_are_channels() {
        let m = ramp(3, 4);
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.frame(1), Some(&[4i16, 5, 6, 7][..]));
        assert_eq!(m.frame(3), None);
        // index * channels fits in usize but the frame end does not
        assert_eq!(m.frame(usize::MAX / 4), None);
        let ch2: Vec<i16> = m.channel(2).unwrap().copied().collect();
        assert_eq!(ch2, vec![2, 6, 10]);
    }

    #[test]
    fn channel_out_of_range() {
        let m = ramp(2, 4);
        assert!(matches!(
            m.channel(4),
            Err(Error::ChannelOutOfRange { channel: 4, channels: 4 })
        ));
    }

    #[test]
    fn rejects_partial_frames() {
        let err = FrameMatrix::from_samples(vec![1i16, 2, 3], 2).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(matches!(
            FrameMatrix::<i16>::from_samples(vec![], 0),
            Err(Error::InvalidChannelCount(0))
        ));
    }

    #[test]
    fn truncation_keeps_leading_frames() {
        let m = ramp(10, 2);
        let t = m.truncated(3);
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.samples(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(m.truncated(100).shape(), (10, 2));
    }

    #[test]
    fn min_max_and_time_axis() {
        let m = FrameMatrix::from_samples(vec![3i16, -7, 12, 0], 2).unwrap();
        assert_eq!(m.min(), Some(-7));
        assert_eq!(m.max(), Some(12));
        assert_eq!(m.time_axis(2.0), vec![0.0, 0.5]);
        let empty = FrameMatrix::<i16>::from_samples(vec![], 2).unwrap();
        assert_eq!(empty.min(), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn encodes_little_endian() {
        let m = FrameMatrix::from_samples(vec![1i16, -2], 2).unwrap();
        assert_eq!(m.to_le_bytes(), vec![0x01, 0x00, 0xfe, 0xff]);
    }
}
