use std::path::Path;

use super::matrix::FrameMatrix;
use super::sample::Sample;
use crate::error::{Error, Result};

/// Decode a headerless interleaved buffer into a (frame, channel) matrix.
///
/// Samples that do not fill a complete frame are dropped, as is a trailing
/// partial sample.
pub fn decode_bytes<S: Sample>(bytes: &[u8], num_channels: usize) -> Result<FrameMatrix<S>> {
    if num_channels == 0 {
        return Err(Error::InvalidChannelCount(num_channels));
    }

    let num_samples = bytes.len() / S::WIDTH;
    let num_frames = num_samples / num_channels;
    let kept = num_frames * num_channels;

    if kept < num_samples {
        log::debug!(
            "Dropping {} trailing sample(s) that do not fill a {}-channel frame",
            num_samples - kept,
            num_channels
        );
    }

    let mut samples = vec![S::default(); kept];
    S::read_le_into(&bytes[..kept * S::WIDTH], &mut samples);

    FrameMatrix::from_samples(samples, num_channels)
}

/// Read a whole recording file into memory and decode it.
pub fn read_recording<S: Sample>(path: &Path, num_channels: usize) -> Result<FrameMatrix<S>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let matrix = decode_bytes(&bytes, num_channels)?;

    log::info!(
        "Decoded {}: {} frames x {} channels ({} bytes)",
        path.display(),
        matrix.num_frames(),
        matrix.num_channels(),
        bytes.len()
    );

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn le_bytes(values: impl IntoIterator<Item = i16>) -> Vec<u8> {
        values.into_iter().flat_map(i16::to_le_bytes).collect()
    }

    #[test]
    fn exact_multiple_preserves_every_sample() {
        let values: Vec<i16> = (0..1024).collect();
        let m = decode_bytes::<i16>(&le_bytes(values.clone()), 256).unwrap();
        assert_eq!(m.shape(), (4, 256));
        assert_eq!(m.samples(), &values[..]);
        assert_eq!(m.min(), Some(0));
        assert_eq!(m.max(), Some(1023));
    }

    #[test]
    fn remainder_samples_are_dropped() {
        for k in 1..3 {
            let values: Vec<i16> = (0..(6 + k)).collect();
            let m = decode_bytes::<i16>(&le_bytes(values), 3).unwrap();
            assert_eq!(m.shape(), (2, 3));
            assert_eq!(m.samples(), &[0, 1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn trailing_odd_byte_is_ignored() {
        let mut bytes = le_bytes([10, -20]);
        bytes.push(0xff);
        let m = decode_bytes::<i16>(&bytes, 2).unwrap();
        assert_eq!(m.samples(), &[10, -20]);
    }

    #[test]
    fn empty_and_short_buffers_decode_to_no_frames() {
        let m = decode_bytes::<i16>(&[], 256).unwrap();
        assert_eq!(m.shape(), (0, 256));
        let m = decode_bytes::<i16>(&le_bytes([1, 2, 3]), 256).unwrap();
        assert_eq!(m.shape(), (0, 256));
    }

    #[test]
    fn zero_channels_is_rejected() {
        assert!(matches!(
            decode_bytes::<i16>(&[0, 0], 0),
            Err(Error::InvalidChannelCount(0))
        ));
    }

    #[test]
    fn other_sample_widths() {
        let m = decode_bytes::<i8>(&[0x01, 0xff, 0x7f, 0x80], 2).unwrap();
        assert_eq!(m.samples(), &[1, -1, 127, -128]);

        let bytes: Vec<u8> = [70_000i32, -5].iter().flat_map(|v| v.to_le_bytes()).collect();
        let m = decode_bytes::<i32>(&bytes, 1).unwrap();
        assert_eq!(m.samples(), &[70_000, -5]);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = read_recording::<i16>(&dir.path().join("missing.dat"), 256).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let err = read_recording::<i16>(dir.path(), 256).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&le_bytes([7, -7, 300, -300, 1])).unwrap();
        let m = read_recording::<i16>(file.path(), 2).unwrap();
        assert_eq!(m.samples(), &[7, -7, 300, -300]);
    }
}
