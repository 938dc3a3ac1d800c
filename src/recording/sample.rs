use byteorder::{ByteOrder, LittleEndian};

/// A fixed-width signed integer sample stored little-endian on disk.
///
/// Widening to `f64` is lossless for every implementor, so statistics can
/// square and sum without overflow.
pub trait Sample: Copy + Default + Send + Sync + PartialOrd + std::fmt::Debug + 'static {
    /// Bytes per sample on disk
    const WIDTH: usize;

    /// Decode `dst.len()` samples from exactly `dst.len() * WIDTH` bytes.
    fn read_le_into(src: &[u8], dst: &mut [Self]);

    /// Encode `src` into exactly `src.len() * WIDTH` bytes.
    fn write_le_into(src: &[Self], dst: &mut [u8]);

    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($ty:ty, $width:expr, $read:ident, $write:ident) => {
        impl Sample for $ty {
            const WIDTH: usize = $width;

            fn read_le_into(src: &[u8], dst: &mut [Self]) {
                LittleEndian::$read(src, dst);
            }

            fn write_le_into(src: &[Self], dst: &mut [u8]) {
                LittleEndian::$write(src, dst);
            }

            fn to_f64(self) -> f64 {
                f64::from(self)
            }
        }
    };
}

impl_sample!(i16, 2, read_i16_into, write_i16_into);
impl_sample!(i32, 4, read_i32_into, write_i32_into);

// Single bytes have no byte order
impl Sample for i8 {
    const WIDTH: usize = 1;

    fn read_le_into(src: &[u8], dst: &mut [Self]) {
        for (d, &b) in dst.iter_mut().zip(src) {
            *d = b as i8;
        }
    }

    fn write_le_into(src: &[Self], dst: &mut [u8]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = s as u8;
        }
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}
