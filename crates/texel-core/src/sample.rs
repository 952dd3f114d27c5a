//! Typed reinterpretation of view bytes.
//!
//! Views store no element type, only bit depth and the signed/float flags.
//! [`Sample`] lets callers read or write a channel as any fixed-size
//! numeric type, in native byte order.

use half::f16;

/// A fixed-size numeric value that can be read from and written to raw bytes.
pub trait Sample: Copy {
    /// Size in bytes.
    const SIZE: usize;

    /// Reads a value from the first `SIZE` bytes of `bytes`.
    fn read_ne(bytes: &[u8]) -> Self;

    /// Writes the value into the first `SIZE` bytes of `out`.
    fn write_ne(self, out: &mut [u8]);
}

macro_rules! impl_sample {
    ($($t:ty),+) => {
        $(
            impl Sample for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn read_ne(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$t>::from_ne_bytes(raw)
                }

                #[inline]
                fn write_ne(self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
                }
            }
        )+
    };
}

impl_sample!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, f16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinterprets_native_bytes() {
        let bytes = 0x1234u16.to_ne_bytes();
        assert_eq!(u16::read_ne(&bytes), 0x1234);

        let mut out = [0u8; 4];
        1.5f32.write_ne(&mut out);
        assert_eq!(f32::read_ne(&out), 1.5);

        let mut out = [0u8; 2];
        f16::from_f32(0.25).write_ne(&mut out);
        assert_eq!(f16::read_ne(&out).to_f32(), 0.25);
    }

    #[test]
    fn half_round_trip_is_lossy() {
        let mut out = [0u8; 2];
        f16::from_f32(0.1).write_ne(&mut out);
        let back = f16::read_ne(&out).to_f32();
        assert_ne!(back, 0.1);
        approx::assert_relative_eq!(back, 0.1, epsilon = 1e-3);
    }
}
