//! Orientation code pixel types.
//!
//! A code image carries one quantized gradient-orientation bin per pixel.
//! Code `0` marks pixels without a usable gradient and never votes; every
//! other value is an opaque bin identifier chosen by the encoder.

/// Pixel type usable as an orientation code and as a table index.
pub trait Code: Copy + Send + Sync + 'static {
    /// Returns the code as a table index.
    fn index(self) -> usize;

    /// True for the reserved "masked" code.
    #[inline]
    fn is_masked(self) -> bool {
        self.index() == 0
    }
}

impl Code for u8 {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl Code for u16 {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}
