//! Element types that may be read from arbitrary bytes.

/// Marker for types where every bit pattern is a valid value and there are
/// no padding bytes.
///
/// [`OwnedBuffer`](crate::OwnedBuffer) zero-fills its memory and hands out
/// `&[T]`, and byte-level helpers such as `to_bytes` read the raw
/// representation; both rely on this marker.
///
/// # Safety
///
/// Implementors must be inhabited by every bit pattern of their size, contain
/// no padding, and hold no pointers whose validity matters.
pub unsafe trait Plain: Copy + 'static {}

macro_rules! impl_plain {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive numeric type, all bit patterns valid, no padding.
            unsafe impl Plain for $ty {}
        )*
    };
}

impl_plain!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// SAFETY: an array of plain elements has no padding between them.
unsafe impl<T: Plain, const N: usize> Plain for [T; N] {}
