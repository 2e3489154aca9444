//! Native string representations.

use std::ffi::CStr;

/// The byte layout a native string uses.
///
/// Every encoding is NUL-terminated; values containing an embedded NUL are
/// truncated at it when decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// UTF-16 on Windows, UTF-8 elsewhere.
    #[default]
    Platform,
    /// One byte per character (ISO-8859-1). Characters above U+00FF encode
    /// as `?`.
    SingleByte,
    /// UTF-8.
    Utf8,
    /// UTF-16 in native byte order.
    Utf16,
}

impl Encoding {
    /// Replaces [`Encoding::Platform`] with the concrete encoding it stands for.
    pub const fn resolve(self) -> Self {
        match self {
            Encoding::Platform if cfg!(windows) => Encoding::Utf16,
            Encoding::Platform => Encoding::Utf8,
            other => other,
        }
    }

    /// Width of one code unit, and of the terminator, in bytes.
    pub const fn unit_size(self) -> usize {
        match self.resolve() {
            Encoding::Utf16 => 2,
            _ => 1,
        }
    }

    /// Encodes `value` followed by a terminator.
    pub fn encode(self, value: &str) -> Vec<u8> {
        match self.resolve() {
            Encoding::SingleByte => value
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .chain([0])
                .collect(),
            Encoding::Utf16 => value
                .encode_utf16()
                .chain([0])
                .flat_map(u16::to_ne_bytes)
                .collect(),
            _ => {
                let mut bytes = Vec::with_capacity(value.len() + 1);
                bytes.extend_from_slice(value.as_bytes());
                bytes.push(0);
                bytes
            }
        }
    }

    /// Decodes the terminated string at `ptr`. Null decodes as `""`.
    ///
    /// Invalid sequences are replaced with U+FFFD.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a terminated string in this encoding
    /// that stays live and unmodified for the duration of the call.
    pub unsafe fn decode(self, ptr: *const u8) -> String {
        if ptr.is_null() {
            return String::new();
        }

        match self.resolve() {
            Encoding::SingleByte => {
                // SAFETY: upheld by the caller.
                let bytes = unsafe { CStr::from_ptr(ptr.cast()) }.to_bytes();
                bytes.iter().map(|&b| char::from(b)).collect()
            }
            Encoding::Utf16 => {
                let units = ptr.cast::<u16>();
                let mut len = 0;
                // SAFETY: the caller guarantees a terminator follows; unaligned
                // reads tolerate byte-aligned native buffers.
                while unsafe { units.add(len).read_unaligned() } != 0 {
                    len += 1;
                }
                let decoded: Vec<u16> = (0..len)
                    // SAFETY: every index is before the terminator found above.
                    .map(|i| unsafe { units.add(i).read_unaligned() })
                    .collect();
                String::from_utf16_lossy(&decoded)
            }
            _ => {
                // SAFETY: upheld by the caller.
                unsafe { CStr::from_ptr(ptr.cast()) }
                    .to_string_lossy()
                    .into_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(encoding: Encoding, value: &str) -> String {
        let bytes = encoding.encode(value);
        unsafe { encoding.decode(bytes.as_ptr()) }
    }

    #[test]
    fn test_platform_resolves() {
        let resolved = Encoding::Platform.resolve();
        assert_ne!(resolved, Encoding::Platform);
        assert_eq!(Encoding::Utf8.resolve(), Encoding::Utf8);
    }

    #[test]
    fn test_terminators() {
        assert_eq!(Encoding::Utf8.encode("ab"), b"ab\0");
        assert_eq!(Encoding::SingleByte.encode("é"), [0xE9, 0]);
        assert_eq!(Encoding::Utf16.encode("a").len(), 4);
    }

    #[test]
    fn test_round_trips() {
        for encoding in [
            Encoding::Platform,
            Encoding::SingleByte,
            Encoding::Utf8,
            Encoding::Utf16,
        ] {
            assert_eq!(round_trip(encoding, "hello"), "hello");
            assert_eq!(round_trip(encoding, ""), "");
            assert_eq!(round_trip(encoding, "café"), "café");
        }
        assert_eq!(round_trip(Encoding::Utf8, "日本語 🦀"), "日本語 🦀");
        assert_eq!(round_trip(Encoding::Utf16, "日本語 🦀"), "日本語 🦀");
    }

    #[test]
    fn test_single_byte_replaces_unrepresentable() {
        assert_eq!(round_trip(Encoding::SingleByte, "a→b"), "a?b");
    }

    #[test]
    fn test_embedded_nul_truncates() {
        assert_eq!(round_trip(Encoding::Utf8, "ab\0cd"), "ab");
        assert_eq!(round_trip(Encoding::Utf16, "ab\0cd"), "ab");
    }

    #[test]
    fn test_null_decodes_empty() {
        assert_eq!(unsafe { Encoding::Utf16.decode(std::ptr::null()) }, "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let bytes = [0x66u8, 0xFF, 0];
        assert_eq!(unsafe { Encoding::Utf8.decode(bytes.as_ptr()) }, "f\u{FFFD}");
    }
}
