#![no_main]

use libfuzzer_sys::fuzz_target;
use nativebuf::{CachedStringHandle, Encoding, Marshaler, StringHandle};

fuzz_target!(|value: String| {
    // Decoding stops at the first NUL
    let expected = value.split('\0').next().unwrap_or_default();

    for encoding in [Encoding::Utf8, Encoding::Utf16] {
        let marshaler = Marshaler::new(encoding);

        let mut lazy = StringHandle::new(&value, &marshaler).unwrap();
        assert_eq!(lazy.read(), expected);
        lazy.release();
        assert_eq!(lazy.read(), "");

        let mut cached = CachedStringHandle::new(&value, &marshaler).unwrap();
        cached.release();
        assert_eq!(cached.read(), "");
    }

    // Single-byte never panics and never grows past the input
    let mut single = StringHandle::new(&value, &Marshaler::SINGLE_BYTE).unwrap();
    assert!(single.read().chars().count() <= expected.chars().count());
    single.release();
});
