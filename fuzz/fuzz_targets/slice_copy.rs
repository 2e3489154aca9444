#![no_main]

use libfuzzer_sys::fuzz_target;
use nativebuf::{BoundsPolicy, RawBuffer, ReadOnlyBuffer};

fuzz_target!(|input: (Vec<u8>, u16, u16, u16)| {
    let (data, src_start, dest_start, length) = input;
    let (src_start, dest_start, length) =
        (src_start as usize, dest_start as usize, length as usize);

    let mut model = data.clone();
    let mut actual = data.clone();
    let whole = RawBuffer::from_slice(&mut actual);

    // Checked slicing must agree with the policy predicate
    let src = whole.try_slice_with(BoundsPolicy::InclusiveEnd, src_start, length);
    let dest = whole.try_slice_with(BoundsPolicy::InclusiveEnd, dest_start, length);
    assert_eq!(
        src.is_ok(),
        BoundsPolicy::InclusiveEnd.accepts(src_start, length, data.len())
    );

    // Overlap-tolerant copy matches copy_within
    if let (Ok(src), Ok(dest)) = (src, dest) {
        unsafe { src.try_copy_to_safe(dest) }.unwrap();
        model.copy_within(src_start..src_start + length, dest_start);
        assert_eq!(actual, model);
    }

    // Content hash ignores identity
    let a = ReadOnlyBuffer::from_slice(&actual);
    let b = ReadOnlyBuffer::from_slice(&model);
    assert_eq!(unsafe { a.content_hash() }, unsafe { b.content_hash() });
});
