//! Hands buffers and strings to C routines from libc and reads them back.
//!
//! Run with:
//!     RUST_LOG=trace cargo run --example native_roundtrip

use std::ffi::c_char;

use nativebuf::{
    BlockPool, BufferError, CachedStringHandle, Malloc, Marshaler, OwnedBuffer, PointerTable,
    PoolConfig, RawBuffer, StringHandle,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), BufferError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // memset through a raw view
    let alloc = Malloc;
    let buf = RawBuffer::<u8>::allocate_in(&alloc, 16)?;
    unsafe {
        libc::memset(buf.as_ptr().cast(), 0x2a, buf.byte_len());
        println!("after memset: {:?}", buf.as_slice());
    }
    let (head, tail) = buf.split_at(8)?;
    println!("halves: {head} / {tail}");
    unsafe { buf.release_in(&alloc) };

    // strlen over a native string
    let mut name = StringHandle::new("nativebuf", &Marshaler::UTF8)?;
    let len = unsafe { libc::strlen(name.as_ptr().cast::<c_char>()) };
    println!("strlen({name}) = {len}");

    // native code writes into a caller-allocated buffer
    let mut out = StringHandle::with_capacity(32, &Marshaler::UTF8)?;
    unsafe {
        libc::strncpy(
            out.as_mut_ptr().cast::<c_char>(),
            name.as_ptr().cast::<c_char>(),
            31,
        );
    }
    println!("copied by strncpy: {}", out.read());
    name.release();
    out.release();

    // a table of pointers into pooled storage
    let pool = BlockPool::new(PoolConfig::new(256, 4)?);
    let mut values = OwnedBuffer::<i32, _>::from_slice_in(&pool, &[3, 1, 2])?;
    let table = PointerTable::<i32>::allocate_null_in(&pool, values.len())?;
    let base = values.as_mut_ptr();
    unsafe {
        for i in 0..table.len() {
            table.try_set(i, base.add(i))?;
        }
        libc::qsort(
            base.cast(),
            values.len(),
            size_of::<i32>(),
            Some(compare_i32),
        );
        let sorted: Vec<i32> = (0..table.len()).map(|i| *table.deref(i)).collect();
        println!("sorted through table: {:?}", sorted);
        table.release_in(&pool);
    }
    #[cfg(feature = "hash-blake3")]
    println!("content hash: {}", values.content_hash());
    values.release();

    let mut cached = CachedStringHandle::new("done", &Marshaler::PLATFORM)?;
    println!("{cached}");
    cached.release();

    Ok(())
}

unsafe extern "C" fn compare_i32(a: *const libc::c_void, b: *const libc::c_void) -> libc::c_int {
    // SAFETY: qsort passes pointers to elements of the i32 array it sorts.
    let (a, b) = unsafe { (*a.cast::<i32>(), *b.cast::<i32>()) };
    a.cmp(&b) as libc::c_int
}
