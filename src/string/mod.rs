//! Native strings behind raw addresses.
//!
//! - [`Encoding`] - Byte layouts of NUL-terminated native strings
//! - [`Marshaler`] - Encode, decode, allocate and free strategies bundled as a value
//! - [`StringHandle`] - Decodes the native memory on every read
//! - [`CachedStringHandle`] - Decodes once at construction
//!
//! Neither handle frees on drop. Both become null after
//! [`release`](StringHandle::release) and read as `""` from then on.

mod cached;
mod encoding;
mod handle;
mod marshal;

pub use cached::CachedStringHandle;
pub use encoding::Encoding;
pub use handle::StringHandle;
pub use marshal::{AllocateFn, DecodeFn, EncodeFn, FreeFn, Marshaler};
