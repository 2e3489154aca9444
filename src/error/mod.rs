//! Error types for nativebuf.

use thiserror::Error;

/// Result alias used by every checked entry point.
pub type Result<T, E = BufferError> = std::result::Result<T, E>;

/// Errors reported by checked operations and by allocation.
///
/// Unchecked entry points never produce these; their preconditions are
/// only `debug_assert!`ed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A null address was paired with a non-zero length.
    #[error("null address with non-zero length {length}")]
    NullAddress {
        /// The requested element count.
        length: usize,
    },

    /// A slice request fell outside the parent buffer.
    #[error("slice out of range: start {start}, length {length}, available {available}")]
    SliceOutOfRange {
        /// Requested start element.
        start: usize,
        /// Requested element count.
        length: usize,
        /// Element count of the parent.
        available: usize,
    },

    /// An element index was not below the buffer length.
    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The buffer length.
        length: usize,
    },

    /// A copy destination holds fewer elements than the source.
    #[error("destination too small: need {required} elements, have {available}")]
    DestinationTooSmall {
        /// Elements in the source.
        required: usize,
        /// Elements in the destination.
        available: usize,
    },

    /// `length * element_size` does not fit in `usize`.
    #[error("size overflow: {length} elements of {element_size} bytes")]
    SizeOverflow {
        /// Requested element count.
        length: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },

    /// The base address does not satisfy the target type's alignment.
    #[error("address {address:#x} is not aligned to {align}")]
    Misaligned {
        /// The base address.
        address: usize,
        /// Required alignment in bytes.
        align: usize,
    },

    /// The buffer is smaller than the type it is reinterpreted as.
    #[error("buffer too small for type: need {required} bytes, have {available}")]
    TooSmallForType {
        /// `size_of` the target type.
        required: usize,
        /// Bytes described by the buffer.
        available: usize,
    },

    /// The allocation strategy could not provide memory.
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailed {
        /// Requested byte count.
        bytes: usize,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}
