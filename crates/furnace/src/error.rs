use thiserror::Error;

/// Out-of-range access on the slot array or the sync field table.
///
/// The infallible accessors log these and fall back to a default; the
/// `try_*` variants return them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FurnaceError {
    /// Slot index past the end of the slot array.
    #[error("slot index {index} out of range (slot count {len})")]
    SlotOutOfRange {
        /// Requested index.
        index: usize,
        /// Slot count.
        len: usize,
    },
    /// Sync field id past the end of the field table.
    #[error("sync field id {id} out of range (field count {count})")]
    FieldOutOfRange {
        /// Requested id.
        id: usize,
        /// Field count.
        count: usize,
    },
}

/// Failures while reading or writing a persisted appliance file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file IO.
    #[error("appliance store io: {0}")]
    Io(#[from] std::io::Error),
    /// Header shorter than the fixed header size.
    #[error("appliance file header too short ({0} bytes)")]
    HeaderTooShort(usize),
    /// Magic number mismatch.
    #[error("invalid appliance magic: expected 0x{expected:08X}, got 0x{found:08X}")]
    BadMagic {
        /// Expected magic.
        expected: u32,
        /// Magic found in the file.
        found: u32,
    },
    /// Format version newer than this build understands.
    #[error("unsupported appliance format version {0}")]
    UnsupportedVersion(u16),
    /// Payload shorter than the header claims.
    #[error("appliance payload truncated: expected {expected} bytes, got {found}")]
    Truncated {
        /// Length recorded in the header.
        expected: usize,
        /// Bytes actually present.
        found: usize,
    },
    /// CRC32 of the compressed payload does not match the header.
    #[error("appliance CRC32 mismatch: expected {expected:08X}, got {computed:08X}")]
    CrcMismatch {
        /// Checksum recorded in the header.
        expected: u32,
        /// Checksum of the bytes read.
        computed: u32,
    },
    /// Record larger than the format allows.
    #[error("appliance payload of {len} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge {
        /// Size seen (at least this many bytes).
        len: usize,
        /// Limit that was exceeded.
        limit: usize,
    },
    /// zstd compression or decompression failed.
    #[error("appliance payload compression: {0}")]
    Compression(std::io::Error),
    /// Payload is not a JSON appliance record.
    #[error("appliance record json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures resolving a recipe book from names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
    /// Name is not a valid registry key.
    #[error(transparent)]
    InvalidKey(#[from] smeltery_core::RegistryKeyError),
    /// Name parsed but is not in the item catalog.
    #[error("unknown item {0:?}")]
    UnknownItem(String),
    /// A recipe producing nothing.
    #[error("recipe for {0:?} has a zero output count")]
    EmptyOutput(String),
}
