//! Appliance files with zstd compression and CRC32 validation.
//!
//! Layout: a 14-byte little-endian header (magic, version, CRC32 of the
//! compressed payload, payload length) followed by the zstd-compressed JSON
//! [`ApplianceRecord`].

use crate::error::StoreError;
use crate::record::ApplianceRecord;
use crc32fast::Hasher;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic number for appliance files ("SMLT").
pub const APPLIANCE_MAGIC: u32 = 0x534D_4C54;

/// Current appliance file format version.
pub const APPLIANCE_VERSION: u16 = 1;

/// Header size in bytes.
pub const HEADER_LEN: usize = 14;

/// File extension used by [`ApplianceStore`].
pub const APPLIANCE_EXTENSION: &str = "smlt";

/// Largest decompressed record accepted or written.
pub const MAX_RECORD_BYTES: usize = 1 << 20;

const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ApplianceHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl ApplianceHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: APPLIANCE_MAGIC,
            version: APPLIANCE_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.crc32.to_le_bytes());
        bytes[10..14].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() < HEADER_LEN {
            return Err(StoreError::HeaderTooShort(bytes.len()));
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != APPLIANCE_MAGIC {
            return Err(StoreError::BadMagic {
                expected: APPLIANCE_MAGIC,
                found: magic,
            });
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version == 0 || version > APPLIANCE_VERSION {
            return Err(StoreError::UnsupportedVersion(version));
        }

        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Encode a record into the on-disk byte layout.
pub fn encode_record(record: &ApplianceRecord) -> Result<Vec<u8>, StoreError> {
    let json = record.to_json()?;
    if json.len() > MAX_RECORD_BYTES {
        return Err(StoreError::PayloadTooLarge {
            len: json.len(),
            limit: MAX_RECORD_BYTES,
        });
    }
    let compressed = zstd::encode_all(&json[..], COMPRESSION_LEVEL).map_err(StoreError::Compression)?;
    let payload_len = u32::try_from(compressed.len()).map_err(|_| StoreError::PayloadTooLarge {
        len: compressed.len(),
        limit: u32::MAX as usize,
    })?;
    let header = ApplianceHeader::new(checksum(&compressed), payload_len);

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Decode the on-disk byte layout. Container damage is an error; the record
/// itself is returned as parsed and repaired later by
/// [`ApplianceState::read_record`](crate::state::ApplianceState::read_record).
pub fn decode_record(bytes: &[u8]) -> Result<ApplianceRecord, StoreError> {
    let header = ApplianceHeader::from_bytes(bytes)?;
    let expected = header.payload_len as usize;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() < expected {
        return Err(StoreError::Truncated {
            expected,
            found: payload.len(),
        });
    }
    let compressed = &payload[..expected];

    let computed = checksum(compressed);
    if computed != header.crc32 {
        return Err(StoreError::CrcMismatch {
            expected: header.crc32,
            computed,
        });
    }

    let json = decompress_bounded(compressed)?;
    Ok(ApplianceRecord::from_json(&json)?)
}

fn decompress_bounded(compressed: &[u8]) -> Result<Vec<u8>, StoreError> {
    let decoder = zstd::stream::read::Decoder::new(compressed).map_err(StoreError::Compression)?;
    let mut json = Vec::new();
    decoder
        .take(MAX_RECORD_BYTES as u64 + 1)
        .read_to_end(&mut json)
        .map_err(StoreError::Compression)?;
    if json.len() > MAX_RECORD_BYTES {
        return Err(StoreError::PayloadTooLarge {
            len: json.len(),
            limit: MAX_RECORD_BYTES,
        });
    }
    Ok(json)
}

/// Directory of named appliance files.
#[derive(Debug, Clone)]
pub struct ApplianceStore {
    dir: PathBuf,
}

impl ApplianceStore {
    /// Open a store rooted at `dir`, creating it if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `name`.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{APPLIANCE_EXTENSION}"))
    }

    /// Write `record` under `name`, replacing any previous file.
    pub fn save(&self, name: &str, record: &ApplianceRecord) -> Result<(), StoreError> {
        let bytes = encode_record(record)?;
        let path = self.path(name);
        let mut file = File::create(&path)?;
        file.write_all(&bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "appliance saved");
        Ok(())
    }

    /// Read the record stored under `name`.
    pub fn load(&self, name: &str) -> Result<ApplianceRecord, StoreError> {
        let path = self.path(name);
        let mut bytes = Vec::new();
        File::open(&path)?.read_to_end(&mut bytes)?;
        let record = decode_record(&bytes)?;
        debug!(path = %path.display(), items = record.items.len(), "appliance loaded");
        Ok(record)
    }

    /// Whether a file exists for `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}
