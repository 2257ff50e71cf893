//! Postcard snapshots with versioned envelopes.
//!
//! Stores can be exported to bytes at shutdown and imported again on start so a
//! restarted process does not refetch every entity from the server.
//!
//! # Format
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (4 bytes)│POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "BRDG"              u32                postcard::to_allocvec(T)
//! ```
//!
//! Magic and version are checked on every decode. A schema change makes old
//! snapshots fail with [`Error::VersionMismatch`]; they are discarded, never
//! migrated.
//!
//! # Example
//!
//! ```rust
//! use bridge_cache::serialization::{decode, encode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Checkpoint {
//!     last_id: i64,
//! }
//!
//! # fn main() -> bridge_cache::Result<()> {
//! let bytes = encode(&Checkpoint { last_id: 42 })?;
//! let checkpoint: Checkpoint = decode(&bytes)?;
//! assert_eq!(checkpoint.last_id, 42);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header of bridge-cache snapshots: b"BRDG"
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"BRDG";

/// Current schema version.
///
/// **CRITICAL:** Increment this constant when making breaking changes to the
/// model entities: adding, removing or reordering fields, changing field types,
/// changing enum variants.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope around every snapshot payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotEnvelope<T> {
    /// Magic header: must be b"BRDG"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    pub payload: T,
}

impl<T> SnapshotEnvelope<T> {
    /// Wrap `payload` with the current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Content of one exported store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreSnapshot<T> {
    /// Entity kind of the exporting store.
    pub kind: String,
    /// Entities in the order they were written.
    pub entities: Vec<T>,
    /// Ids of the entities their key resolved to at export time.
    pub key_owners: Vec<i64>,
}

/// Serialize a value inside an envelope.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = SnapshotEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        error!("Snapshot serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Deserialize a value written by [`encode`], validating the envelope.
///
/// # Errors
///
/// - `Error::InvalidSnapshot`: magic header mismatch
/// - `Error::VersionMismatch`: schema version mismatch
/// - `Error::DeserializationError`: truncated or corrupted payload
pub fn decode<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: SnapshotEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        error!("Snapshot deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;

    if envelope.magic != SNAPSHOT_MAGIC {
        warn!(
            "Invalid snapshot: expected magic {:?}, got {:?}",
            SNAPSHOT_MAGIC, envelope.magic
        );
        return Err(Error::InvalidSnapshot(format!(
            "Invalid magic: expected {:?}, got {:?}",
            SNAPSHOT_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        warn!(
            "Snapshot version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION, envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}
