//! Versioned state snapshots and the storage abstraction behind them.
//!
//! State is persisted as an opaque snapshot: the domain converts its in-memory
//! state into a flat, versioned record type, and the record is wrapped in a
//! [`SnapshotEnvelope`] naming its kind and schema version before being encoded
//! with `bincode`. The in-memory representation can change freely as long as the
//! record schema stays stable.
//!
//! # Implementations
//!
//! - `FileSnapshotStore` (in `gala-runtime`): Production implementation
//! - `InMemorySnapshotStore` (in `gala-testing`): Fast, deterministic testing
//!
//! # Example
//!
//! ```
//! use gala_core::snapshot::{decode_snapshot, encode_snapshot, Snapshot, SnapshotError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq)]
//! struct Counter {
//!     count: u64,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct CounterRecordV1 {
//!     count: u64,
//! }
//!
//! impl Snapshot for Counter {
//!     const KIND: &'static str = "counter";
//!     const SCHEMA_VERSION: u32 = 1;
//!     type Record = CounterRecordV1;
//!
//!     fn to_record(&self) -> CounterRecordV1 {
//!         CounterRecordV1 { count: self.count }
//!     }
//!
//!     fn from_record(record: CounterRecordV1) -> Result<Self, SnapshotError> {
//!         Ok(Counter { count: record.count })
//!     }
//! }
//!
//! let bytes = encode_snapshot(&Counter { count: 3 }).unwrap();
//! let restored: Counter = decode_snapshot(&bytes).unwrap();
//! assert_eq!(restored, Counter { count: 3 });
//! ```

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Errors that can occur while encoding, decoding or storing snapshots.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Failed to serialize a snapshot to bytes.
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(String),

    /// The stored bytes could not be decoded.
    #[error("Failed to deserialize snapshot: {0}")]
    Deserialization(String),

    /// The envelope holds a snapshot of another kind of state.
    #[error("Snapshot kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// Kind the caller asked for
        expected: String,
        /// Kind found in the envelope
        found: String,
    },

    /// The envelope was written by an unsupported schema version.
    #[error("Unsupported snapshot schema version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version the caller understands
        expected: u32,
        /// Version found in the envelope
        found: u32,
    },

    /// The record decoded fine but describes an impossible state.
    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),

    /// The underlying storage failed.
    #[error("Snapshot storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Wire format for a stored snapshot.
///
/// The payload is the `bincode` encoding of the domain's record type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// What kind of state this is (e.g., `"gala"`)
    pub kind: String,
    /// Schema version of the record inside `data`
    pub schema_version: u32,
    /// Encoded record
    pub data: Vec<u8>,
}

/// State that can be written to and restored from a versioned snapshot.
pub trait Snapshot: Sized {
    /// Stable identifier for this kind of state
    const KIND: &'static str;

    /// Version of [`Snapshot::Record`]; bump when its layout changes
    const SCHEMA_VERSION: u32;

    /// Flat record persisted on disk
    type Record: Serialize + DeserializeOwned;

    /// Convert the in-memory state to its record
    fn to_record(&self) -> Self::Record;

    /// Rebuild the in-memory state from a record
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Corrupt`] if the record describes a state that
    /// violates the domain's invariants.
    fn from_record(record: Self::Record) -> Result<Self, SnapshotError>;
}

/// Encode state into envelope bytes.
///
/// # Errors
///
/// Returns [`SnapshotError::Serialization`] if `bincode` fails.
pub fn encode_snapshot<S: Snapshot>(state: &S) -> Result<Vec<u8>, SnapshotError> {
    let data = bincode::serialize(&state.to_record())
        .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

    let envelope = SnapshotEnvelope {
        kind: S::KIND.to_string(),
        schema_version: S::SCHEMA_VERSION,
        data,
    };

    bincode::serialize(&envelope).map_err(|e| SnapshotError::Serialization(e.to_string()))
}

/// Decode envelope bytes back into state.
///
/// # Errors
///
/// - [`SnapshotError::Deserialization`]: the bytes are not a valid envelope or record
/// - [`SnapshotError::KindMismatch`] / [`SnapshotError::UnsupportedVersion`]: the envelope
///   was written for another state type or schema
/// - [`SnapshotError::Corrupt`]: the record violates the domain's invariants
pub fn decode_snapshot<S: Snapshot>(bytes: &[u8]) -> Result<S, SnapshotError> {
    let envelope: SnapshotEnvelope =
        bincode::deserialize(bytes).map_err(|e| SnapshotError::Deserialization(e.to_string()))?;

    if envelope.kind != S::KIND {
        return Err(SnapshotError::KindMismatch {
            expected: S::KIND.to_string(),
            found: envelope.kind,
        });
    }

    if envelope.schema_version != S::SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            expected: S::SCHEMA_VERSION,
            found: envelope.schema_version,
        });
    }

    let record: S::Record = bincode::deserialize(&envelope.data)
        .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;

    S::from_record(record)
}

/// Durable storage for a single snapshot slot.
///
/// Implementations must make `save` all-or-nothing: after a failed save the
/// previously stored snapshot is still readable.
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot bytes, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Storage`] if the storage cannot be read.
    fn load(&self) -> Result<Option<Vec<u8>>, SnapshotError>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Storage`] if the storage cannot be written.
    fn save(&self, bytes: &[u8]) -> Result<(), SnapshotError>;
}
