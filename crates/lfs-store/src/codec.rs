//! Opaque binary encoding for persisted records.
//!
//! Payloads are bincode over the serde derives in `lfs-types`. The format
//! is internal to the store; only round-trip fidelity matters.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

pub(crate) fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Codec(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}
