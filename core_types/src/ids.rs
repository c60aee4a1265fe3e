//! Unique identifiers for runtime entities

use crate::uuid_tools::new_uuid;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a materialized accessor
///
/// Every time an identifier is materialized into a live manager it receives a
/// fresh `AccessorId`. Two handles with the same `AccessorId` refer to the
/// same in-memory resource; a reload after release gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessorId(Uuid);

impl AccessorId {
    /// Creates a new random accessor ID
    pub fn new() -> Self {
        Self(new_uuid())
    }

    /// Creates an accessor ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AccessorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor({})", self.0)
    }
}
