//! Opaque identifiers and the generators that mint them

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CadenzaError, Result};

/// Source of fresh identifiers.
///
/// Implementations must never hand out the same id twice for the lifetime of
/// the process. Nothing else about the id (length, alphabet, ordering) is
/// relied upon.
pub trait IdGenerator: Send + Sync {
    fn generate_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids, handy for tests and reproducible documents
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

fn non_empty(kind: &str, value: String) -> Result<Arc<str>> {
    if value.is_empty() {
        return Err(CadenzaError::invalid(format!("{kind} must not be empty")));
    }
    Ok(Arc::from(value))
}

/// Unique identifier for events, unique within a track
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(Arc<str>);

impl EventId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        non_empty("event id", value.into()).map(Self)
    }

    pub fn generate(ids: &dyn IdGenerator) -> Result<Self> {
        Self::new(ids.generate_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventId {
    type Error = CadenzaError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0.to_string()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for tracks, unique within a project
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackId(Arc<str>);

impl TrackId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        non_empty("track id", value.into()).map(Self)
    }

    pub fn generate(ids: &dyn IdGenerator) -> Result<Self> {
        Self::new(ids.generate_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrackId {
    type Error = CadenzaError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TrackId> for String {
    fn from(id: TrackId) -> Self {
        id.0.to_string()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
