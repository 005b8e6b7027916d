//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::PresenceSnapshot;

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthDto {
    pub status: String,
}

/// Body of `GET /debug/presence`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceDto {
    pub version: u64,
    /// Distinct user keys in registration order
    pub clients: Vec<String>,
    /// Registered connections, counting every device
    pub connections: usize,
}

impl PresenceDto {
    pub fn new(snapshot: &PresenceSnapshot, connections: usize) -> Self {
        Self {
            version: snapshot.version,
            clients: snapshot
                .user_ids()
                .into_iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            connections,
        }
    }
}
