//! Scouts and their assignments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ScoutRole;

/// A person who drops or spreads product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scout {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One role held by a scout on a stop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StopScout {
    pub stop_id: Uuid,
    pub scout_id: Uuid,
    pub role: ScoutRole,
}

/// Scout assigned to a stop with every role they hold there
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignedScout {
    pub scout_id: Uuid,
    pub name: String,
    pub roles: Vec<ScoutRole>,
}
