//! Common labels used across the platform

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// Delivery status of a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    /// Nothing delivered yet
    #[default]
    Pending,
    /// Some, but not all, product delivered
    Partial,
    /// Set directly on stops without product lines
    Delivered,
    /// Everything delivered, spreading still outstanding
    PendingSpread,
    /// Everything delivered and spread
    Complete,
}

impl StopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Pending => "pending",
            StopStatus::Partial => "partial",
            StopStatus::Delivered => "delivered",
            StopStatus::PendingSpread => "pending_spread",
            StopStatus::Complete => "complete",
        }
    }
}

impl std::fmt::Display for StopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopStatus::Pending => write!(f, "Pending"),
            StopStatus::Partial => write!(f, "Partially Delivered"),
            StopStatus::Delivered => write!(f, "Delivered"),
            StopStatus::PendingSpread => write!(f, "Awaiting Spread"),
            StopStatus::Complete => write!(f, "Complete"),
        }
    }
}

impl FromStr for StopStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StopStatus::Pending),
            "partial" => Ok(StopStatus::Partial),
            "delivered" => Ok(StopStatus::Delivered),
            "pending_spread" => Ok(StopStatus::PendingSpread),
            "complete" => Ok(StopStatus::Complete),
            other => Err(DomainError::UnknownLabel {
                kind: "stop status",
                value: other.to_string(),
            }),
        }
    }
}

/// Work a scout performs at a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoutRole {
    Drop,
    Spread,
}

impl ScoutRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoutRole::Drop => "drop",
            ScoutRole::Spread => "spread",
        }
    }
}

impl std::fmt::Display for ScoutRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoutRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(ScoutRole::Drop),
            "spread" => Ok(ScoutRole::Spread),
            other => Err(DomainError::UnknownLabel {
                kind: "scout role",
                value: other.to_string(),
            }),
        }
    }
}

/// Which roles a bulk truck-scout assignment should create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSelection {
    #[serde(default)]
    pub drop: bool,
    #[serde(default)]
    pub spread: bool,
}

impl RoleSelection {
    /// Selected roles in a stable order
    pub fn roles(&self) -> Vec<ScoutRole> {
        let mut roles = Vec::with_capacity(2);
        if self.drop {
            roles.push(ScoutRole::Drop);
        }
        if self.spread {
            roles.push(ScoutRole::Spread);
        }
        roles
    }

    pub fn is_empty(&self) -> bool {
        !self.drop && !self.spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_status_labels_round_trip_through_str() {
        for status in [
            StopStatus::Pending,
            StopStatus::Partial,
            StopStatus::Delivered,
            StopStatus::PendingSpread,
            StopStatus::Complete,
        ] {
            assert_eq!(status.as_str().parse::<StopStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_stop_status_serializes_snake_case() {
        let json = serde_json::to_string(&StopStatus::PendingSpread).unwrap();
        assert_eq!(json, "\"pending_spread\"");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!("shipped".parse::<StopStatus>().is_err());
        assert!("".parse::<ScoutRole>().is_err());
    }

    #[test]
    fn test_role_selection() {
        let both = RoleSelection { drop: true, spread: true };
        assert_eq!(both.roles(), vec![ScoutRole::Drop, ScoutRole::Spread]);

        let none = RoleSelection::default();
        assert!(none.is_empty());
        assert!(none.roles().is_empty());
    }
}
