//! Domain errors raised by the delivery rules

use thiserror::Error;
use uuid::Uuid;

use crate::types::ScoutRole;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A product line would end up outside its valid state space
    #[error("Invalid product line state: {reason}")]
    InvalidProductLineState {
        product_line_id: Option<Uuid>,
        reason: String,
    },

    /// Removal of a role the scout does not hold on the stop
    #[error("Scout {scout_id} does not hold the {role} role on this stop")]
    RoleNotHeld { scout_id: Uuid, role: ScoutRole },

    #[error("Unknown {kind}: {value}")]
    UnknownLabel { kind: &'static str, value: String },
}

impl DomainError {
    pub fn invalid_line(product_line_id: Option<Uuid>, reason: impl Into<String>) -> Self {
        Self::InvalidProductLineState {
            product_line_id,
            reason: reason.into(),
        }
    }
}
