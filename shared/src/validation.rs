//! Validation rules for product lines and other inputs
//!
//! Product line states are checked at the write boundary so the status
//! engine only ever sees well-formed records.

use uuid::Uuid;

use crate::error::DomainError;
use crate::models::ProductLine;

// ============================================================================
// Product Line Validations
// ============================================================================

/// Validate a requested quantity (must be positive)
pub fn validate_quantity(product_line_id: Option<Uuid>, quantity: i32) -> Result<(), DomainError> {
    if quantity <= 0 {
        return Err(DomainError::invalid_line(
            product_line_id,
            format!("quantity must be positive, got {}", quantity),
        ));
    }
    Ok(())
}

/// Validate a delivered quantity against the requested quantity
pub fn validate_delivered_quantity(
    product_line_id: Option<Uuid>,
    quantity: i32,
    delivered: i32,
) -> Result<(), DomainError> {
    if delivered < 0 {
        return Err(DomainError::invalid_line(
            product_line_id,
            format!("delivered quantity cannot be negative, got {}", delivered),
        ));
    }
    if delivered > quantity {
        return Err(DomainError::invalid_line(
            product_line_id,
            format!(
                "delivered quantity {} exceeds requested quantity {}",
                delivered, quantity
            ),
        ));
    }
    Ok(())
}

/// A line may be marked spread once spreading was requested and every bag is delivered
pub fn validate_spreadable(
    product_line_id: Option<Uuid>,
    quantity: i32,
    delivered: i32,
    spread_requested: bool,
) -> Result<(), DomainError> {
    if !spread_requested {
        return Err(DomainError::invalid_line(
            product_line_id,
            "spreading was not requested for this product",
        ));
    }
    if delivered < quantity {
        return Err(DomainError::invalid_line(
            product_line_id,
            format!(
                "product must be fully delivered before spreading ({} of {} delivered)",
                delivered, quantity
            ),
        ));
    }
    Ok(())
}

/// Validate the spread flags of a line
pub fn validate_spread_flags(
    product_line_id: Option<Uuid>,
    spread_requested: bool,
    is_spread: bool,
) -> Result<(), DomainError> {
    if is_spread && !spread_requested {
        return Err(DomainError::invalid_line(
            product_line_id,
            "product cannot be spread without a spread request",
        ));
    }
    Ok(())
}

/// Validate every invariant of a product line
pub fn validate_product_line(line: &ProductLine) -> Result<(), DomainError> {
    let id = Some(line.id);
    validate_quantity(id, line.quantity)?;
    validate_delivered_quantity(id, line.quantity, line.delivered_quantity)?;
    validate_spread_flags(id, line.spread_requested, line.is_spread)
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate that a required text field is not blank
pub fn validate_required_text(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value must not be blank");
    }
    Ok(())
}

/// Validate truck capacity (bags, zero allowed for parked trucks)
pub fn validate_capacity(capacity: i32) -> Result<(), &'static str> {
    if capacity < 0 {
        return Err("Capacity cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(quantity: i32, delivered: i32, spread_requested: bool, is_spread: bool) -> ProductLine {
        let now = Utc::now();
        ProductLine {
            id: Uuid::new_v4(),
            stop_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity,
            delivered_quantity: delivered,
            spread_requested,
            is_spread,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(None, 1).is_ok());
        assert!(validate_quantity(None, 0).is_err());
        assert!(validate_quantity(None, -3).is_err());
    }

    #[test]
    fn test_validate_delivered_quantity() {
        assert!(validate_delivered_quantity(None, 10, 0).is_ok());
        assert!(validate_delivered_quantity(None, 10, 10).is_ok());
        assert!(validate_delivered_quantity(None, 10, 11).is_err());
        assert!(validate_delivered_quantity(None, 10, -1).is_err());
    }

    #[test]
    fn test_spread_needs_request() {
        assert!(validate_spread_flags(None, true, true).is_ok());
        assert!(validate_spread_flags(None, true, false).is_ok());
        assert!(validate_spread_flags(None, false, true).is_err());
    }

    #[test]
    fn test_spreadable_only_when_requested_and_delivered() {
        assert!(validate_spreadable(None, 5, 5, true).is_ok());
        assert!(validate_spreadable(None, 5, 4, true).is_err());
        assert!(validate_spreadable(None, 5, 5, false).is_err());
    }

    #[test]
    fn test_validate_product_line() {
        assert!(validate_product_line(&line(5, 5, true, true)).is_ok());
        assert!(validate_product_line(&line(5, 6, false, false)).is_err());
        assert!(validate_product_line(&line(0, 0, false, false)).is_err());
        assert!(validate_product_line(&line(5, 5, false, true)).is_err());
    }

    #[test]
    fn test_error_carries_line_id() {
        let l = line(5, 9, false, false);
        match validate_product_line(&l) {
            Err(DomainError::InvalidProductLineState { product_line_id, .. }) => {
                assert_eq!(product_line_id, Some(l.id));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("Route 7").is_ok());
        assert!(validate_required_text("   ").is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(0).is_ok());
        assert!(validate_capacity(120).is_ok());
        assert!(validate_capacity(-1).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn delivered_accepted_iff_in_range(quantity in 1i32..500, delivered in -100i32..600) {
                let ok = validate_delivered_quantity(None, quantity, delivered).is_ok();
                prop_assert_eq!(ok, delivered >= 0 && delivered <= quantity);
            }

            #[test]
            fn valid_lines_pass(quantity in 1i32..500, pct in 0i32..=100, requested: bool, spread: bool) {
                let delivered = quantity * pct / 100;
                let l = line(quantity, delivered, requested, requested && spread);
                prop_assert!(validate_product_line(&l).is_ok());
            }
        }
    }
}
