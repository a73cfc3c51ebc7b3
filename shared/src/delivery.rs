//! Delivery status engine
//!
//! Derives a stop's totals and status label from its product lines, and
//! applies the delivery and spreading commands to those lines. Everything
//! here is pure; the backend persists the results.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::models::ProductLine;
use crate::types::StopStatus;
use crate::validation::{validate_delivered_quantity, validate_spreadable};

/// Aggregate delivery state of one stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopProgress {
    pub total_quantity: i64,
    pub delivered_quantity: i64,
    pub status: StopStatus,
}

/// Sum requested and delivered quantities over a stop's lines
pub fn stop_totals<L: AsRef<ProductLine>>(lines: &[L]) -> (i64, i64) {
    lines.iter().fold((0i64, 0i64), |(total, delivered), line| {
        let line = line.as_ref();
        (
            total + i64::from(line.quantity),
            delivered + i64::from(line.delivered_quantity),
        )
    })
}

/// Derive totals and status from a stop's product lines.
///
/// Returns `None` for an empty line list: a stop without product lines has no
/// derived status and keeps whatever status it already has.
pub fn derive_stop_progress<L: AsRef<ProductLine>>(lines: &[L]) -> Option<StopProgress> {
    if lines.is_empty() {
        return None;
    }

    let (total_quantity, delivered_quantity) = stop_totals(lines);
    let needs_spread = lines.iter().any(|l| l.as_ref().spread_requested);
    let all_spread_complete = !lines
        .iter()
        .map(AsRef::as_ref)
        .any(|l| l.spread_requested && !l.is_spread);

    let status = if delivered_quantity == 0 {
        StopStatus::Pending
    } else if delivered_quantity < total_quantity {
        StopStatus::Partial
    } else if needs_spread && !all_spread_complete {
        StopStatus::PendingSpread
    } else {
        StopStatus::Complete
    };

    Some(StopProgress {
        total_quantity,
        delivered_quantity,
        status,
    })
}

/// Status a stop should carry after its lines changed
pub fn resolve_stop_status<L: AsRef<ProductLine>>(current: StopStatus, lines: &[L]) -> StopStatus {
    derive_stop_progress(lines)
        .map(|p| p.status)
        .unwrap_or(current)
}

/// Set every line's delivered quantity to its requested quantity.
///
/// Unconditional, so applying it twice leaves the same state as once.
pub fn mark_all_delivered(lines: &mut [ProductLine]) {
    for line in lines.iter_mut() {
        line.delivered_quantity = line.quantity;
    }
}

/// Overwrite the delivered quantity of one line
pub fn set_delivered_quantity(line: &mut ProductLine, delivered: i32) -> Result<(), DomainError> {
    validate_delivered_quantity(Some(line.id), line.quantity, delivered)?;
    line.delivered_quantity = delivered;
    Ok(())
}

/// Add a newly delivered amount to what a line has already received
pub fn record_delivery(line: &mut ProductLine, amount: i32) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::invalid_line(
            Some(line.id),
            "delivered amount must be positive",
        ));
    }
    let delivered = line.delivered_quantity.checked_add(amount).ok_or_else(|| {
        DomainError::invalid_line(Some(line.id), "delivered quantity overflow")
    })?;
    set_delivered_quantity(line, delivered)
}

/// Mark a single line as spread.
///
/// The line must have a spread request and be fully delivered.
pub fn mark_line_spread(line: &mut ProductLine) -> Result<(), DomainError> {
    check_spreadable(line)?;
    line.is_spread = true;
    Ok(())
}

/// Mark every spread-requested line as spread.
///
/// Lines without a spread request are left alone. Fails without touching any
/// line when a spread-requested line is not fully delivered yet. Returns the
/// number of lines that carry a spread request.
pub fn mark_all_spread(lines: &mut [ProductLine]) -> Result<usize, DomainError> {
    for line in lines.iter().filter(|l| l.spread_requested) {
        check_spreadable(line)?;
    }

    let mut marked = 0;
    for line in lines.iter_mut().filter(|l| l.spread_requested) {
        line.is_spread = true;
        marked += 1;
    }
    Ok(marked)
}

fn check_spreadable(line: &ProductLine) -> Result<(), DomainError> {
    validate_spreadable(
        Some(line.id),
        line.quantity,
        line.delivered_quantity,
        line.spread_requested,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn line(quantity: i32, delivered: i32, spread_requested: bool, is_spread: bool) -> ProductLine {
        let now = Utc::now();
        ProductLine {
            id: Uuid::new_v4(),
            stop_id: Uuid::nil(),
            product_id: Uuid::new_v4(),
            quantity,
            delivered_quantity: delivered,
            spread_requested,
            is_spread,
            created_at: now,
            updated_at: now,
        }
    }

    fn status_of(lines: &[ProductLine]) -> StopStatus {
        derive_stop_progress(lines).unwrap().status
    }

    // ========================================================================
    // Status derivation
    // ========================================================================

    #[test]
    fn test_nothing_delivered_is_pending() {
        assert_eq!(status_of(&[line(10, 0, false, false)]), StopStatus::Pending);
        assert_eq!(status_of(&[line(4, 0, true, true)]), StopStatus::Pending);
    }

    #[test]
    fn test_partial_delivery() {
        assert_eq!(status_of(&[line(10, 4, false, false)]), StopStatus::Partial);
    }

    #[test]
    fn test_one_short_line_pulls_stop_to_partial() {
        let lines = [line(10, 10, false, false), line(5, 4, false, false)];
        assert_eq!(status_of(&lines), StopStatus::Partial);
    }

    #[test]
    fn test_complete_without_spread() {
        assert_eq!(status_of(&[line(10, 10, false, false)]), StopStatus::Complete);
    }

    #[test]
    fn test_pending_spread() {
        assert_eq!(status_of(&[line(5, 5, true, false)]), StopStatus::PendingSpread);
    }

    #[test]
    fn test_complete_after_spread() {
        assert_eq!(status_of(&[line(5, 5, true, true)]), StopStatus::Complete);
    }

    #[test]
    fn test_mixed_lines_totals() {
        let lines = [line(5, 5, true, true), line(3, 3, false, false)];
        let progress = derive_stop_progress(&lines).unwrap();
        assert_eq!(progress.total_quantity, 8);
        assert_eq!(progress.delivered_quantity, 8);
        assert_eq!(progress.status, StopStatus::Complete);
    }

    #[test]
    fn test_no_lines_has_no_derived_status() {
        let lines: Vec<ProductLine> = Vec::new();
        assert!(derive_stop_progress(&lines).is_none());
        assert_eq!(
            resolve_stop_status(StopStatus::Delivered, &lines),
            StopStatus::Delivered
        );
    }

    // ========================================================================
    // Commands
    // ========================================================================

    #[test]
    fn test_mark_all_delivered_is_idempotent() {
        let mut lines = vec![line(5, 2, true, false), line(3, 0, false, false)];
        mark_all_delivered(&mut lines);
        let once = lines.clone();
        mark_all_delivered(&mut lines);

        assert_eq!(lines, once);
        assert!(lines.iter().all(|l| l.delivered_quantity == l.quantity));
        assert_eq!(status_of(&lines), StopStatus::PendingSpread);
    }

    #[test]
    fn test_mark_all_spread_only_touches_requested_lines() {
        let mut lines = vec![line(5, 5, true, false), line(3, 3, false, false)];
        assert_eq!(mark_all_spread(&mut lines).unwrap(), 1);
        assert!(lines[0].is_spread);
        assert!(!lines[1].is_spread);
        assert_eq!(status_of(&lines), StopStatus::Complete);
    }

    #[test]
    fn test_mark_all_spread_requires_delivery_and_changes_nothing_on_failure() {
        let mut lines = vec![line(5, 5, true, false), line(4, 1, true, false)];
        let before = lines.clone();

        let err = mark_all_spread(&mut lines).unwrap_err();
        assert!(matches!(err, DomainError::InvalidProductLineState { .. }));
        assert_eq!(lines, before);
    }

    #[test]
    fn test_mark_line_spread_without_request_fails() {
        let mut l = line(5, 5, false, false);
        assert!(mark_line_spread(&mut l).is_err());
        assert!(!l.is_spread);
    }

    #[test]
    fn test_set_delivered_quantity_bounds() {
        let mut l = line(5, 0, false, false);
        assert!(set_delivered_quantity(&mut l, 6).is_err());
        assert!(set_delivered_quantity(&mut l, -1).is_err());
        assert_eq!(l.delivered_quantity, 0);

        set_delivered_quantity(&mut l, 5).unwrap();
        assert_eq!(l.delivered_quantity, 5);
    }

    #[test]
    fn test_record_delivery_accumulates() {
        let mut l = line(10, 0, false, false);
        record_delivery(&mut l, 4).unwrap();
        record_delivery(&mut l, 3).unwrap();
        assert_eq!(l.delivered_quantity, 7);

        assert!(record_delivery(&mut l, 4).is_err());
        assert!(record_delivery(&mut l, 0).is_err());
        assert_eq!(l.delivered_quantity, 7);
    }
}
