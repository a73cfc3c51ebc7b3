//! Delivery status engine tests
//!
//! Tests for stop status derivation including:
//! - Status precedence over delivered quantities and spread flags
//! - Idempotent "deliver all"
//! - Spreading preconditions

use chrono::Utc;
use proptest::prelude::*;
use shared::{
    derive_stop_progress, mark_all_delivered, mark_all_spread, mark_line_spread, record_delivery,
    resolve_stop_status, set_delivered_quantity, DomainError, ProductLine, StopStatus,
};
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

fn status(lines: &[ProductLine]) -> StopStatus {
    derive_stop_progress(lines)
        .map(|p| p.status)
        .unwrap_or_default()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_fully_delivered_without_spread_is_complete() {
        assert_eq!(status(&[line(10, 10, false, false)]), StopStatus::Complete);
    }

    #[test]
    fn test_unspread_request_holds_stop_in_pending_spread() {
        assert_eq!(status(&[line(5, 5, true, false)]), StopStatus::PendingSpread);
    }

    #[test]
    fn test_spread_done_is_complete() {
        assert_eq!(status(&[line(5, 5, true, true)]), StopStatus::Complete);
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
    fn test_one_short_line_makes_stop_partial() {
        let lines = [line(4, 4, false, false), line(6, 5, true, false)];
        assert_eq!(status(&lines), StopStatus::Partial);
    }

    #[test]
    fn test_no_lines_keeps_stored_status() {
        let empty: [ProductLine; 0] = [];
        assert!(derive_stop_progress(&empty).is_none());
        assert_eq!(
            resolve_stop_status(StopStatus::Delivered, &empty),
            StopStatus::Delivered
        );
    }

    #[test]
    fn test_lines_override_stored_status() {
        let lines = [line(5, 0, false, false)];
        assert_eq!(
            resolve_stop_status(StopStatus::Delivered, &lines),
            StopStatus::Pending
        );
    }

    #[test]
    fn test_set_delivered_rejects_overdelivery() {
        let mut l = line(5, 2, false, false);
        let err = set_delivered_quantity(&mut l, 6).unwrap_err();
        assert!(matches!(err, DomainError::InvalidProductLineState { .. }));
        assert_eq!(l.delivered_quantity, 2);
    }

    #[test]
    fn test_set_delivered_rejects_negative() {
        let mut l = line(5, 2, false, false);
        assert!(set_delivered_quantity(&mut l, -1).is_err());
        assert_eq!(l.delivered_quantity, 2);
    }

    #[test]
    fn test_record_delivery_accumulates() {
        let mut l = line(10, 0, false, false);
        record_delivery(&mut l, 4).unwrap();
        record_delivery(&mut l, 6).unwrap();
        assert_eq!(l.delivered_quantity, 10);
        assert!(record_delivery(&mut l, 1).is_err());
        assert!(record_delivery(&mut l, 0).is_err());
        assert_eq!(l.delivered_quantity, 10);
    }

    #[test]
    fn test_mark_line_spread_requires_request() {
        let mut l = line(5, 5, false, false);
        assert!(mark_line_spread(&mut l).is_err());
        assert!(!l.is_spread);
    }

    #[test]
    fn test_mark_line_spread_requires_full_delivery() {
        let mut l = line(5, 3, true, false);
        assert!(mark_line_spread(&mut l).is_err());

        l.delivered_quantity = 5;
        mark_line_spread(&mut l).unwrap();
        assert!(l.is_spread);
    }

    #[test]
    fn test_mark_all_spread_before_delivery_changes_nothing() {
        let mut lines = vec![line(5, 5, true, false), line(4, 2, true, false)];
        let before = lines.clone();
        assert!(mark_all_spread(&mut lines).is_err());
        assert_eq!(lines, before);
    }

    #[test]
    fn test_mark_all_spread_skips_unrequested_lines() {
        let mut lines = vec![line(5, 5, true, false), line(3, 3, false, false)];
        assert_eq!(mark_all_spread(&mut lines).unwrap(), 1);
        assert!(lines[0].is_spread);
        assert!(!lines[1].is_spread);
        assert_eq!(status(&lines), StopStatus::Complete);
    }

    #[test]
    fn test_deliver_then_spread_walkthrough() {
        let mut lines = vec![line(10, 0, true, false), line(2, 0, false, false)];
        assert_eq!(status(&lines), StopStatus::Pending);

        set_delivered_quantity(&mut lines[0], 4).unwrap();
        assert_eq!(status(&lines), StopStatus::Partial);

        mark_all_delivered(&mut lines);
        assert_eq!(status(&lines), StopStatus::PendingSpread);

        mark_all_spread(&mut lines).unwrap();
        assert_eq!(status(&lines), StopStatus::Complete);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_line() -> impl Strategy<Value = ProductLine> {
        (1i32..=200, any::<bool>(), any::<bool>(), 0u32..=100).prop_map(
            |(quantity, spread_requested, spread_done, pct)| {
                let delivered = (i64::from(quantity) * i64::from(pct) / 100) as i32;
                let is_spread = spread_requested && spread_done && delivered == quantity;
                line(quantity, delivered, spread_requested, is_spread)
            },
        )
    }

    proptest! {
        /// Nothing delivered is pending regardless of spread flags
        #[test]
        fn prop_zero_delivered_is_pending(
            quantities in prop::collection::vec((1i32..=100, any::<bool>()), 1..8)
        ) {
            let lines: Vec<_> = quantities
                .into_iter()
                .map(|(q, spread)| line(q, 0, spread, false))
                .collect();
            prop_assert_eq!(status(&lines), StopStatus::Pending);
        }

        /// Some but not all delivered is partial
        #[test]
        fn prop_partial_delivery_is_partial(
            mut lines in prop::collection::vec(arb_line(), 1..8),
        ) {
            // force 0 < delivered < total
            lines[0].delivered_quantity = 0;
            lines[0].is_spread = false;
            lines.push(line(3, 1, false, false));
            prop_assert_eq!(status(&lines), StopStatus::Partial);
        }

        /// Totals are always the line sums and the engine never yields `delivered`
        #[test]
        fn prop_totals_match_lines(lines in prop::collection::vec(arb_line(), 1..10)) {
            let progress = derive_stop_progress(&lines).unwrap();
            let total: i64 = lines.iter().map(|l| i64::from(l.quantity)).sum();
            let delivered: i64 = lines.iter().map(|l| i64::from(l.delivered_quantity)).sum();
            prop_assert_eq!(progress.total_quantity, total);
            prop_assert_eq!(progress.delivered_quantity, delivered);
            prop_assert_ne!(progress.status, StopStatus::Delivered);
        }

        /// Delivering everything twice leaves the same state as once
        #[test]
        fn prop_mark_all_delivered_idempotent(lines in prop::collection::vec(arb_line(), 0..10)) {
            let mut once = lines.clone();
            mark_all_delivered(&mut once);
            let mut twice = once.clone();
            mark_all_delivered(&mut twice);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.iter().all(|l| l.delivered_quantity == l.quantity));
        }

        /// After delivering and spreading everything a stop is complete
        #[test]
        fn prop_deliver_and_spread_completes(lines in prop::collection::vec(arb_line(), 1..10)) {
            let mut lines = lines;
            mark_all_delivered(&mut lines);
            prop_assert!(mark_all_spread(&mut lines).is_ok());
            prop_assert_eq!(status(&lines), StopStatus::Complete);
        }

        /// Delivered quantity stays within [0, quantity] whatever is attempted
        #[test]
        fn prop_set_delivered_bounds(quantity in 1i32..=100, attempt in -50i32..=150) {
            let mut l = line(quantity, 0, false, false);
            let result = set_delivered_quantity(&mut l, attempt);
            prop_assert_eq!(result.is_ok(), (0..=quantity).contains(&attempt));
            prop_assert!(l.delivered_quantity >= 0 && l.delivered_quantity <= l.quantity);
        }
    }
}
