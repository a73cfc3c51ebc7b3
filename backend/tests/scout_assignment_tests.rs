//! Scout role assignment tests
//!
//! Tests for the stop/scout/role relation including:
//! - One row per (stop, scout, role)
//! - Removing a role keeps the scout's other roles
//! - Removing a role the scout does not hold is refused
//! - Bulk assignment from a truck crew

use chrono::Utc;
use proptest::prelude::*;
use shared::{
    group_scout_roles, role_to_remove, roles_to_add, truck_scout_assignments, DomainError,
    RoleSelection, Scout, ScoutRole, StopScout,
};
use uuid::Uuid;

/// Apply an assignment the way the scout service does
fn assign(rows: &mut Vec<StopScout>, requested: &[StopScout]) -> usize {
    let added = roles_to_add(rows, requested);
    rows.extend(&added);
    added.len()
}

/// Apply a removal the way the scout service does
fn remove(
    rows: &mut Vec<StopScout>,
    stop_id: Uuid,
    scout_id: Uuid,
    role: ScoutRole,
) -> Result<(), DomainError> {
    let target = role_to_remove(rows, stop_id, scout_id, role)?;
    rows.retain(|r| *r != target);
    Ok(())
}

fn scout(name: &str) -> Scout {
    Scout {
        id: Uuid::new_v4(),
        name: name.to_string(),
        created_at: Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_both_roles_then_remove_drop() {
        let stop_id = Uuid::new_v4();
        let a = scout("Avery");
        let mut rows = Vec::new();

        assert_eq!(assign(&mut rows, &[StopScout { stop_id, scout_id: a.id, role: ScoutRole::Drop }]), 1);
        assert_eq!(assign(&mut rows, &[StopScout { stop_id, scout_id: a.id, role: ScoutRole::Spread }]), 1);

        let roster = group_scout_roles(stop_id, &rows, std::slice::from_ref(&a));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].roles, vec![ScoutRole::Drop, ScoutRole::Spread]);

        remove(&mut rows, stop_id, a.id, ScoutRole::Drop).unwrap();
        let roster = group_scout_roles(stop_id, &rows, std::slice::from_ref(&a));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].roles, vec![ScoutRole::Spread]);
    }

    #[test]
    fn test_duplicate_assignment_is_ignored() {
        let stop_id = Uuid::new_v4();
        let a = scout("Avery");
        let row = StopScout { stop_id, scout_id: a.id, role: ScoutRole::Drop };
        let mut rows = Vec::new();

        assert_eq!(assign(&mut rows, &[row]), 1);
        assert_eq!(assign(&mut rows, &[row]), 0);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_last_role_removed_drops_scout() {
        let stop_id = Uuid::new_v4();
        let a = scout("Avery");
        let mut rows = vec![StopScout { stop_id, scout_id: a.id, role: ScoutRole::Spread }];

        remove(&mut rows, stop_id, a.id, ScoutRole::Spread).unwrap();
        assert!(group_scout_roles(stop_id, &rows, &[a]).is_empty());
    }

    #[test]
    fn test_removing_missing_role_is_refused() {
        let stop_id = Uuid::new_v4();
        let a = scout("Avery");
        let mut rows = vec![StopScout { stop_id, scout_id: a.id, role: ScoutRole::Drop }];

        let err = remove(&mut rows, stop_id, a.id, ScoutRole::Spread).unwrap_err();
        assert_eq!(err, DomainError::RoleNotHeld { scout_id: a.id, role: ScoutRole::Spread });
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_truck_crew_skips_roles_already_held() {
        let stop_id = Uuid::new_v4();
        let crew = [Uuid::new_v4(), Uuid::new_v4()];
        let mut rows = vec![StopScout { stop_id, scout_id: crew[0], role: ScoutRole::Drop }];

        let requested = truck_scout_assignments(stop_id, &crew, RoleSelection { drop: true, spread: true });
        assert_eq!(assign(&mut rows, &requested), 3);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_truck_crew_assignment() {
        let stop_id = Uuid::new_v4();
        let crew = [Uuid::new_v4(), Uuid::new_v4()];

        let rows = truck_scout_assignments(stop_id, &crew, RoleSelection { drop: true, spread: true });
        assert_eq!(rows.len(), 4);

        let rows = truck_scout_assignments(stop_id, &crew, RoleSelection { drop: false, spread: true });
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.role == ScoutRole::Spread));

        assert!(truck_scout_assignments(stop_id, &crew, RoleSelection::default()).is_empty());
        assert!(truck_scout_assignments(stop_id, &[], RoleSelection { drop: true, spread: false }).is_empty());
    }

    #[test]
    fn test_roster_sorted_by_name() {
        let stop_id = Uuid::new_v4();
        let zed = scout("Zed");
        let amy = scout("Amy");
        let rows = vec![
            StopScout { stop_id, scout_id: zed.id, role: ScoutRole::Drop },
            StopScout { stop_id, scout_id: amy.id, role: ScoutRole::Spread },
        ];
        let roster = group_scout_roles(stop_id, &rows, &[zed, amy]);
        assert_eq!(roster[0].name, "Amy");
        assert_eq!(roster[1].name, "Zed");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_role() -> impl Strategy<Value = ScoutRole> {
        prop_oneof![Just(ScoutRole::Drop), Just(ScoutRole::Spread)]
    }

    proptest! {
        /// Any sequence of assignments leaves unique triples and one roster entry per scout
        #[test]
        fn prop_assignments_stay_unique(
            ops in prop::collection::vec((0usize..3, arb_role()), 0..30)
        ) {
            let stop_id = Uuid::new_v4();
            let scouts = [scout("A"), scout("B"), scout("C")];
            let mut rows = Vec::new();

            for (idx, role) in ops {
                assign(&mut rows, &[StopScout { stop_id, scout_id: scouts[idx].id, role }]);
            }

            let mut deduped = rows.clone();
            deduped.sort_by_key(|r| (r.scout_id, r.role));
            deduped.dedup();
            prop_assert_eq!(deduped.len(), rows.len());

            let roster = group_scout_roles(stop_id, &rows, &scouts);
            let role_count: usize = roster.iter().map(|s| s.roles.len()).sum();
            prop_assert_eq!(role_count, rows.len());
        }

        /// Removing one role never touches the scout's other role
        #[test]
        fn prop_remove_is_exact(first in arb_role(), second in arb_role()) {
            let stop_id = Uuid::new_v4();
            let a = scout("A");
            let mut rows = Vec::new();
            assign(&mut rows, &[
                StopScout { stop_id, scout_id: a.id, role: first },
                StopScout { stop_id, scout_id: a.id, role: second },
            ]);

            prop_assert!(remove(&mut rows, stop_id, a.id, first).is_ok());
            prop_assert!(remove(&mut rows, stop_id, a.id, first).is_err());
            prop_assert!(rows.iter().all(|r| r.role != first));
            if first != second {
                prop_assert!(rows.iter().any(|r| r.role == second));
            }
        }
    }
}
