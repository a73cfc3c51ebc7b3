//! Scout role assignment rules
//!
//! A scout may hold the drop and spread roles on the same stop; each role is
//! its own relation row and (stop, scout, role) is unique.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{AssignedScout, Scout, StopScout};
use crate::types::{RoleSelection, ScoutRole};

/// Rows from `requested` the stop does not hold yet, each triple once.
///
/// Assigning a role a scout already holds adds nothing.
pub fn roles_to_add(existing: &[StopScout], requested: &[StopScout]) -> Vec<StopScout> {
    let mut added: Vec<StopScout> = Vec::new();
    for row in requested {
        if !existing.contains(row) && !added.contains(row) {
            added.push(*row);
        }
    }
    added
}

/// The single row a role removal deletes.
///
/// Fails with `RoleNotHeld` when the scout does not hold that role on the
/// stop; the scout's other roles are never part of the removal.
pub fn role_to_remove(
    existing: &[StopScout],
    stop_id: Uuid,
    scout_id: Uuid,
    role: ScoutRole,
) -> Result<StopScout, DomainError> {
    let target = StopScout {
        stop_id,
        scout_id,
        role,
    };
    if existing.contains(&target) {
        Ok(target)
    } else {
        Err(DomainError::RoleNotHeld { scout_id, role })
    }
}

/// Role rows for putting a truck's crew onto a stop
pub fn truck_scout_assignments(
    stop_id: Uuid,
    scout_ids: &[Uuid],
    roles: RoleSelection,
) -> Vec<StopScout> {
    roles
        .roles()
        .into_iter()
        .flat_map(|role| {
            scout_ids.iter().map(move |&scout_id| StopScout {
                stop_id,
                scout_id,
                role,
            })
        })
        .collect()
}

/// Group a stop's role rows per scout.
///
/// Each scout appears once with de-duplicated roles; rows pointing at unknown
/// scouts are skipped. Ordered by scout name.
pub fn group_scout_roles(stop_id: Uuid, rows: &[StopScout], scouts: &[Scout]) -> Vec<AssignedScout> {
    let mut grouped: BTreeMap<Uuid, AssignedScout> = BTreeMap::new();

    for row in rows.iter().filter(|r| r.stop_id == stop_id) {
        let Some(scout) = scouts.iter().find(|s| s.id == row.scout_id) else {
            continue;
        };
        let entry = grouped.entry(scout.id).or_insert_with(|| AssignedScout {
            scout_id: scout.id,
            name: scout.name.clone(),
            roles: Vec::new(),
        });
        if !entry.roles.contains(&row.role) {
            entry.roles.push(row.role);
        }
    }

    let mut assigned: Vec<AssignedScout> = grouped.into_values().collect();
    for scout in &mut assigned {
        scout.roles.sort();
    }
    assigned.sort_by(|a, b| a.name.cmp(&b.name).then(a.scout_id.cmp(&b.scout_id)));
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scout(name: &str) -> Scout {
        Scout {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn row(stop_id: Uuid, scout_id: Uuid, role: ScoutRole) -> StopScout {
        StopScout {
            stop_id,
            scout_id,
            role,
        }
    }

    #[test]
    fn test_both_roles_show_once() {
        let stop_id = Uuid::new_v4();
        let a = scout("Avery");
        let rows = roles_to_add(
            &[],
            &[
                row(stop_id, a.id, ScoutRole::Drop),
                row(stop_id, a.id, ScoutRole::Spread),
            ],
        );
        assert_eq!(rows.len(), 2);

        let assigned = group_scout_roles(stop_id, &rows, std::slice::from_ref(&a));
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].roles, vec![ScoutRole::Drop, ScoutRole::Spread]);
    }

    #[test]
    fn test_removing_one_role_targets_only_that_row() {
        let stop_id = Uuid::new_v4();
        let a = scout("Avery");
        let mut rows = vec![
            row(stop_id, a.id, ScoutRole::Drop),
            row(stop_id, a.id, ScoutRole::Spread),
        ];

        let removed = role_to_remove(&rows, stop_id, a.id, ScoutRole::Drop).unwrap();
        assert_eq!(removed, row(stop_id, a.id, ScoutRole::Drop));
        rows.retain(|r| *r != removed);

        let assigned = group_scout_roles(stop_id, &rows, std::slice::from_ref(&a));
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].roles, vec![ScoutRole::Spread]);
    }

    #[test]
    fn test_duplicate_assignment_adds_nothing() {
        let stop_id = Uuid::new_v4();
        let scout_id = Uuid::new_v4();
        let existing = vec![row(stop_id, scout_id, ScoutRole::Drop)];

        assert!(roles_to_add(&existing, &[row(stop_id, scout_id, ScoutRole::Drop)]).is_empty());

        let twice = [row(stop_id, scout_id, ScoutRole::Spread); 2];
        assert_eq!(roles_to_add(&existing, &twice).len(), 1);
    }

    #[test]
    fn test_removing_role_not_held_fails() {
        let stop_id = Uuid::new_v4();
        let scout_id = Uuid::new_v4();
        let rows = vec![row(stop_id, scout_id, ScoutRole::Drop)];

        assert_eq!(
            role_to_remove(&rows, stop_id, scout_id, ScoutRole::Spread),
            Err(DomainError::RoleNotHeld {
                scout_id,
                role: ScoutRole::Spread
            })
        );
        assert!(role_to_remove(&rows, Uuid::new_v4(), scout_id, ScoutRole::Drop).is_err());
    }

    #[test]
    fn test_truck_scout_assignments() {
        let stop_id = Uuid::new_v4();
        let crew = [Uuid::new_v4(), Uuid::new_v4()];

        let both = truck_scout_assignments(stop_id, &crew, RoleSelection { drop: true, spread: true });
        assert_eq!(both.len(), 4);
        assert_eq!(both.iter().filter(|r| r.role == ScoutRole::Spread).count(), 2);

        let none = truck_scout_assignments(stop_id, &crew, RoleSelection::default());
        assert!(none.is_empty());
    }

    #[test]
    fn test_grouping_orders_by_name_and_ignores_other_stops() {
        let stop_id = Uuid::new_v4();
        let other_stop = Uuid::new_v4();
        let zoe = scout("Zoe");
        let ben = scout("Ben");
        let rows = vec![
            row(stop_id, zoe.id, ScoutRole::Spread),
            row(stop_id, ben.id, ScoutRole::Drop),
            row(other_stop, ben.id, ScoutRole::Spread),
            row(stop_id, Uuid::new_v4(), ScoutRole::Drop),
        ];

        let assigned = group_scout_roles(stop_id, &rows, &[zoe, ben]);
        let names: Vec<&str> = assigned.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Zoe"]);
        assert_eq!(assigned[0].roles, vec![ScoutRole::Drop]);
    }
}
