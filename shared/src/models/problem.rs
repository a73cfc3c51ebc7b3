//! Problems reported against stops

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Route, Stop};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Problem {
    pub id: Uuid,
    pub stop_id: Uuid,
    pub description: String,
    /// Moves from false to true once, never back
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unresolved problem with the stop and route it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(flatten)]
    pub problem: Problem,
    pub stop: Option<Stop>,
    pub route: Option<Route>,
}

/// Value of a stop's `has_problems` flag: true while any of its problems is open
pub fn has_unresolved_problems(problems: &[Problem]) -> bool {
    problems.iter().any(|p| !p.resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn problem(resolved: bool) -> Problem {
        Problem {
            id: Uuid::new_v4(),
            stop_id: Uuid::new_v4(),
            description: "Driveway blocked".to_string(),
            resolved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_flag_follows_open_problems() {
        assert!(!has_unresolved_problems(&[]));
        assert!(has_unresolved_problems(&[problem(false)]));
        assert!(!has_unresolved_problems(&[problem(true), problem(true)]));
    }

    #[test]
    fn test_flag_stays_while_another_problem_is_open() {
        let mut problems = vec![problem(false), problem(false)];
        problems[0].resolved = true;
        assert!(has_unresolved_problems(&problems));

        problems[1].resolved = true;
        assert!(!has_unresolved_problems(&problems));
    }
}
