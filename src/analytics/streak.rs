use serde::Serialize;

use crate::models::{BetStatus, Wager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreakOutcome {
    Won,
    Lost,
}

/// Current run of identical graded results, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Streak {
    /// No Won or Lost wagers exist; distinct from a zero-length run.
    NoGradedBets,
    Run { count: usize, outcome: StreakOutcome },
}

/// Streak over Won/Lost wagers ordered by `(date, id)` descending. Push and
/// cashouts neither extend nor break a run.
pub fn current_streak(wagers: &[Wager]) -> Streak {
    let mut graded: Vec<&Wager> = wagers.iter().filter(|w| w.status.is_graded()).collect();
    graded.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));

    let Some(first) = graded.first() else {
        return Streak::NoGradedBets;
    };

    let status = first.status;
    let count = graded.iter().take_while(|w| w.status == status).count();
    let outcome = if status == BetStatus::Won {
        StreakOutcome::Won
    } else {
        StreakOutcome::Lost
    };

    Streak::Run { count, outcome }
}
