use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::streak::{current_streak, Streak};
use crate::models::{BetStatus, Wager};

/// Multiselect filter over wager descriptors. An empty list for a dimension
/// matches every wager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WagerFilter {
    #[serde(default)]
    pub leagues: Vec<String>,
    #[serde(default)]
    pub bookies: Vec<String>,
    #[serde(default)]
    pub sports: Vec<String>,
}

impl WagerFilter {
    pub fn matches(&self, wager: &Wager) -> bool {
        fn allowed(selection: &[String], value: &str) -> bool {
            selection.is_empty() || selection.iter().any(|s| s == value)
        }

        allowed(&self.leagues, &wager.league)
            && allowed(&self.bookies, &wager.bookie)
            && allowed(&self.sports, &wager.sport)
    }

    pub fn apply(&self, wagers: &[Wager]) -> Vec<Wager> {
        wagers.iter().filter(|w| self.matches(w)).cloned().collect()
    }
}

/// Total stake still at risk on Pending wagers.
pub fn exposure(wagers: &[Wager]) -> Decimal {
    wagers
        .iter()
        .filter(|w| w.status == BetStatus::Pending)
        .map(|w| w.stake)
        .sum()
}

/// Sum of `pl`. Pending wagers carry `pl = 0` so they add nothing.
pub fn net_profit(wagers: &[Wager]) -> Decimal {
    wagers.iter().map(|w| w.pl).sum()
}

/// Sum of `stake` over every wager, Pending included.
pub fn total_staked(wagers: &[Wager]) -> Decimal {
    wagers.iter().map(|w| w.stake).sum()
}

/// Return on stake as a percentage. Zero when nothing has been staked.
pub fn roi(wagers: &[Wager]) -> Decimal {
    percentage(net_profit(wagers), total_staked(wagers))
}

/// Won / (Won + Lost) as a percentage. Push and cashouts count for neither
/// side; zero when nothing is graded.
pub fn win_rate(wagers: &[Wager]) -> Decimal {
    let won = wagers.iter().filter(|w| w.status == BetStatus::Won).count();
    let graded = wagers.iter().filter(|w| w.status.is_graded()).count();
    percentage(Decimal::from(won as i64), Decimal::from(graded as i64))
}

pub(crate) fn percentage(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator / denominator * Decimal::ONE_HUNDRED
}

/// Headline numbers for a (filtered) wager set.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub total_wagers: usize,
    pub pending_wagers: usize,
    pub exposure: Decimal,
    pub net_profit: Decimal,
    pub total_staked: Decimal,
    pub roi: Decimal,
    pub win_rate: Decimal,
    pub streak: Streak,
}

pub fn summarize(wagers: &[Wager]) -> LedgerSummary {
    LedgerSummary {
        total_wagers: wagers.len(),
        pending_wagers: wagers.iter().filter(|w| w.is_pending()).count(),
        exposure: exposure(wagers),
        net_profit: net_profit(wagers),
        total_staked: total_staked(wagers),
        roi: roi(wagers),
        win_rate: win_rate(wagers),
        streak: current_streak(wagers),
    }
}
