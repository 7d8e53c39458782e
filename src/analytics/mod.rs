pub mod bankroll;
pub mod settlement;
pub mod stats;
pub mod streak;
pub mod timeline;

pub use bankroll::{bankroll_summary, bookie_balance, BookieBalance};
pub use settlement::{settle, Outcome, Settlement, SettlementError};
pub use stats::{
    exposure, net_profit, roi, summarize, total_staked, win_rate, LedgerSummary, WagerFilter,
};
pub use streak::{current_streak, Streak, StreakOutcome};
pub use timeline::{
    bucketize, cashout_results, equity_curve, profit_by_sport, Resolution, TimeBucket,
    UnknownResolution,
};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::models::{BetStatus, CashTransaction, CashType, Wager};

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn wager(id: i64, day: &str, status: BetStatus, stake: i64, pl: i64) -> Wager {
        Wager {
            id,
            date: date(day),
            sport: "Basketball".into(),
            league: "NBA".into(),
            bookie: "Bet365".into(),
            bet_type: "Moneyline".into(),
            event: format!("event {id}"),
            odds: Decimal::new(200, 2),
            stake: Decimal::from(stake),
            status,
            pl: Decimal::from(pl),
            cashout_amount: Decimal::ZERO,
        }
    }

    pub fn cash(bookie: &str, kind: CashType, signed_amount: i64) -> CashTransaction {
        CashTransaction {
            date: date("2024-01-01"),
            bookie: bookie.into(),
            kind,
            amount: Decimal::from(signed_amount),
        }
    }
}
