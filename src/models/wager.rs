use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BetStatus;
use crate::analytics::settlement::Settlement;

/// Row of the Bets table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub id: i64,
    pub date: NaiveDate,
    pub sport: String,
    pub league: String,
    pub bookie: String,
    #[serde(rename = "type")]
    pub bet_type: String,
    pub event: String,
    pub odds: Decimal,
    pub stake: Decimal,
    pub status: BetStatus,
    pub pl: Decimal,
    pub cashout_amount: Decimal,
}

impl Wager {
    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }

    /// Overwrite the settlement-derived fields. Callers check `is_pending`
    /// first; this only keeps `status`, `pl` and `cashout_amount` in step.
    pub fn apply_settlement(&mut self, settlement: Settlement) {
        self.status = settlement.status;
        self.pl = settlement.pl;
        self.cashout_amount = settlement.cashout_amount;
    }
}

/// Request to log a new wager. A missing `status` means Pending; `payout`
/// is only read for Cashed Out.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWager {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub bookie: String,
    #[serde(rename = "type", default)]
    pub bet_type: String,
    #[serde(default)]
    pub event: String,
    pub odds: Decimal,
    pub stake: Decimal,
    #[serde(default)]
    pub status: Option<BetStatus>,
    #[serde(default)]
    pub payout: Option<Decimal>,
}
