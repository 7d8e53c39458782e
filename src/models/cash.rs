use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CashType;

/// Row of the Cash table. `amount` is stored signed: withdrawals are
/// negative so a bookie's rows sum straight to its net cash flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashTransaction {
    pub date: NaiveDate,
    pub bookie: String,
    #[serde(rename = "type")]
    pub kind: CashType,
    pub amount: Decimal,
}

/// Request to log a cash movement. `amount` is the unsigned entry value.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCashTransaction {
    pub date: Option<NaiveDate>,
    pub bookie: String,
    #[serde(rename = "type")]
    pub kind: CashType,
    pub amount: Decimal,
}

impl NewCashTransaction {
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            CashType::Withdrawal => -self.amount,
            CashType::Deposit | CashType::Bonus => self.amount,
        }
    }
}
