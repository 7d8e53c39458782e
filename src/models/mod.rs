pub mod cash;
pub mod meta;
pub mod table;
pub mod wager;

pub use cash::{CashTransaction, NewCashTransaction};
pub use meta::MetaConfig;
pub use table::Table;
pub use wager::{NewWager, Wager};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// BetStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Push,
    #[serde(rename = "Cashed Out")]
    CashedOut,
}

impl BetStatus {
    /// Parse a stored or user-supplied status label. Case and spacing are
    /// ignored so "cashed out", "Cashed_Out" and "CASHEDOUT" all match.
    pub fn from_label(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "pending" => Some(BetStatus::Pending),
            "won" | "win" => Some(BetStatus::Won),
            "lost" | "loss" => Some(BetStatus::Lost),
            "push" | "void" => Some(BetStatus::Push),
            "cashedout" | "cashout" => Some(BetStatus::CashedOut),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BetStatus::Pending => "Pending",
            BetStatus::Won => "Won",
            BetStatus::Lost => "Lost",
            BetStatus::Push => "Push",
            BetStatus::CashedOut => "Cashed Out",
        }
    }

    /// Won or Lost: the outcomes that count toward win rate and streaks.
    pub fn is_graded(&self) -> bool {
        matches!(self, BetStatus::Won | BetStatus::Lost)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CashType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashType {
    Deposit,
    Withdrawal,
    Bonus,
}

impl CashType {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deposit" => Some(CashType::Deposit),
            "withdrawal" | "withdraw" => Some(CashType::Withdrawal),
            "bonus" => Some(CashType::Bonus),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CashType::Deposit => "Deposit",
            CashType::Withdrawal => "Withdrawal",
            CashType::Bonus => "Bonus",
        }
    }
}

impl fmt::Display for CashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
