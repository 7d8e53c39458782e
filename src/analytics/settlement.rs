use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::BetStatus;

/// Terminal result of a wager. Pending is deliberately absent: settlement
/// only ever moves a wager out of Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Push,
    CashedOut { payout: Decimal },
}

impl Outcome {
    /// Build an outcome from a status label plus optional cashout payout.
    /// `Pending` maps to `None`.
    pub fn from_status(
        status: BetStatus,
        payout: Option<Decimal>,
    ) -> Result<Option<Self>, SettlementError> {
        let outcome = match status {
            BetStatus::Pending => return Ok(None),
            BetStatus::Won => Outcome::Won,
            BetStatus::Lost => Outcome::Lost,
            BetStatus::Push => Outcome::Push,
            BetStatus::CashedOut => Outcome::CashedOut {
                payout: payout.ok_or(SettlementError::MissingPayout)?,
            },
        };
        Ok(Some(outcome))
    }

    pub fn status(&self) -> BetStatus {
        match self {
            Outcome::Won => BetStatus::Won,
            Outcome::Lost => BetStatus::Lost,
            Outcome::Push => BetStatus::Push,
            Outcome::CashedOut { .. } => BetStatus::CashedOut,
        }
    }
}

/// Fields written onto a wager when it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub status: BetStatus,
    pub pl: Decimal,
    pub cashout_amount: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("cashout payout must be non-negative, got {0}")]
    NegativePayout(Decimal),

    #[error("cashout requires a payout amount")]
    MissingPayout,
}

/// Profit/loss for a wager of `stake` at decimal `odds` settling as `outcome`.
///
/// - Won: `stake * odds - stake`
/// - Lost: `-stake`
/// - Push: `0`
/// - Cashed out: `payout - stake`, with `cashout_amount = payout`
///
/// A cashout payout may be anything non-negative, including 0 or more than
/// the full win return.
pub fn settle(
    stake: Decimal,
    odds: Decimal,
    outcome: Outcome,
) -> Result<Settlement, SettlementError> {
    let (pl, cashout_amount) = match outcome {
        Outcome::Won => (stake * odds - stake, Decimal::ZERO),
        Outcome::Lost => (-stake, Decimal::ZERO),
        Outcome::Push => (Decimal::ZERO, Decimal::ZERO),
        Outcome::CashedOut { payout } => {
            if payout < Decimal::ZERO {
                return Err(SettlementError::NegativePayout(payout));
            }
            (payout - stake, payout)
        }
    };

    Ok(Settlement {
        status: outcome.status(),
        pl,
        cashout_amount,
    })
}
