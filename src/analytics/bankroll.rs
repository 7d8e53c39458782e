use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{BetStatus, CashTransaction, Wager};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookieBalance {
    pub bookie: String,
    pub cash_net: Decimal,
    pub bet_pl: Decimal,
    pub pending_exposure: Decimal,
    pub balance: Decimal,
}

/// Money currently available at `bookie`: net cash in, plus settled P/L,
/// minus stake tied up in Pending wagers.
pub fn bookie_balance(bookie: &str, wagers: &[Wager], cash: &[CashTransaction]) -> BookieBalance {
    let cash_net: Decimal = cash
        .iter()
        .filter(|c| c.bookie == bookie)
        .map(|c| c.amount)
        .sum();
    let bet_pl: Decimal = wagers
        .iter()
        .filter(|w| w.bookie == bookie)
        .map(|w| w.pl)
        .sum();
    let pending_exposure: Decimal = wagers
        .iter()
        .filter(|w| w.bookie == bookie && w.status == BetStatus::Pending)
        .map(|w| w.stake)
        .sum();

    BookieBalance {
        bookie: bookie.to_string(),
        cash_net,
        bet_pl,
        pending_exposure,
        balance: cash_net + bet_pl - pending_exposure,
    }
}

/// Balances for every configured bookie in configuration order, then any
/// bookie that only shows up in the data, in first-seen order.
pub fn bankroll_summary(
    configured: &[String],
    wagers: &[Wager],
    cash: &[CashTransaction],
) -> Vec<BookieBalance> {
    let mut bookies: Vec<&str> = Vec::new();
    let seen = configured
        .iter()
        .map(String::as_str)
        .chain(wagers.iter().map(|w| w.bookie.as_str()))
        .chain(cash.iter().map(|c| c.bookie.as_str()));
    for bookie in seen {
        if !bookie.is_empty() && !bookies.contains(&bookie) {
            bookies.push(bookie);
        }
    }

    bookies
        .into_iter()
        .map(|b| bookie_balance(b, wagers, cash))
        .collect()
}
