use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stats::percentage;
use crate::models::{BetStatus, Wager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Day,
    Month,
    Year,
}

#[derive(Debug, Error)]
#[error("unknown resolution '{0}'")]
pub struct UnknownResolution(pub String);

impl FromStr for Resolution {
    type Err = UnknownResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" | "d" => Ok(Resolution::Day),
            "month" | "monthly" | "m" => Ok(Resolution::Month),
            "year" | "yearly" | "y" => Ok(Resolution::Year),
            _ => Err(UnknownResolution(s.to_string())),
        }
    }
}

impl Resolution {

    /// First calendar day of the bucket containing `date`.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        let start = match self {
            Resolution::Day => Some(date),
            Resolution::Month => date.with_day(1),
            Resolution::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        };
        // Day 1 of an existing month/year always exists.
        start.unwrap_or(date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    pub start: NaiveDate,
    pub pl: Decimal,
    pub staked: Decimal,
    pub roi: Decimal,
    pub cumulative_pl: Decimal,
}

/// Group wagers into calendar buckets, oldest first, with a running total of
/// bucket P/L.
pub fn bucketize(wagers: &[Wager], resolution: Resolution) -> Vec<TimeBucket> {
    let mut sums: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for w in wagers {
        let entry = sums
            .entry(resolution.bucket_start(w.date))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += w.pl;
        entry.1 += w.stake;
    }

    let mut cumulative = Decimal::ZERO;
    sums.into_iter()
        .map(|(start, (pl, staked))| {
            cumulative += pl;
            TimeBucket {
                start,
                pl,
                staked,
                roi: percentage(pl, staked),
                cumulative_pl: cumulative,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub id: i64,
    pub date: NaiveDate,
    pub pl: Decimal,
    pub cumulative_pl: Decimal,
}

/// Running P/L after each wager in `(date, id)` order.
pub fn equity_curve(wagers: &[Wager]) -> Vec<EquityPoint> {
    let mut ordered: Vec<&Wager> = wagers.iter().collect();
    ordered.sort_by_key(|w| (w.date, w.id));

    let mut cumulative = Decimal::ZERO;
    ordered
        .into_iter()
        .map(|w| {
            cumulative += w.pl;
            EquityPoint {
                id: w.id,
                date: w.date,
                pl: w.pl,
                cumulative_pl: cumulative,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SportProfit {
    pub sport: String,
    pub pl: Decimal,
}

/// Total P/L per sport, sorted by sport name.
pub fn profit_by_sport(wagers: &[Wager]) -> Vec<SportProfit> {
    let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();
    for w in wagers {
        *sums.entry(w.sport.as_str()).or_insert(Decimal::ZERO) += w.pl;
    }
    sums.into_iter()
        .map(|(sport, pl)| SportProfit {
            sport: sport.to_string(),
            pl,
        })
        .collect()
}

/// P/L of each cashed-out wager, for distribution charts.
pub fn cashout_results(wagers: &[Wager]) -> Vec<Decimal> {
    wagers
        .iter()
        .filter(|w| w.status == BetStatus::CashedOut)
        .map(|w| w.pl)
        .collect()
}
