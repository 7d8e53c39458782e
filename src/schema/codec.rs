use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{heal, parse_date, SchemaError, TableKind};
use crate::models::{BetStatus, CashTransaction, CashType, MetaConfig, Table, Wager};

fn parse_decimal(
    kind: TableKind,
    row: usize,
    column: &'static str,
    value: &str,
) -> Result<Decimal, SchemaError> {
    let v = value.trim();
    if v.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(v)
        .or_else(|_| Decimal::from_scientific(v))
        .map_err(|_| SchemaError::InvalidNumber {
            table: kind.label(),
            row,
            column,
            value: value.to_string(),
        })
}

/// Ids come back from spreadsheets as floats ("3.0"); any whole number is
/// accepted.
fn parse_id(
    kind: TableKind,
    row: usize,
    column: &'static str,
    value: &str,
) -> Result<i64, SchemaError> {
    let d = parse_decimal(kind, row, column, value)?;
    if d.fract().is_zero() {
        if let Some(id) = d.to_i64() {
            return Ok(id);
        }
    }
    Err(SchemaError::InvalidNumber {
        table: kind.label(),
        row,
        column,
        value: value.to_string(),
    })
}

fn decode_date(kind: TableKind, row: usize, value: &str) -> Result<NaiveDate, SchemaError> {
    parse_date(value).ok_or_else(|| SchemaError::InvalidDate {
        table: kind.label(),
        row,
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Wagers
// ---------------------------------------------------------------------------

/// Typed rows from a healed Bets table. A blank status reads as Pending.
pub fn decode_wagers(table: &Table) -> Result<Vec<Wager>, SchemaError> {
    let kind = TableKind::Wagers;
    (0..table.rows.len())
        .map(|r| -> Result<Wager, SchemaError> {
            let row = r + 1;
            let cell = |c: &str| table.cell(r, c);

            let status_raw = cell("status");
            let status = if status_raw.trim().is_empty() {
                BetStatus::Pending
            } else {
                BetStatus::from_label(status_raw).ok_or_else(|| SchemaError::InvalidStatus {
                    table: kind.label(),
                    row,
                    value: status_raw.to_string(),
                })?
            };

            Ok(Wager {
                id: parse_id(kind, row, "id", cell("id"))?,
                date: decode_date(kind, row, cell("date"))?,
                sport: cell("sport").to_string(),
                league: cell("league").to_string(),
                bookie: cell("bookie").to_string(),
                bet_type: cell("type").to_string(),
                event: cell("event").to_string(),
                odds: parse_decimal(kind, row, "odds", cell("odds"))?,
                stake: parse_decimal(kind, row, "stake", cell("stake"))?,
                status,
                pl: parse_decimal(kind, row, "pl", cell("pl"))?,
                cashout_amount: parse_decimal(kind, row, "cashout_amount", cell("cashout_amount"))?,
            })
        })
        .collect()
}

pub fn encode_wagers(wagers: &[Wager]) -> Table {
    let mut table = super::empty_table(TableKind::Wagers);
    table.rows = wagers
        .iter()
        .map(|w| {
            vec![
                w.id.to_string(),
                w.date.format("%Y-%m-%d").to_string(),
                w.sport.clone(),
                w.league.clone(),
                w.bookie.clone(),
                w.bet_type.clone(),
                w.event.clone(),
                w.odds.to_string(),
                w.stake.to_string(),
                w.status.label().to_string(),
                w.pl.to_string(),
                w.cashout_amount.to_string(),
            ]
        })
        .collect();
    table
}

/// Heal then decode a raw Bets table.
pub fn load_wagers(raw: &Table) -> Result<Vec<Wager>, SchemaError> {
    decode_wagers(&heal(TableKind::Wagers, raw)?)
}

// ---------------------------------------------------------------------------
// Cash
// ---------------------------------------------------------------------------

/// Typed rows from a healed Cash table. A blank type (including a missing
/// column) is read from the sign of the amount: negative is a Withdrawal,
/// anything else a Deposit.
pub fn decode_cash(table: &Table) -> Result<Vec<CashTransaction>, SchemaError> {
    let kind = TableKind::Cash;
    (0..table.rows.len())
        .map(|r| -> Result<CashTransaction, SchemaError> {
            let row = r + 1;
            let amount = parse_decimal(kind, row, "amount", table.cell(r, "amount"))?;

            let type_raw = table.cell(r, "type");
            let cash_type = if type_raw.trim().is_empty() {
                if amount < Decimal::ZERO {
                    CashType::Withdrawal
                } else {
                    CashType::Deposit
                }
            } else {
                CashType::from_label(type_raw).ok_or_else(|| SchemaError::InvalidCashType {
                    table: kind.label(),
                    row,
                    value: type_raw.to_string(),
                })?
            };

            Ok(CashTransaction {
                date: decode_date(kind, row, table.cell(r, "date"))?,
                bookie: table.cell(r, "bookie").to_string(),
                kind: cash_type,
                amount,
            })
        })
        .collect()
}

pub fn encode_cash(cash: &[CashTransaction]) -> Table {
    let mut table = super::empty_table(TableKind::Cash);
    table.rows = cash
        .iter()
        .map(|c| {
            vec![
                c.date.format("%Y-%m-%d").to_string(),
                c.bookie.clone(),
                c.kind.label().to_string(),
                c.amount.to_string(),
            ]
        })
        .collect();
    table
}

pub fn load_cash(raw: &Table) -> Result<Vec<CashTransaction>, SchemaError> {
    decode_cash(&heal(TableKind::Cash, raw)?)
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// Each column is an independent list; blank cells are padding.
pub fn decode_meta(table: &Table) -> MetaConfig {
    let list = |c: &str| -> Vec<String> {
        table
            .column(c)
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
            .collect()
    };

    MetaConfig {
        sports: list("sports"),
        leagues: list("leagues"),
        bookies: list("bookies"),
        types: list("types"),
    }
}

/// Highest wager id recorded in a healed Meta table; 0 when never written.
pub fn decode_last_id(table: &Table) -> Result<i64, SchemaError> {
    match table
        .column("last_id")
        .into_iter()
        .enumerate()
        .find(|(_, v)| !v.trim().is_empty())
    {
        Some((r, v)) => parse_id(TableKind::Meta, r + 1, "last_id", v),
        None => Ok(0),
    }
}

/// Lists side by side, shorter ones padded with blanks. `last_id` goes in
/// the first row.
pub fn encode_meta(meta: &MetaConfig, last_id: i64) -> Table {
    let lists = [&meta.sports, &meta.leagues, &meta.bookies, &meta.types];
    let longest = lists.iter().map(|l| l.len()).max().unwrap_or(0);
    let height = if last_id > 0 { longest.max(1) } else { longest };

    let mut table = super::empty_table(TableKind::Meta);
    table.rows = (0..height)
        .map(|i| {
            let mut row: Vec<String> = lists
                .iter()
                .map(|l| l.get(i).cloned().unwrap_or_default())
                .collect();
            row.push(if i == 0 && last_id > 0 {
                last_id.to_string()
            } else {
                String::new()
            });
            row
        })
        .collect();
    table
}

/// Heal then decode a raw Meta table into its lists and the stored id
/// high-water mark.
pub fn load_meta(raw: &Table) -> Result<(MetaConfig, i64), SchemaError> {
    let healed = heal(TableKind::Meta, raw)?;
    Ok((decode_meta(&healed), decode_last_id(&healed)?))
}
