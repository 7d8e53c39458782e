//! Self-healing loader for the three ledger tables.
//!
//! Raw tables come from a store that may have drifted: headers renamed,
//! columns missing, timestamps where dates belong. [`heal`] repairs the
//! column shape and normalizes dates; the `decode_*` functions turn a healed
//! table into typed rows and the `encode_*` functions go the other way for
//! flushing.

mod codec;

pub use codec::{
    decode_cash, decode_last_id, decode_meta, decode_wagers, encode_cash, encode_meta,
    encode_wagers, load_cash, load_meta, load_wagers,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::models::Table;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{table} row {row}: unparseable date {value:?}")]
    InvalidDate {
        table: &'static str,
        row: usize,
        value: String,
    },

    #[error("{table} row {row}: column {column} is not a number: {value:?}")]
    InvalidNumber {
        table: &'static str,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("{table} row {row}: unknown status {value:?}")]
    InvalidStatus {
        table: &'static str,
        row: usize,
        value: String,
    },

    #[error("{table} row {row}: unknown cash type {value:?}")]
    InvalidCashType {
        table: &'static str,
        row: usize,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Table kinds and their required columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Wagers,
    Cash,
    Meta,
}

const WAGER_COLUMNS: &[&str] = &[
    "id",
    "date",
    "sport",
    "league",
    "bookie",
    "type",
    "event",
    "odds",
    "stake",
    "status",
    "pl",
    "cashout_amount",
];
const WAGER_NUMERIC: &[&str] = &["id", "odds", "stake", "pl", "cashout_amount"];

const CASH_COLUMNS: &[&str] = &["date", "bookie", "type", "amount"];
const CASH_NUMERIC: &[&str] = &["amount"];

/// `last_id` holds the highest wager id ever assigned, in its first cell, so
/// ids of deleted wagers are not handed out again after a reload.
const META_COLUMNS: &[&str] = &["sports", "leagues", "bookies", "types", "last_id"];

/// Header spellings seen in older sheets, keyed by canonical column.
const ALIASES: &[(&str, &[&str])] = &[
    ("pl", &["pnl", "profitloss", "profit"]),
    ("cashout_amount", &["cashoutamt", "cashout", "cashoutvalue"]),
    ("event", &["selection", "eventselection"]),
    ("type", &["bettype", "kind"]),
];

impl TableKind {
    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Wagers => "Bets",
            TableKind::Cash => "Cash",
            TableKind::Meta => "Meta",
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Wagers => WAGER_COLUMNS,
            TableKind::Cash => CASH_COLUMNS,
            TableKind::Meta => META_COLUMNS,
        }
    }

    fn numeric_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Wagers => WAGER_NUMERIC,
            TableKind::Cash => CASH_NUMERIC,
            TableKind::Meta => &[],
        }
    }

    fn has_dates(&self) -> bool {
        !matches!(self, TableKind::Meta)
    }

    /// Value a cell takes when its column had to be added.
    pub fn default_cell(&self, column: &str) -> &'static str {
        if self.numeric_columns().contains(&column) {
            "0.0"
        } else {
            ""
        }
    }
}

/// Empty table with the full required header, used when a logical table
/// does not exist in the store yet.
pub fn empty_table(kind: TableKind) -> Table {
    Table::with_columns(kind.required_columns())
}

// ---------------------------------------------------------------------------
// Healing
// ---------------------------------------------------------------------------

/// Lowercased alphanumerics only, so "P/L", "p_l" and "PL" compare equal.
fn header_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn find_source_column(raw: &Table, canonical: &str) -> Option<usize> {
    let wanted = header_key(canonical);
    let aliases: &[&str] = ALIASES
        .iter()
        .find(|(c, _)| *c == canonical)
        .map(|(_, a)| *a)
        .unwrap_or(&[]);

    raw.columns
        .iter()
        .position(|h| header_key(h) == wanted)
        .or_else(|| {
            raw.columns
                .iter()
                .position(|h| aliases.contains(&header_key(h).as_str()))
        })
}

/// Return a table with exactly the required columns of `kind`, in canonical
/// order. Missing columns are filled with defaults, unknown columns dropped,
/// short rows padded, and dates cut down to `YYYY-MM-DD`. A missing `date`
/// column is filled with today's date.
pub fn heal(kind: TableKind, raw: &Table) -> Result<Table, SchemaError> {
    heal_at(kind, raw, Utc::now().date_naive())
}

/// [`heal`] with an explicit fill date for a missing `date` column. Only
/// cells that are actually present can fail to parse.
pub fn heal_at(kind: TableKind, raw: &Table, today: NaiveDate) -> Result<Table, SchemaError> {
    let required = kind.required_columns();
    let sources: Vec<Option<usize>> = required
        .iter()
        .map(|c| find_source_column(raw, c))
        .collect();

    let missing: Vec<&str> = required
        .iter()
        .zip(&sources)
        .filter(|(_, s)| s.is_none())
        .map(|(c, _)| *c)
        .collect();
    if !missing.is_empty() && !raw.columns.is_empty() {
        tracing::debug!(
            table = kind.label(),
            missing = ?missing,
            "Filling missing columns with defaults"
        );
    }

    let mut healed = empty_table(kind);
    for (r, raw_row) in raw.rows.iter().enumerate() {
        let mut row = Vec::with_capacity(required.len());
        for (column, source) in required.iter().zip(&sources) {
            let is_date = kind.has_dates() && *column == "date";
            let cell = match source {
                Some(i) => raw_row.get(*i).map(|v| v.trim().to_string()).unwrap_or_default(),
                None if is_date => today.format("%Y-%m-%d").to_string(),
                None => kind.default_cell(column).to_string(),
            };
            let cell = if is_date {
                parse_date(&cell)
                    .ok_or_else(|| SchemaError::InvalidDate {
                        table: kind.label(),
                        row: r + 1,
                        value: cell.clone(),
                    })?
                    .format("%Y-%m-%d")
                    .to_string()
            } else {
                cell
            };
            row.push(cell);
        }
        healed.rows.push(row);
    }

    Ok(healed)
}

/// Accept plain dates plus the timestamp shapes spreadsheets and pandas
/// exports produce. The time of day is discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%m/%d/%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
