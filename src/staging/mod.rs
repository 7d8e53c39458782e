//! Staging buffer between the ledger operations and the backing store.
//!
//! The store is remote, rate limited and only supports whole-table writes,
//! so every mutation lands in an in-memory working copy and bumps a dirty
//! counter. Nothing reaches the store until [`StagingBuffer::flush`].
//!
//! ```text
//!   Unloaded ──load──▶ Clean ──mutate──▶ Dirty(n) ──mutate──▶ Dirty(n+1)
//!      ▲                 ▲                   │
//!      │                 └──────flush────────┘
//!      └──────────────discard─────────────── (any loaded state)
//! ```

pub mod sessions;

pub use sessions::SessionRegistry;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analytics::{settle, Outcome};
use crate::config::WagerLimits;
use crate::errors::LedgerError;
use crate::models::{
    BetStatus, CashTransaction, MetaConfig, NewCashTransaction, NewWager, Table, Wager,
};
use crate::schema::{self, TableKind};
use crate::store::{LedgerStore, StoreError};

const MAX_IDENTITY_LEN: usize = 64;

/// Logical table names for one identity. Identities map to disjoint names,
/// which is the whole isolation mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    identity: Option<String>,
    pub bets: String,
    pub cash: String,
    pub meta: String,
}

impl TableNames {
    pub fn for_identity(identity: Option<&str>) -> Result<Self, LedgerError> {
        match identity {
            None => Ok(Self {
                identity: None,
                bets: "Bets".into(),
                cash: "Cash".into(),
                meta: "Meta".into(),
            }),
            Some(id) => {
                let valid = !id.is_empty()
                    && id.len() <= MAX_IDENTITY_LEN
                    && id
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                if !valid {
                    return Err(LedgerError::InvalidIdentity(id.to_string()));
                }
                Ok(Self {
                    identity: Some(id.to_string()),
                    bets: format!("{id}_Bets"),
                    cash: format!("{id}_Cash"),
                    meta: format!("{id}_Meta"),
                })
            }
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Label used in logs and metrics.
    pub fn identity_label(&self) -> &str {
        self.identity.as_deref().unwrap_or("default")
    }

    fn name(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Wagers => &self.bets,
            TableKind::Cash => &self.cash,
            TableKind::Meta => &self.meta,
        }
    }
}

/// The in-memory tables plus sync bookkeeping.
#[derive(Debug, Clone)]
pub struct WorkingCopy {
    wagers: Vec<Wager>,
    cash: Vec<CashTransaction>,
    meta: MetaConfig,
    dirty: usize,
    last_sync: DateTime<Utc>,
    /// Highest id ever assigned. Persisted in the Meta table on flush, so
    /// deleted ids stay burned across reloads.
    id_high_water: i64,
}

impl WorkingCopy {
    pub fn wagers(&self) -> &[Wager] {
        &self.wagers
    }

    pub fn cash(&self) -> &[CashTransaction] {
        &self.cash
    }

    pub fn meta(&self) -> &MetaConfig {
        &self.meta
    }

    pub fn dirty(&self) -> usize {
        self.dirty
    }

    pub fn last_sync(&self) -> DateTime<Utc> {
        self.last_sync
    }

    pub fn wager(&self, id: i64) -> Option<&Wager> {
        self.wagers.iter().find(|w| w.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    pub identity: Option<String>,
    pub loaded: bool,
    pub dirty: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

pub struct StagingBuffer {
    store: Arc<dyn LedgerStore>,
    names: TableNames,
    limits: WagerLimits,
    working: Option<WorkingCopy>,
}

impl StagingBuffer {
    pub fn new(store: Arc<dyn LedgerStore>, names: TableNames, limits: WagerLimits) -> Self {
        Self {
            store,
            names,
            limits,
            working: None,
        }
    }

    pub fn names(&self) -> &TableNames {
        &self.names
    }

    pub fn is_loaded(&self) -> bool {
        self.working.is_some()
    }

    /// Unflushed mutations; 0 when unloaded.
    pub fn dirty_count(&self) -> usize {
        self.working.as_ref().map_or(0, |w| w.dirty)
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.working.as_ref().map(|w| w.last_sync)
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            identity: self.names.identity().map(str::to_string),
            loaded: self.is_loaded(),
            dirty: self.dirty_count(),
            last_sync: self.last_sync(),
        }
    }

    // -----------------------------------------------------------------------
    // Store round trips
    // -----------------------------------------------------------------------

    /// Read a table, creating it with the default header if the store has
    /// never seen it.
    async fn fetch_or_init(&self, kind: TableKind) -> Result<Table, LedgerError> {
        let name = self.names.name(kind);
        match self.store.read_table(name).await {
            Ok(table) => Ok(table),
            Err(StoreError::NotFound(_)) => {
                let empty = schema::empty_table(kind);
                self.store.write_table(name, &empty).await?;
                tracing::info!(
                    identity = self.names.identity_label(),
                    table = name,
                    "Created missing ledger table with default schema"
                );
                Ok(empty)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read all three tables from the store, replacing any working copy.
    /// On failure the previous state is kept untouched.
    pub async fn load(&mut self) -> Result<(), LedgerError> {
        let bets = self.fetch_or_init(TableKind::Wagers).await?;
        let cash = self.fetch_or_init(TableKind::Cash).await?;
        let meta = self.fetch_or_init(TableKind::Meta).await?;

        let wagers = schema::load_wagers(&bets)?;
        let cash = schema::load_cash(&cash)?;
        let (meta, stored_last_id) = schema::load_meta(&meta)?;

        if let Some(previous) = &self.working {
            if previous.dirty > 0 {
                tracing::warn!(
                    identity = self.names.identity_label(),
                    dropped = previous.dirty,
                    "Reload discarded unflushed mutations"
                );
            }
        }

        let id_high_water = wagers
            .iter()
            .map(|w| w.id)
            .max()
            .unwrap_or(0)
            .max(stored_last_id);
        tracing::info!(
            identity = self.names.identity_label(),
            wagers = wagers.len(),
            cash = cash.len(),
            "Ledger loaded"
        );

        self.working = Some(WorkingCopy {
            wagers,
            cash,
            meta,
            dirty: 0,
            last_sync: Utc::now(),
            id_high_water,
        });
        counter!("ledger_loads_total").increment(1);
        self.publish_dirty();
        Ok(())
    }

    /// Load on first access; afterwards a no-op.
    pub async fn ensure_loaded(&mut self) -> Result<&mut WorkingCopy, LedgerError> {
        if self.working.is_none() {
            self.load().await?;
        }
        match self.working.as_mut() {
            Some(w) => Ok(w),
            None => Err(LedgerError::Store(StoreError::Unavailable(
                "working copy missing after load".into(),
            ))),
        }
    }

    /// Read access to the working copy, loading it if necessary.
    pub async fn view(&mut self) -> Result<&WorkingCopy, LedgerError> {
        Ok(&*self.ensure_loaded().await?)
    }

    /// Write Bets, Cash and Meta back to the store. The dirty counter resets
    /// only if all three writes succeed. Returns the number of mutations
    /// committed; a clean or unloaded buffer commits nothing and touches
    /// nothing.
    pub async fn flush(&mut self) -> Result<usize, LedgerError> {
        let Some(working) = self.working.as_ref() else {
            return Ok(0);
        };
        if working.dirty == 0 {
            return Ok(0);
        }

        let tables = [
            (TableKind::Wagers, schema::encode_wagers(&working.wagers)),
            (TableKind::Cash, schema::encode_cash(&working.cash)),
            (TableKind::Meta, schema::encode_meta(&working.meta, working.id_high_water)),
        ];
        for (kind, table) in &tables {
            if let Err(e) = self.store.write_table(self.names.name(*kind), table).await {
                counter!("ledger_flush_failures_total").increment(1);
                tracing::error!(
                    identity = self.names.identity_label(),
                    table = self.names.name(*kind),
                    dirty = working.dirty,
                    error = %e,
                    "Flush failed; working copy kept dirty"
                );
                return Err(e.into());
            }
        }

        let committed = working.dirty;
        if let Some(w) = self.working.as_mut() {
            w.dirty = 0;
            w.last_sync = Utc::now();
        }
        counter!("ledger_flushes_total").increment(1);
        self.publish_dirty();
        tracing::info!(
            identity = self.names.identity_label(),
            committed,
            "Ledger flushed"
        );
        Ok(committed)
    }

    /// Drop the working copy; the next access reloads from the store.
    /// Returns the number of unflushed mutations thrown away.
    pub fn discard(&mut self) -> usize {
        let dropped = self.working.take().map_or(0, |w| w.dirty);
        self.publish_dirty();
        tracing::info!(
            identity = self.names.identity_label(),
            dropped,
            "Working copy discarded"
        );
        dropped
    }

    fn publish_dirty(&self) {
        gauge!("unflushed_mutations", "identity" => self.names.identity_label().to_string())
            .set(self.dirty_count() as f64);
    }

    fn mark_dirty(&mut self) {
        if let Some(w) = self.working.as_mut() {
            w.dirty += 1;
        }
        self.publish_dirty();
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    fn validate_wager(&self, new: &NewWager) -> Result<(), LedgerError> {
        let l = &self.limits;
        if new.odds < l.odds_min || new.odds > l.odds_max {
            return Err(LedgerError::InvalidWager(format!(
                "odds {} outside {}..={}",
                new.odds, l.odds_min, l.odds_max
            )));
        }
        if new.stake < Decimal::ZERO || new.stake > l.stake_max {
            return Err(LedgerError::InvalidWager(format!(
                "stake {} outside 0..={}",
                new.stake, l.stake_max
            )));
        }
        Ok(())
    }

    /// Log a wager. It gets the next id; if a terminal status is supplied it
    /// is settled on the spot.
    pub async fn add_wager(&mut self, new: NewWager) -> Result<Wager, LedgerError> {
        self.validate_wager(&new)?;
        let outcome = match new.status {
            Some(status) => Outcome::from_status(status, new.payout)?,
            None => None,
        };
        let settlement = outcome
            .map(|o| settle(new.stake, new.odds, o))
            .transpose()?;

        let working = self.ensure_loaded().await?;
        let max_id = working.wagers.iter().map(|w| w.id).max().unwrap_or(0);
        let id = max_id.max(working.id_high_water) + 1;

        let mut wager = Wager {
            id,
            date: new.date.unwrap_or_else(|| Utc::now().date_naive()),
            sport: new.sport,
            league: new.league,
            bookie: new.bookie,
            bet_type: new.bet_type,
            event: new.event,
            odds: new.odds,
            stake: new.stake,
            status: BetStatus::Pending,
            pl: Decimal::ZERO,
            cashout_amount: Decimal::ZERO,
        };
        if let Some(s) = settlement {
            wager.apply_settlement(s);
        }

        working.id_high_water = id;
        working.wagers.push(wager.clone());
        self.mark_dirty();

        counter!("wagers_created_total").increment(1);
        tracing::debug!(
            identity = self.names.identity_label(),
            id,
            status = %wager.status,
            "Wager staged"
        );
        Ok(wager)
    }

    /// Settle a Pending wager. Settling twice is rejected.
    pub async fn settle_wager(&mut self, id: i64, outcome: Outcome) -> Result<Wager, LedgerError> {
        let working = self.ensure_loaded().await?;
        let wager = working
            .wagers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(LedgerError::WagerNotFound(id))?;
        if !wager.is_pending() {
            return Err(LedgerError::AlreadySettled {
                id,
                status: wager.status.to_string(),
            });
        }

        let settlement = settle(wager.stake, wager.odds, outcome)?;
        wager.apply_settlement(settlement);
        let settled = wager.clone();
        self.mark_dirty();

        counter!("wagers_settled_total").increment(1);
        tracing::debug!(
            identity = self.names.identity_label(),
            id,
            status = %settled.status,
            pl = %settled.pl,
            "Wager settled"
        );
        Ok(settled)
    }

    pub async fn delete_wager(&mut self, id: i64) -> Result<Wager, LedgerError> {
        let working = self.ensure_loaded().await?;
        let idx = working
            .wagers
            .iter()
            .position(|w| w.id == id)
            .ok_or(LedgerError::WagerNotFound(id))?;
        let removed = working.wagers.remove(idx);
        self.mark_dirty();
        Ok(removed)
    }

    /// Append a cash movement, signing the amount by its type.
    pub async fn add_cash(
        &mut self,
        new: NewCashTransaction,
    ) -> Result<CashTransaction, LedgerError> {
        if new.amount < Decimal::ZERO {
            return Err(LedgerError::InvalidCash(format!(
                "amount {} must be non-negative; the type sets the sign",
                new.amount
            )));
        }
        if new.bookie.trim().is_empty() {
            return Err(LedgerError::InvalidCash("bookie is required".into()));
        }

        let tx = CashTransaction {
            date: new.date.unwrap_or_else(|| Utc::now().date_naive()),
            bookie: new.bookie.trim().to_string(),
            kind: new.kind,
            amount: new.signed_amount(),
        };

        let working = self.ensure_loaded().await?;
        working.cash.push(tx.clone());
        self.mark_dirty();

        counter!("cash_transactions_total").increment(1);
        Ok(tx)
    }

    /// Replace the selection lists wholesale.
    pub async fn replace_meta(&mut self, meta: MetaConfig) -> Result<MetaConfig, LedgerError> {
        let meta = meta.normalized();
        let working = self.ensure_loaded().await?;
        working.meta = meta.clone();
        self.mark_dirty();
        Ok(meta)
    }
}
