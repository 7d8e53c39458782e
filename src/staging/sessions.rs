use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{StagingBuffer, TableNames};
use crate::config::WagerLimits;
use crate::errors::LedgerError;
use crate::store::LedgerStore;

/// One staging buffer per identity, created lazily.
///
/// Each buffer sits behind its own mutex so requests for the same identity
/// run one at a time, while different identities never contend beyond the
/// brief map lookup.
pub struct SessionRegistry {
    store: Arc<dyn LedgerStore>,
    limits: WagerLimits,
    buffers: Mutex<HashMap<String, Arc<Mutex<StagingBuffer>>>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn LedgerStore>, limits: WagerLimits) -> Self {
        Self {
            store,
            limits,
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Buffer for `identity` (`None` is the single-user ledger).
    pub async fn buffer(
        &self,
        identity: Option<&str>,
    ) -> Result<Arc<Mutex<StagingBuffer>>, LedgerError> {
        let names = TableNames::for_identity(identity)?;
        let key = names.identity_label().to_string();

        let mut buffers = self.buffers.lock().await;
        let buffer = buffers.entry(key).or_insert_with(|| {
            tracing::debug!(identity = names.identity_label(), "Opening staging buffer");
            Arc::new(Mutex::new(StagingBuffer::new(
                self.store.clone(),
                names.clone(),
                self.limits.clone(),
            )))
        });

        Ok(Arc::clone(buffer))
    }

    /// Number of buffers opened so far, across identities.
    pub async fn open_count(&self) -> usize {
        self.buffers.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewWager;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn wager() -> NewWager {
        NewWager {
            date: None,
            sport: "Tennis".into(),
            league: "ATP".into(),
            bookie: "Pinnacle".into(),
            bet_type: "ML".into(),
            event: "Final".into(),
            odds: Decimal::new(150, 2),
            stake: Decimal::from(10),
            status: None,
            payout: None,
        }
    }

    #[tokio::test]
    async fn test_same_identity_shares_buffer() {
        let registry = SessionRegistry::new(Arc::new(MemoryStore::new()), WagerLimits::default());
        let a = registry.buffer(Some("alice")).await.unwrap();
        let b = registry.buffer(Some("alice")).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_identities_are_isolated() {
        let store = Arc::new(MemoryStore::new());
        let registry = SessionRegistry::new(store.clone(), WagerLimits::default());

        let alice = registry.buffer(Some("alice")).await.unwrap();
        alice.lock().await.add_wager(wager()).await.unwrap();
        alice.lock().await.flush().await.unwrap();

        let bob = registry.buffer(Some("bob")).await.unwrap();
        let mut bob = bob.lock().await;
        assert!(bob.view().await.unwrap().wagers().is_empty());

        assert!(store.snapshot("alice_Bets").is_some_and(|t| t.rows.len() == 1));
        assert!(store.snapshot("bob_Bets").is_some_and(|t| t.rows.is_empty()));
        assert!(store.snapshot("Bets").is_none());
    }

    #[tokio::test]
    async fn test_invalid_identity_rejected() {
        let registry = SessionRegistry::new(Arc::new(MemoryStore::new()), WagerLimits::default());
        assert!(matches!(
            registry.buffer(Some("a b")).await,
            Err(LedgerError::InvalidIdentity(_))
        ));
    }

    #[tokio::test]
    async fn test_open_count_tracks_identities() {
        let registry = SessionRegistry::new(Arc::new(MemoryStore::new()), WagerLimits::default());
        assert_eq!(registry.open_count().await, 0);

        registry.buffer(None).await.unwrap();
        registry.buffer(Some("alice")).await.unwrap();
        registry.buffer(Some("alice")).await.unwrap();
        assert_eq!(registry.open_count().await, 2);
    }
}
