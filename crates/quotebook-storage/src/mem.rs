use crate::traits::Storage;
use quotebook_core::{DocId, Predicate, Quote, QuoteError, Result, StoredQuote};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    // id -> document; BTreeMap keeps insertion (= id) order on scans
    docs: BTreeMap<DocId, Quote>,
    last_id: DocId,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let store = Self::new();
        for q in quotes {
            store.insert(q);
        }
        store
    }

    /// Appends a document under the next free id.
    pub fn insert(&self, quote: Quote) -> DocId {
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let id = inner.last_id;
        inner.docs.insert(id, quote);
        id
    }

    /// Restores a document under an id assigned by an earlier store.
    pub fn replay_insert(&self, id: DocId, quote: Quote) {
        let mut inner = self.inner.write();
        inner.last_id = inner.last_id.max(id);
        inner.docs.insert(id, quote);
    }
}

impl Storage for InMemoryStore {
    fn search(&self, predicate: &Predicate) -> Result<Vec<StoredQuote>> {
        let inner = self.inner.read();
        let out: Vec<StoredQuote> = inner
            .docs
            .iter()
            .filter(|(_, q)| predicate.matches(q))
            .map(|(id, q)| StoredQuote {
                id: *id,
                quote: q.clone(),
            })
            .collect();
        tracing::debug!(scanned = inner.docs.len(), matched = out.len(), "store scan");
        Ok(out)
    }

    fn count(&self) -> usize {
        self.inner.read().docs.len()
    }

    fn get(&self, id: DocId) -> Result<StoredQuote> {
        let inner = self.inner.read();
        let quote = inner.docs.get(&id).ok_or(QuoteError::NotFound(id))?;
        Ok(StoredQuote {
            id,
            quote: quote.clone(),
        })
    }

    fn live_ids(&self) -> Vec<DocId> {
        self.inner.read().docs.keys().copied().collect()
    }
}
