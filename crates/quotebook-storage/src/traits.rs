use quotebook_core::{DocId, Predicate, Result, StoredQuote};

/// Read-side contract the query executor needs from a document store.
pub trait Storage: Send + Sync + 'static {
    /// Every document matching `predicate`, in ascending id order.
    fn search(&self, predicate: &Predicate) -> Result<Vec<StoredQuote>>;
    fn count(&self) -> usize;
    fn get(&self, id: DocId) -> Result<StoredQuote>;

    // Dense list of live ids, independent of any gaps in numbering
    fn live_ids(&self) -> Vec<DocId> {
        self.all().into_iter().map(|d| d.id).collect()
    }

    // Export all documents (for snapshots)
    fn all(&self) -> Vec<StoredQuote> {
        self.search(&Predicate::Everything).unwrap_or_default()
    }
}
