use crate::snapshot::read_snapshot;
use crate::{InMemoryStore, Storage};
use quotebook_core::{DocId, Predicate, Quote, QuoteError, Result, StoredQuote};
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};

pub const DEFAULT_TABLE: &str = "_default";

/// Read-only store backed by a file loaded once at open.
///
/// Two on-disk layouts are understood: a TinyDB JSON document
/// (`{"<table>": {"<id>": {...}}}`) and a `.zst` snapshot written by
/// [`crate::snapshot::write_snapshot`].
pub struct PersistentStore {
    mem: InMemoryStore,
    path: PathBuf,
}

impl PersistentStore {
    pub fn open(path: impl Into<PathBuf>, table: &str) -> Result<Self> {
        let path = path.into();
        let mem = InMemoryStore::new();
        if is_snapshot(&path) {
            let docs = read_snapshot(&path).map_err(|e| QuoteError::Internal(e.to_string()))?;
            for d in docs {
                mem.replay_insert(d.id, d.quote);
            }
        } else {
            load_tinydb(&mem, &path, table)?;
        }
        tracing::info!(path = %path.display(), documents = mem.count(), "quote store loaded");
        Ok(Self { mem, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_snapshot(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("zst")
}

fn load_tinydb(mem: &InMemoryStore, path: &Path, table: &str) -> Result<()> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "database file missing; starting empty");
            return Ok(());
        }
        Err(e) => return Err(QuoteError::Internal(e.to_string())),
    };
    if raw.trim().is_empty() {
        return Ok(());
    }
    let mut tables: Map<String, JsonValue> =
        serde_json::from_str(&raw).map_err(|e| QuoteError::Internal(e.to_string()))?;
    let docs = match tables.remove(table) {
        Some(JsonValue::Object(docs)) => docs,
        Some(_) => {
            return Err(QuoteError::Internal(format!(
                "table `{table}` is not a JSON object"
            )))
        }
        None => {
            tracing::warn!(table, "table not present; starting empty");
            return Ok(());
        }
    };
    for (key, doc) in docs {
        let id = match key.parse::<DocId>() {
            Ok(id) if id > 0 => id,
            _ => {
                tracing::warn!(key = %key, "skipping document with non-numeric id");
                continue;
            }
        };
        match serde_json::from_value::<Quote>(doc) {
            Ok(q) => mem.replay_insert(id, q),
            Err(e) => tracing::warn!(id, "skipping malformed document: {}", e),
        }
    }
    Ok(())
}

impl Storage for PersistentStore {
    fn search(&self, predicate: &Predicate) -> Result<Vec<StoredQuote>> {
        self.mem.search(predicate)
    }
    fn count(&self) -> usize {
        self.mem.count()
    }
    fn get(&self, id: DocId) -> Result<StoredQuote> {
        self.mem.get(id)
    }
    fn live_ids(&self) -> Vec<DocId> {
        self.mem.live_ids()
    }
}
