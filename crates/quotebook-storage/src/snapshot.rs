use chrono::Utc;
use quotebook_core::StoredQuote;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub created_ts: i64,
    pub objects: usize,
    pub path: String,
}

/// Writes `docs` as zstd-compressed JSON lines, one `{id, ...quote}` per line.
pub fn write_snapshot(path: &Path, docs: &[StoredQuote]) -> std::io::Result<SnapshotManifest> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let file = File::create(path)?;
    let mut z = zstd::Encoder::new(file, 3)?;
    for d in docs {
        let line = serde_json::to_string(d)?;
        z.write_all(line.as_bytes())?;
        z.write_all(b"\n")?;
    }
    z.finish()?;
    Ok(SnapshotManifest {
        created_ts: Utc::now().timestamp(),
        objects: docs.len(),
        path: path.to_string_lossy().to_string(),
    })
}

pub fn read_snapshot(path: &Path) -> std::io::Result<Vec<StoredQuote>> {
    let fh = File::open(path)?;
    let br = BufReader::new(zstd::Decoder::new(fh)?);
    let mut out = Vec::new();
    for (lineno, line) in br.lines().enumerate() {
        let l = line?;
        if l.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<StoredQuote>(&l) {
            Ok(d) => out.push(d),
            Err(e) => tracing::warn!(line = lineno + 1, "skipping snapshot record: {}", e),
        }
    }
    Ok(out)
}
