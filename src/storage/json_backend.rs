use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    errors::{LedgerError, Result},
    utils::persistence::{read_json, write_json_atomic},
};

use super::memory::{MemoryStore, StoreState};

pub const SNAPSHOT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    schema_version: u8,
    #[serde(flatten)]
    state: StoreState,
}

/// Writes the full contents of `store` to `path` through a staged temp file.
pub fn save_snapshot(store: &MemoryStore, path: &Path) -> Result<()> {
    let snapshot = Snapshot {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        state: store.snapshot(),
    };
    write_json_atomic(path, &snapshot)?;
    info!(
        path = %path.display(),
        customers = snapshot.state.customers.len(),
        transactions = snapshot.state.transactions.len(),
        income = snapshot.state.income.len(),
        "store snapshot saved"
    );
    Ok(())
}

/// Loads a snapshot written by [`save_snapshot`]. A missing file yields an empty store.
pub fn load_snapshot(path: &Path) -> Result<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let snapshot: Snapshot = read_json(path)?;
    if snapshot.schema_version > SNAPSHOT_SCHEMA_VERSION {
        return Err(LedgerError::StorageError(format!(
            "snapshot schema v{} is newer than supported v{}",
            snapshot.schema_version, SNAPSHOT_SCHEMA_VERSION
        )));
    }
    Ok(MemoryStore::from_state(snapshot.state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_snapshot_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = load_snapshot(&dir.path().join("absent.json")).unwrap();
        assert_eq!(store.snapshot(), StoreState::default());
    }

    #[test]
    fn newer_schema_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"schema_version": 9}"#).unwrap();
        assert!(matches!(
            load_snapshot(&path),
            Err(LedgerError::StorageError(_))
        ));
    }
}
