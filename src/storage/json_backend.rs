use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    CollectionPath, DocPath, Document, DocumentStore, DocumentTree, Query, StoreError, StoreResult,
    WriteBatch, WriteOp,
};
use crate::utils::persistence::write_atomic;

pub const STORE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    schema_version: u32,
    documents: BTreeMap<String, Document>,
}

/// Document store persisted as a single JSON file.
///
/// The whole tree is kept in memory and every successful write is flushed
/// with an atomic replace, so a crash leaves either the old or the new file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tree: RwLock<DocumentTree>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let tree = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&data)?;
            if file.schema_version > STORE_SCHEMA_VERSION {
                return Err(StoreError::InvalidDocument(format!(
                    "store `{}` is from a newer schema version",
                    path.display()
                )));
            }
            let tree = DocumentTree::from_snapshot(file.documents)?;
            info!(path = %path.display(), documents = tree.len(), "opened json store");
            tree
        } else {
            DocumentTree::new()
        };
        Ok(Self {
            path,
            tree: RwLock::new(tree),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, tree: &DocumentTree) -> StoreResult<()> {
        let file = StoreFile {
            schema_version: STORE_SCHEMA_VERSION,
            documents: tree.snapshot(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        write_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), documents = tree.len(), "flushed json store");
        Ok(())
    }

    fn write_ops(&self, ops: Vec<WriteOp>) -> StoreResult<()> {
        let mut tree = self.tree.write().map_err(|_| StoreError::Poisoned)?;
        let mut staged = tree.clone();
        staged.apply_all(ops)?;
        self.flush(&staged)?;
        *tree = staged;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        let tree = self.tree.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tree.get(path).cloned())
    }

    fn set(&self, path: &DocPath, doc: Document) -> StoreResult<()> {
        self.write_ops(vec![WriteOp::Set {
            path: path.clone(),
            doc,
        }])
    }

    fn update(&self, path: &DocPath, fields: Document) -> StoreResult<()> {
        self.write_ops(vec![WriteOp::Update {
            path: path.clone(),
            fields,
        }])
    }

    fn delete(&self, path: &DocPath) -> StoreResult<()> {
        self.write_ops(vec![WriteOp::Delete { path: path.clone() }])
    }

    fn query(&self, collection: &CollectionPath, query: &Query) -> StoreResult<Vec<(String, Document)>> {
        let tree = self.tree.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tree.query(collection, query))
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.write_ops(batch.into_ops())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{fields, paths};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn reopening_restores_documents() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("store.json");
        {
            let store = JsonFileStore::open(&file).unwrap();
            let doc = json!({"email": "a@b.c", "name": "A"});
            store
                .set(&paths::user("u1"), doc.as_object().cloned().unwrap())
                .unwrap();
            store
                .update(&paths::user("u1"), fields([("name", json!("B"))]))
                .unwrap();
        }
        let reopened = JsonFileStore::open(&file).unwrap();
        let doc = reopened.get(&paths::user("u1")).unwrap().unwrap();
        assert_eq!(doc["name"], json!("B"));
    }

    #[test]
    fn rejects_newer_schema() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("store.json");
        fs::write(&file, r#"{"schemaVersion": 99, "documents": {}}"#).unwrap();
        assert!(matches!(
            JsonFileStore::open(&file),
            Err(StoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn failed_update_is_not_flushed() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("store.json");
        let store = JsonFileStore::open(&file).unwrap();
        assert!(store
            .update(&paths::user("nobody"), fields([("name", json!("x"))]))
            .is_err());
        assert!(!file.exists());
    }
}
