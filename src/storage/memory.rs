use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::warn;

use super::{
    CollectionPath, DocPath, Document, DocumentStore, Query, StoreError, StoreResult, WriteBatch,
    WriteOp,
};

/// Flat, ordered map of every stored document keyed by its path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTree {
    docs: BTreeMap<DocPath, Document>,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, path: &DocPath) -> Option<&Document> {
        self.docs.get(path)
    }

    pub fn apply(&mut self, op: WriteOp) -> StoreResult<()> {
        match op {
            WriteOp::Set { path, doc } => {
                self.docs.insert(path, doc);
            }
            WriteOp::Update { path, fields } => {
                let existing = self
                    .docs
                    .get_mut(&path)
                    .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
                existing.extend(fields);
            }
            WriteOp::Delete { path } => {
                self.docs.remove(&path);
            }
        }
        Ok(())
    }

    /// Applies every op or none of them.
    pub fn apply_all(&mut self, ops: Vec<WriteOp>) -> StoreResult<()> {
        let mut staged = self.clone();
        for op in ops {
            staged.apply(op)?;
        }
        *self = staged;
        Ok(())
    }

    pub fn query(&self, collection: &CollectionPath, query: &Query) -> Vec<(String, Document)> {
        let mut hits: Vec<(String, Document)> = self
            .docs
            .iter()
            .filter(|(path, doc)| collection.contains(path) && query.matches(doc))
            .map(|(path, doc)| (path.id().to_string(), doc.clone()))
            .collect();
        query.sort(&mut hits);
        hits
    }

    /// Path-string keyed view used for serialization.
    pub fn snapshot(&self) -> BTreeMap<String, Document> {
        self.docs
            .iter()
            .map(|(path, doc)| (path.to_string(), doc.clone()))
            .collect()
    }

    pub fn from_snapshot(snapshot: BTreeMap<String, Document>) -> StoreResult<Self> {
        let docs = snapshot
            .into_iter()
            .map(|(raw, doc)| Ok((DocPath::parse(&raw)?, doc)))
            .collect::<StoreResult<BTreeMap<_, _>>>()?;
        Ok(Self { docs })
    }
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    prefix: String,
    code: String,
}

/// In-process store. Writes under a registered prefix can be made to fail,
/// which lets callers exercise partially applied multi-step operations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: RwLock<DocumentTree>,
    failures: RwLock<Vec<InjectedFailure>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(tree: DocumentTree) -> Self {
        Self {
            tree: RwLock::new(tree),
            failures: RwLock::default(),
        }
    }

    /// Makes every later write whose path starts with `prefix` fail with `code`.
    pub fn fail_writes_under(&self, prefix: impl Into<String>, code: impl Into<String>) {
        if let Ok(mut failures) = self.failures.write() {
            failures.push(InjectedFailure {
                prefix: prefix.into(),
                code: code.into(),
            });
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
    }

    pub fn snapshot(&self) -> StoreResult<DocumentTree> {
        Ok(self.tree.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn check_writable(&self, path: &DocPath) -> StoreResult<()> {
        let failures = self.failures.read().map_err(|_| StoreError::Poisoned)?;
        let raw = path.to_string();
        match failures.iter().find(|failure| raw.starts_with(&failure.prefix)) {
            Some(failure) => {
                warn!(path = %raw, code = %failure.code, "rejecting write");
                Err(StoreError::Unavailable {
                    code: failure.code.clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn write_op(&self, op: WriteOp) -> StoreResult<()> {
        self.check_writable(op.path())?;
        self.tree
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .apply(op)
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        let tree = self.tree.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tree.get(path).cloned())
    }

    fn set(&self, path: &DocPath, doc: Document) -> StoreResult<()> {
        self.write_op(WriteOp::Set {
            path: path.clone(),
            doc,
        })
    }

    fn update(&self, path: &DocPath, fields: Document) -> StoreResult<()> {
        self.write_op(WriteOp::Update {
            path: path.clone(),
            fields,
        })
    }

    fn delete(&self, path: &DocPath) -> StoreResult<()> {
        self.write_op(WriteOp::Delete { path: path.clone() })
    }

    fn query(&self, collection: &CollectionPath, query: &Query) -> StoreResult<Vec<(String, Document)>> {
        let tree = self.tree.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tree.query(collection, query))
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        for op in batch.ops() {
            self.check_writable(op.path())?;
        }
        self.tree
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .apply_all(batch.into_ops())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{fields, FilterOp};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn coll() -> CollectionPath {
        CollectionPath::root("items")
    }

    #[test]
    fn set_get_update_delete() {
        let store = MemoryStore::new();
        let path = coll().doc("a");
        store.set(&path, doc(json!({"title": "A", "amount": 1}))).unwrap();
        store
            .update(&path, fields([("amount", json!(5))]))
            .unwrap();
        let stored = store.get(&path).unwrap().unwrap();
        assert_eq!(stored["title"], json!("A"));
        assert_eq!(stored["amount"], json!(5));
        store.delete(&path).unwrap();
        assert!(store.get(&path).unwrap().is_none());
    }

    #[test]
    fn update_of_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update(&coll().doc("missing"), fields([("a", json!(1))]))
            .unwrap_err();
        assert_eq!(err.code(), "not-found");
    }

    #[test]
    fn query_only_returns_direct_children() {
        let store = MemoryStore::new();
        store.set(&coll().doc("a"), doc(json!({"n": 2}))).unwrap();
        store.set(&coll().doc("b"), doc(json!({"n": 1}))).unwrap();
        store
            .set(&coll().doc("a").collection("sub").doc("c"), doc(json!({"n": 0})))
            .unwrap();
        let hits = store
            .query(&coll(), &Query::new().filter("n", FilterOp::Ge, 1).order_by("n"))
            .unwrap();
        let ids: Vec<_> = hits.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn failed_batch_leaves_tree_untouched() {
        let store = MemoryStore::new();
        store.set(&coll().doc("a"), doc(json!({"n": 1}))).unwrap();
        let mut batch = WriteBatch::new();
        batch
            .update(coll().doc("a"), fields([("n", json!(2))]))
            .update(coll().doc("ghost"), fields([("n", json!(3))]));
        assert!(store.commit(batch).is_err());
        assert_eq!(store.get(&coll().doc("a")).unwrap().unwrap()["n"], json!(1));
    }

    #[test]
    fn injected_failures_reject_matching_writes() {
        let store = MemoryStore::new();
        store.fail_writes_under("items/b", "unavailable");
        store.set(&coll().doc("a"), doc(json!({}))).unwrap();
        let err = store.set(&coll().doc("b"), doc(json!({}))).unwrap_err();
        assert_eq!(err.code(), "unavailable");
        store.clear_failures();
        store.set(&coll().doc("b"), doc(json!({}))).unwrap();
    }

    #[test]
    fn snapshot_round_trips_paths() {
        let mut tree = DocumentTree::new();
        tree.apply(WriteOp::Set {
            path: coll().doc("a"),
            doc: doc(json!({"n": 1})),
        })
        .unwrap();
        let restored = DocumentTree::from_snapshot(tree.snapshot()).unwrap();
        assert_eq!(restored, tree);
    }
}
