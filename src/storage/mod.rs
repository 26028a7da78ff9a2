//! Document-store seam: hierarchical paths, queries, batched writes and the
//! [`DocumentStore`] trait with in-memory and JSON-file backends.

pub mod json_backend;
pub mod memory;
pub mod paths;

use std::cmp::Ordering;
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub use crate::errors::StoreError;
pub use json_backend::JsonFileStore;
pub use memory::{DocumentTree, MemoryStore};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Path of a single document, e.g. `users/u1/budgets/b1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(Vec<String>);

/// Path of a collection, e.g. `users/u1/budgets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(Vec<String>);

impl DocPath {
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 0 {
            return Err(StoreError::InvalidPath(raw.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> CollectionPath {
        CollectionPath(self.0[..self.0.len() - 1].to_vec())
    }

    pub fn collection(&self, name: &str) -> CollectionPath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        CollectionPath(segments)
    }
}

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    pub fn parse(raw: &str) -> StoreResult<Self> {
        let segments = split_segments(raw)?;
        if segments.len() % 2 != 1 {
            return Err(StoreError::InvalidPath(raw.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn doc(&self, id: &str) -> DocPath {
        let mut segments = self.0.clone();
        segments.push(id.to_string());
        DocPath(segments)
    }

    /// True when `path` names a direct child document of this collection.
    pub fn contains(&self, path: &DocPath) -> bool {
        path.0.len() == self.0.len() + 1 && path.0.starts_with(&self.0)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

fn split_segments(raw: &str) -> StoreResult<Vec<String>> {
    let segments: Vec<String> = raw.split('/').map(str::to_string).collect();
    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(StoreError::InvalidPath(raw.to_string()));
    }
    Ok(segments)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Field filters plus an ascending multi-field ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by.push(field.to_string());
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|filter| {
            let value = doc.get(&filter.field).unwrap_or(&Value::Null);
            match compare_values(value, &filter.value) {
                Some(ordering) => match filter.op {
                    FilterOp::Eq => ordering == Ordering::Equal,
                    FilterOp::Lt => ordering == Ordering::Less,
                    FilterOp::Le => ordering != Ordering::Greater,
                    FilterOp::Gt => ordering == Ordering::Greater,
                    FilterOp::Ge => ordering != Ordering::Less,
                },
                None => false,
            }
        })
    }

    pub fn sort(&self, docs: &mut [(String, Document)]) {
        docs.sort_by(|(a_id, a), (b_id, b)| {
            for field in &self.order_by {
                let left = a.get(field).unwrap_or(&Value::Null);
                let right = b.get(field).unwrap_or(&Value::Null);
                match compare_values(left, right).unwrap_or(Ordering::Equal) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            a_id.cmp(b_id)
        });
    }
}

/// Orders JSON scalars of the same kind; mixed kinds compare as unordered.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set { path: DocPath, doc: Document },
    Update { path: DocPath, fields: Document },
    Delete { path: DocPath },
}

impl WriteOp {
    pub fn path(&self) -> &DocPath {
        match self {
            WriteOp::Set { path, .. } | WriteOp::Update { path, .. } | WriteOp::Delete { path } => {
                path
            }
        }
    }
}

/// Ordered group of writes committed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: DocPath, doc: Document) -> &mut Self {
        self.ops.push(WriteOp::Set { path, doc });
        self
    }

    pub fn update(&mut self, path: DocPath, fields: Document) -> &mut Self {
        self.ops.push(WriteOp::Update { path, fields });
        self
    }

    pub fn delete(&mut self, path: DocPath) -> &mut Self {
        self.ops.push(WriteOp::Delete { path });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Abstraction over document databases keyed by hierarchical paths.
pub trait DocumentStore: Send + Sync {
    fn get(&self, path: &DocPath) -> StoreResult<Option<Document>>;
    /// Creates or overwrites the document at `path`.
    fn set(&self, path: &DocPath, doc: Document) -> StoreResult<()>;
    /// Merges `fields` into an existing document; fails with `NotFound` otherwise.
    fn update(&self, path: &DocPath, fields: Document) -> StoreResult<()>;
    fn delete(&self, path: &DocPath) -> StoreResult<()>;
    /// Returns `(id, document)` pairs of the direct children of `collection`.
    fn query(&self, collection: &CollectionPath, query: &Query) -> StoreResult<Vec<(String, Document)>>;
    fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    fn new_id(&self) -> String {
        crate::domain::new_id()
    }
}

pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {other}"
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Builds a field map for a partial update.
pub fn fields<I, K>(pairs: I) -> Document
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value))
        .collect()
}

pub fn read<T: DeserializeOwned>(store: &dyn DocumentStore, path: &DocPath) -> StoreResult<Option<T>> {
    store.get(path)?.map(from_document).transpose()
}

pub fn write<T: Serialize>(store: &dyn DocumentStore, path: &DocPath, value: &T) -> StoreResult<()> {
    store.set(path, to_document(value)?)
}

pub fn query_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &CollectionPath,
    query: &Query,
) -> StoreResult<Vec<T>> {
    store
        .query(collection, query)?
        .into_iter()
        .map(|(_, doc)| from_document(doc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn paths_alternate_collections_and_documents() {
        let budgets = CollectionPath::root("users").doc("u1").collection("budgets");
        assert_eq!(budgets.to_string(), "users/u1/budgets");
        let budget = budgets.doc("b1");
        assert_eq!(budget.id(), "b1");
        assert_eq!(budget.parent(), budgets);
        assert!(budgets.contains(&budget));
        assert!(!budgets.contains(&budget.collection("expenses").doc("e1")));
        assert!(DocPath::parse("users/u1/budgets").is_err());
        assert!(CollectionPath::parse("users//budgets").is_err());
        assert_eq!(DocPath::parse("users/u1").unwrap(), CollectionPath::root("users").doc("u1"));
    }

    #[test]
    fn query_filters_by_range_and_equality() {
        let query = Query::new()
            .filter("date", FilterOp::Ge, "2024-01-02")
            .filter("date", FilterOp::Lt, "2024-01-05")
            .filter("categoryId", FilterOp::Eq, "daily");
        assert!(query.matches(&doc(json!({"date": "2024-01-02", "categoryId": "daily"}))));
        assert!(!query.matches(&doc(json!({"date": "2024-01-05", "categoryId": "daily"}))));
        assert!(!query.matches(&doc(json!({"date": "2024-01-03", "categoryId": "rent"}))));
        assert!(!query.matches(&doc(json!({"date": "2024-01-03"}))));
    }

    #[test]
    fn query_sorts_by_each_field_in_turn() {
        let query = Query::new().order_by("date").order_by("createdAt");
        let mut docs = vec![
            ("c".to_string(), doc(json!({"date": "2024-01-02", "createdAt": 5}))),
            ("a".to_string(), doc(json!({"date": "2024-01-03", "createdAt": 1}))),
            ("b".to_string(), doc(json!({"date": "2024-01-02", "createdAt": 2}))),
        ];
        query.sort(&mut docs);
        let ids: Vec<_> = docs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn to_document_rejects_scalars() {
        assert!(matches!(
            to_document(&5),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
