//! In-memory document store
//!
//! Implements the query semantics of the backend for local use and tests.

use std::{cell::RefCell, cmp::Ordering, collections::HashMap};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::document::{Collection, Document, DocumentStore, Order, Query, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RefCell<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents of a collection in insertion order.
    #[must_use]
    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        self.collections
            .borrow()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Insert a document without any checks.
    pub fn insert(&self, collection: Collection, document: Document) {
        self.collections
            .borrow_mut()
            .entry(collection)
            .or_default()
            .push(document);
    }
}

impl DocumentStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let mut result = self
            .documents(collection)
            .into_iter()
            .filter(|d| query.matches(d))
            .collect::<Vec<_>>();
        if let Some((field, order)) = &query.order_by {
            result.sort_by(|a, b| {
                let ordering = compare(a.get(field), b.get(field));
                match order {
                    Order::Asc => ordering,
                    Order::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            result.truncate(limit);
        }
        Ok(result)
    }

    async fn create(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, StoreError> {
        let id = document_id(&document)?;
        let mut collections = self.collections.borrow_mut();
        let documents = collections.entry(collection).or_default();
        if documents
            .iter()
            .any(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str()))
        {
            return Err(StoreError::Conflict);
        }
        documents.push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        changes: Document,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.borrow_mut();
        let document = collections
            .get_mut(&collection)
            .and_then(|documents| {
                documents
                    .iter_mut()
                    .find(|d| d.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or(StoreError::NotFound)?;
        for (key, value) in changes {
            if key != "id" {
                document.insert(key, value);
            }
        }
        Ok(document.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.borrow_mut();
        let documents = collections
            .get_mut(&collection)
            .ok_or(StoreError::NotFound)?;
        let position = documents
            .iter()
            .position(|d| d.get("id").and_then(Value::as_str) == Some(id))
            .ok_or(StoreError::NotFound)?;
        documents.remove(position);
        Ok(())
    }
}

fn document_id(document: &Document) -> Result<String, StoreError> {
    document
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| StoreError::InvalidDocument("missing id".to_string()))
}

/// Missing values sort first. Strings holding RFC 3339 timestamps are compared
/// as points in time.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => a.with_timezone(&Utc).cmp(&b.with_timezone(&Utc)),
                _ => a.cmp(b),
            }
        }
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}
