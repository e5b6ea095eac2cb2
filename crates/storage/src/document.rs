//! Document store boundary
//!
//! The backend stores JSON documents in named collections. Documents use the
//! camelCase field names of the backend and are identified by their `id`
//! field.

use gymbook_domain as domain;
use serde_json::{Map, Value, json};

pub type Document = Map<String, Value>;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "camelCase")]
pub enum Collection {
    Exercises,
    Workouts,
    WorkoutExercises,
    ExerciseSets,
    ExerciseProgress,
}

#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn list(&self, collection: Collection, query: &Query)
    -> Result<Vec<Document>, StoreError>;
    async fn create(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, StoreError>;
    /// Merge `changes` into the stored document.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        changes: Document,
    ) -> Result<Document, StoreError>;
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        self.list(collection, &Query::new().eq("id", id).limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Order)>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn is_in(
        mut self,
        field: &str,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.filters.push(Filter::In(
            field.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: &str, order: Order) -> Self {
        self.order_by = Some((field.to_string(), order));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(document))
    }

    /// `{"userId": "u1", "status": {"in": ["planned", "active"]}}`
    #[must_use]
    pub fn where_json(&self) -> Value {
        Value::Object(
            self.filters
                .iter()
                .map(|f| match f {
                    Filter::Eq(field, value) => (field.clone(), value.clone()),
                    Filter::In(field, values) => (field.clone(), json!({ "in": values })),
                })
                .collect(),
        )
    }

    /// `{"createdAt": "desc"}`
    #[must_use]
    pub fn order_json(&self) -> Option<Value> {
        self.order_by.as_ref().map(|(field, order)| {
            let order: &str = order.as_ref();
            let mut result = Map::new();
            result.insert(field.clone(), Value::from(order));
            Value::Object(result)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::Eq(field, value) => document.get(field) == Some(value),
            Filter::In(field, values) => document.get(field).is_some_and(|v| values.contains(v)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("no session")]
    NoSession,
    #[error("no connection")]
    NoConnection,
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::InvalidDocument(value.to_string())
    }
}

impl From<StoreError> for domain::StorageError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NoSession => domain::StorageError::NoSession,
            StoreError::NoConnection => domain::StorageError::NoConnection,
            err => domain::StorageError::Other(err.to_string().into()),
        }
    }
}

impl From<StoreError> for domain::ReadError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => domain::ReadError::NotFound,
            err => domain::ReadError::Storage(err.into()),
        }
    }
}

impl From<StoreError> for domain::CreateError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict => domain::CreateError::Conflict,
            err => domain::CreateError::Storage(err.into()),
        }
    }
}

impl From<StoreError> for domain::UpdateError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => domain::UpdateError::NotFound,
            StoreError::Conflict => domain::UpdateError::Conflict,
            err => domain::UpdateError::Storage(err.into()),
        }
    }
}

impl From<StoreError> for domain::DeleteError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => domain::DeleteError::NotFound,
            err => domain::DeleteError::Storage(err.into()),
        }
    }
}
