//! Document store of the backend REST API
//!
//! `GET {base}/{collection}?where=..&orderBy=..&limit=..` lists documents,
//! `POST {base}/{collection}` creates, `PATCH {base}/{collection}/{id}` updates
//! and `DELETE {base}/{collection}/{id}` deletes a document.

use std::cell::RefCell;

use serde_json::Value;

use crate::document::{Collection, Document, DocumentStore, Query, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport of requests. A failure to reach the server is reported as
/// [`StoreError::NoConnection`].
#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, StoreError>;
}

#[derive(Clone, Default)]
pub struct ReqwestSendRequest {
    client: reqwest::Client,
}

impl SendRequest for ReqwestSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, StoreError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, &request.url)
            .query(&request.query);
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                StoreError::NoConnection
            } else {
                StoreError::Other(err.to_string())
            }
        })?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| StoreError::Other(err.to_string()))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(Response { status, body })
    }
}

pub struct REST<S> {
    pub sender: S,
    base_url: String,
    token: RefCell<Option<String>>,
}

impl REST<ReqwestSendRequest> {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_sender(base_url, ReqwestSendRequest::default())
    }
}

impl<S: SendRequest> REST<S> {
    #[must_use]
    pub fn with_sender(base_url: &str, sender: S) -> Self {
        Self {
            sender,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RefCell::new(None),
        }
    }

    /// Access token sent as bearer token with every request.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    fn url(&self, collection: Collection, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{collection}/{id}", self.base_url),
            None => format!("{}/{collection}", self.base_url),
        }
    }

    async fn fetch(
        &self,
        method: Method,
        url: String,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Value, StoreError> {
        let token = self.token.borrow().clone();
        let response = self
            .sender
            .send_request(Request {
                method,
                url,
                query,
                token,
                body,
            })
            .await?;
        if response.ok() {
            return Ok(response.body);
        }
        Err(match response.status {
            401 | 403 => StoreError::NoSession,
            404 => StoreError::NotFound,
            409 => StoreError::Conflict,
            status => StoreError::Other(format!("{status} {}", response.body)),
        })
    }
}

impl<S: SendRequest> DocumentStore for REST<S> {
    async fn list(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let mut parameters = vec![];
        if !query.filters.is_empty() {
            parameters.push(("where".to_string(), query.where_json().to_string()));
        }
        if let Some(order) = query.order_json() {
            parameters.push(("orderBy".to_string(), order.to_string()));
        }
        if let Some(limit) = query.limit {
            parameters.push(("limit".to_string(), limit.to_string()));
        }
        let body = self
            .fetch(Method::Get, self.url(collection, None), parameters, None)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn create(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, StoreError> {
        let body = self
            .fetch(
                Method::Post,
                self.url(collection, None),
                vec![],
                Some(Value::Object(document)),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        changes: Document,
    ) -> Result<Document, StoreError> {
        let body = self
            .fetch(
                Method::Patch,
                self.url(collection, Some(id)),
                vec![],
                Some(Value::Object(changes)),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.fetch(
            Method::Delete,
            self.url(collection, Some(id)),
            vec![],
            None,
        )
        .await?;
        Ok(())
    }
}
