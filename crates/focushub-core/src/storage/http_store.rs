//! Document store reached over HTTP.
//!
//! `GET {base}/{key}` reads a document (404 means absent) and
//! `PATCH {base}/{key}` with a JSON body performs a merge write.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::StoreError;
use crate::persistence::DocumentStore;

pub struct HttpDocumentStore {
    client: Client,
    base: Url,
    api_token: Option<String>,
}

impl HttpDocumentStore {
    pub fn new(base: &str) -> Result<Self, StoreError> {
        let mut base =
            Url::parse(base).map_err(|e| StoreError::InvalidEndpoint(format!("{base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidEndpoint(base.to_string()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
            api_token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn url(&self, key: &str) -> Result<Url, StoreError> {
        self.base
            .join(key.trim_start_matches('/'))
            .map_err(|e| StoreError::InvalidEndpoint(format!("{key}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn remote_error(resp: reqwest::Response) -> StoreError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    StoreError::Remote { status, message }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let resp = self
            .authorize(self.client.get(self.url(key)?))
            .send()
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(resp.json::<Value>().await?)),
            _ => Err(remote_error(resp).await),
        }
    }

    async fn set_merge(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let resp = self
            .authorize(self.client.patch(self.url(key)?).json(&value))
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(remote_error(resp).await)
        }
    }
}
