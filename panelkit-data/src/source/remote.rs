//! HTTP data source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::DataSource;
use super::LoadParams;
use super::LoadResult;
use super::ResponseFields;
use crate::error::LoadError;

/// HTTP method used for load requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Parameters in the query string.
    #[default]
    Get,
    /// Parameters as a form body.
    Post,
}

/// A source that loads rows from an HTTP endpoint.
///
/// The endpoint receives the [`LoadParams`] as query or form pairs and must
/// answer with `{ "success": true, "<records>": [...], "<total>": n }`.
///
/// # Example
///
/// ```ignore
/// let source = RemoteSource::new("https://example.com/api/users")
///     .method(Method::Post)
///     .timeout(Duration::from_secs(10));
/// let store = DataStore::new(StoreConfig::default(), source);
/// store.load().await;
/// ```
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    method: Method,
    fields: ResponseFields,
    timeout: Option<Duration>,
    http_client: Client,
}

impl RemoteSource {
    /// Creates a GET source for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            fields: ResponseFields::default(),
            timeout: None,
            http_client: Client::new(),
        }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the response field names.
    pub fn response_fields(mut self, fields: ResponseFields) -> Self {
        self.fields = fields;
        self
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses a shared HTTP client.
    pub fn client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DataSource for RemoteSource {
    async fn fetch(&self, params: &LoadParams) -> Result<LoadResult, LoadError> {
        let pairs = params.to_pairs();
        let mut request = match self.method {
            Method::Get => self.http_client.get(&self.url).query(&pairs),
            Method::Post => self.http_client.post(&self.url).form(&pairs),
        };

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::http(status, body));
        }

        let body: serde_json::Value = response.json().await?;
        LoadResult::from_response(body, &self.fields)
    }
}
