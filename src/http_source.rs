#![cfg(feature = "web")]

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;

use crate::error::FetchError;
use crate::item::Page;
use crate::source::PageSource;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `PageSource` that reads pages from a JSON list endpoint
///
/// Requests `GET {endpoint}?page={n}&pageSize={size}` and expects a
/// `{"items": [...], "totalCount": n}` body.
pub struct HttpPageSource<T> {
    http: Client,
    endpoint: String,
    page_size: u32,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    /// Create a source for `endpoint` with the default 30 second request timeout
    ///
    /// # Arguments
    /// * `endpoint` - Full URL of the list endpoint, without query string
    /// * `page_size` - Items requested per page
    ///
    /// # Returns
    /// * `Result<Self, FetchError>` - The source, or `Transport` if the HTTP client could not be built
    pub fn new(endpoint: impl Into<String>, page_size: u32) -> Result<Self, FetchError> {
        Self::with_timeout(endpoint, page_size, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(HttpPageSource {
            http,
            endpoint: endpoint.into(),
            page_size,
            _item: PhantomData,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl<T> PageSource for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    async fn fetch_page(&self, page: u32) -> Result<Page<T>, FetchError> {
        debug!("GET {} page={} pageSize={}", self.endpoint, page, self.page_size);

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("page", page), ("pageSize", self.page_size)])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("could not read body of {} response: {}", status, e);
                    String::new()
                }
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = res.bytes().await.map_err(map_reqwest_error)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}
