//! reqwest backed transport.

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::{debug, instrument};

use super::{FetchRequest, FetchResponse, Transport};
use crate::config::HttpConfig;
use crate::error::{PageableError, Result};

/// Fetches pages over HTTP(S), expecting JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Apply `request.params` to `request.url`, replacing any query pair of
    /// the same name already present in the URL.
    pub fn request_url(request: &FetchRequest) -> Result<Url> {
        let mut url = Url::parse(&request.url).map_err(|e| {
            PageableError::configuration(format!(
                "request url {:?} is not an absolute URL: {}",
                request.url, e
            ))
        })?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !request.params.contains_key(key.as_ref()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() && request.params.is_empty() {
            url.set_query(None);
            return Ok(url);
        }

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter())
            .extend_pairs(request.params.iter());
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(page = request.page, url = %request.url))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let url = Self::request_url(request)?;
        let url_string = url.to_string();

        let resp = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PageableError::http_status(url_string, status.as_u16()));
        }

        let mut response = FetchResponse::new(url_string, serde_json::Value::Null)
            .with_status(status.as_u16());
        for (name, value) in resp.headers() {
            if let Ok(value) = value.to_str() {
                response.insert_header(name.as_str(), value);
            }
        }

        let body = resp.text().await?;
        if !body.trim().is_empty() {
            response.body = serde_json::from_str(&body)?;
        }

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "fetched page"
        );
        Ok(response)
    }
}
