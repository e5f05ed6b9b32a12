//! Access to the remote post collection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::FeedConfig;
use crate::error::{ConfigError, FailureCause, RequestFailed};
use crate::model::Post;

/// The two reads the browser needs from the remote collection.
#[async_trait]
pub trait PostApi: Send + Sync {
    /// One page of the collection (`page` starts at 1).
    async fn fetch_page(&self, limit: u32, page: u32) -> Result<Vec<Post>, RequestFailed>;

    /// One post by identifier, passed through verbatim.
    async fn fetch_post(&self, id: &str) -> Result<Post, RequestFailed>;
}

/// [`PostApi`] over HTTP with `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpPostApi {
    http: Client,
    base: Url,
}

impl HttpPostApi {
    /// Validates `config` and builds the client.
    pub fn new(config: &FeedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { http, base })
    }

    pub(crate) fn page_url(&self, limit: u32, page: u32) -> Result<Url, RequestFailed> {
        let mut url = self.join("posts")?;
        url.query_pairs_mut()
            .append_pair("_limit", &limit.to_string())
            .append_pair("_page", &page.to_string());
        Ok(url)
    }

    /// The id becomes one path segment; characters that cannot appear in a segment (`/`, `?`,
    /// `#`, spaces) are percent-encoded.
    pub(crate) fn post_url(&self, id: &str) -> Result<Url, RequestFailed> {
        let mut url = self.join("posts")?;
        url.path_segments_mut()
            .map_err(|()| {
                RequestFailed::new(
                    self.base.as_str(),
                    FailureCause::Transport("base URL cannot carry a path".to_string()),
                )
            })?
            .push(id);
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url, RequestFailed> {
        self.base.join(path).map_err(|e| {
            RequestFailed::new(self.base.as_str(), FailureCause::Transport(e.to_string()))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RequestFailed> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "request failed");
                RequestFailed::new(url.as_str(), FailureCause::Transport(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "non-success status");
            return Err(RequestFailed::new(
                url.as_str(),
                FailureCause::Status(status.as_u16()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| RequestFailed::new(url.as_str(), FailureCause::Body(e.to_string())))
    }
}

#[async_trait]
impl PostApi for HttpPostApi {
    async fn fetch_page(&self, limit: u32, page: u32) -> Result<Vec<Post>, RequestFailed> {
        let url = self.page_url(limit, page)?;
        self.get_json(url).await
    }

    async fn fetch_post(&self, id: &str) -> Result<Post, RequestFailed> {
        let url = self.post_url(id)?;
        self.get_json(url).await
    }
}
