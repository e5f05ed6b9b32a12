use thiserror::Error;

/// A request to the post API did not produce a usable response.
///
/// This is the only request error kind. It is `Clone` so query state can keep it around for
/// rendering after the request is gone.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Network response was not ok ({cause})")]
pub struct RequestFailed {
    pub url: String,
    pub cause: FailureCause,
}

impl RequestFailed {
    pub fn new(url: impl Into<String>, cause: FailureCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("transport: {0}")]
    Transport(String),
    #[error("undecodable body: {0}")]
    Body(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route matches {0:?}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("invalid base URL")]
    BaseUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
