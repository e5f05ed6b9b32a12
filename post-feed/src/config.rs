use serde::Deserialize;

use crate::error::ConfigError;
use crate::feed::NextPagePolicy;

/// Settings for the post browser.
///
/// Sizes are in layout rows (one row per rendered text line). Every field has a default, so a
/// partial JSON document is enough:
///
/// ```
/// let config = post_feed::FeedConfig::from_json_str(r#"{ "page_size": 20 }"#).unwrap();
/// assert_eq!(config.page_size, 20);
/// assert_eq!(config.viewport_height, 24);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Root of the API; `posts` and `posts/{id}` are resolved against it.
    pub base_url: String,
    pub page_size: u32,
    /// Window height.
    pub viewport_height: u32,
    /// Rows taken by the list heading above the first post.
    pub header_height: u32,
    /// Height assumed for a post row until it has been laid out.
    pub row_estimate: u32,
    pub overscan: usize,
    pub request_timeout_ms: u64,
    pub next_page_policy: NextPagePolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonplaceholder.typicode.com/".to_string(),
            page_size: 10,
            viewport_height: 24,
            header_height: 2,
            row_estimate: 6,
            overscan: 1,
            request_timeout_ms: 30_000,
            next_page_policy: NextPagePolicy::default(),
        }
    }
}

impl FeedConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Zero { field: "page_size" });
        }
        if self.viewport_height == 0 {
            return Err(ConfigError::Zero {
                field: "viewport_height",
            });
        }
        if self.row_estimate == 0 {
            return Err(ConfigError::Zero {
                field: "row_estimate",
            });
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }
}
