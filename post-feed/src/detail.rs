use tracing::warn;

use crate::error::RequestFailed;
use crate::model::Post;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryState<T> {
    Loading,
    Failed(RequestFailed),
    Ready(T),
}

/// The single-post query behind the detail view.
#[derive(Clone, Debug)]
pub struct DetailQuery {
    id: String,
    state: QueryState<Post>,
}

impl DetailQuery {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: QueryState::Loading,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// A query without an identifier never fetches.
    pub fn is_enabled(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn state(&self) -> &QueryState<Post> {
        &self.state
    }

    /// Applies a fetch result for `id`; results for another identifier are ignored.
    pub fn complete(&mut self, id: &str, result: Result<Post, RequestFailed>) -> bool {
        if id != self.id {
            warn!(expected = %self.id, got = id, "dropping stale detail response");
            return false;
        }
        self.state = match result {
            Ok(post) => QueryState::Ready(post),
            Err(e) => QueryState::Failed(e),
        };
        true
    }
}
