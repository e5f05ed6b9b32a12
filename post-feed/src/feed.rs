//! The paginated post source.
//!
//! [`PagedFeed`] is the accumulated state of an infinite query. It does no I/O: callers ask it
//! which page to request next, perform the request, and hand the response back. That keeps the
//! request sequence explicit:
//!
//! - page numbers start at 1 and the next one is always `pages fetched + 1`
//! - at most one request is in flight, so pages arrive strictly in increasing order
//! - a response for anything but the in-flight request is dropped as stale
//! - a failed page appends nothing and leaves earlier pages alone

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RequestFailed;
use crate::model::Post;

/// When the feed decides that no further page exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextPagePolicy {
    /// A page shorter than the page size (an empty page included) is the last one.
    #[default]
    ShortPageEnds,
    /// There is always a next page; requests continue until the server fails or the list
    /// stops growing.
    Unbounded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

#[derive(Clone, Debug)]
pub struct PagedFeed {
    page_size: u32,
    policy: NextPagePolicy,
    pages: Vec<Vec<Post>>,
    len: usize,
    in_flight: Option<PageRequest>,
    error: Option<RequestFailed>,
    exhausted: bool,
}

impl PagedFeed {
    pub fn new(page_size: u32, policy: NextPagePolicy) -> Self {
        Self {
            page_size,
            policy,
            pages: Vec::new(),
            len: 0,
            in_flight: None,
            error: None,
            exhausted: false,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn pages(&self) -> &[Vec<Post>] {
        &self.pages
    }

    /// All posts in fetch order.
    pub fn items(&self) -> impl Iterator<Item = &Post> {
        self.pages.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&Post> {
        let mut index = index;
        for page in &self.pages {
            if index < page.len() {
                return page.get(index);
            }
            index -= page.len();
        }
        None
    }

    pub fn has_next_page(&self) -> bool {
        match self.policy {
            NextPagePolicy::Unbounded => true,
            NextPagePolicy::ShortPageEnds => !self.exhausted,
        }
    }

    /// The first page is outstanding and nothing has been loaded yet.
    pub fn is_loading(&self) -> bool {
        self.pages.is_empty() && self.in_flight.is_some()
    }

    pub fn is_fetching_next_page(&self) -> bool {
        !self.pages.is_empty() && self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&RequestFailed> {
        self.error.as_ref()
    }

    pub fn next_page_param(&self) -> u32 {
        self.pages.len() as u32 + 1
    }

    /// Requests the first page when nothing is loaded and nothing is in flight.
    pub fn begin_initial(&mut self) -> Option<PageRequest> {
        if !self.pages.is_empty() || self.in_flight.is_some() {
            return None;
        }
        Some(self.begin(1))
    }

    /// Requests the page after the last loaded one.
    ///
    /// Returns `None` before the first page has loaded, while another request is in flight, or
    /// when the policy says the collection has ended.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.pages.is_empty() || self.in_flight.is_some() || !self.has_next_page() {
            return None;
        }
        let page = self.next_page_param();
        Some(self.begin(page))
    }

    fn begin(&mut self, page: u32) -> PageRequest {
        let request = PageRequest {
            page,
            limit: self.page_size,
        };
        debug!(page, limit = self.page_size, "page requested");
        self.in_flight = Some(request);
        request
    }

    /// Applies the response to a request from `begin_*`.
    ///
    /// Returns `true` when the response matched the in-flight request and was applied.
    pub fn complete(&mut self, request: PageRequest, result: Result<Vec<Post>, RequestFailed>) -> bool {
        if self.in_flight != Some(request) {
            warn!(page = request.page, "dropping stale page response");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(posts) => {
                if posts.len() < self.page_size as usize {
                    self.exhausted = true;
                }
                debug!(
                    page = request.page,
                    received = posts.len(),
                    exhausted = self.exhausted,
                    "page loaded"
                );
                self.len += posts.len();
                self.pages.push(posts);
                self.error = None;
            }
            Err(e) => {
                warn!(page = request.page, error = %e, "page failed");
                self.error = Some(e);
            }
        }
        true
    }
}
