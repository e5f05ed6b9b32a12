//! List and detail views, rendered to a plain [`Screen`] model.

use core::fmt;

use tracing::{debug, info};
use virtual_list::{ItemKey, ListOptions, RenderSnapshot, VirtualItemKeyed, VirtualList};

use crate::config::FeedConfig;
use crate::detail::{DetailQuery, QueryState};
use crate::feed::PagedFeed;
use crate::model::Post;
use crate::navigation::RestorationSlot;

pub const LIST_HEADING: &str = "Main Page";
pub const DETAIL_HEADING: &str = "Detail Page";

/// Laid-out height of a post row: title line, body lines, blank separator.
pub fn row_height(post: &Post) -> u32 {
    let body_lines = post.body.lines().count().max(1) as u32;
    body_lines + 2
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Error(String),
    List(ListScreen),
    Detail(DetailScreen),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListScreen {
    pub rows: Vec<Row>,
    pub scroll_offset: u64,
    /// Heading plus all rows.
    pub document_height: u64,
    pub loading_more: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub key: ItemKey,
    pub index: usize,
    /// Window offset of the row's first line.
    pub start: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailScreen {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading..."),
            Self::Error(message) => write!(f, "Error: {message}"),
            Self::List(list) => {
                writeln!(f, "{LIST_HEADING}")?;
                writeln!(f)?;
                for row in &list.rows {
                    writeln!(f, "{}: {}", row.id, row.title)?;
                    writeln!(f, "{}", row.body)?;
                    writeln!(f)?;
                }
                if list.loading_more {
                    writeln!(f, "Loading...")?;
                }
                if let Some(message) = &list.error {
                    writeln!(f, "Error: {message}")?;
                }
                Ok(())
            }
            Self::Detail(detail) => {
                writeln!(f, "{DETAIL_HEADING}")?;
                writeln!(f)?;
                writeln!(f, "{}: {}", detail.id, detail.title)?;
                write!(f, "{}", detail.body)
            }
        }
    }
}

/// The virtualized post list.
///
/// A mount reads the restoration slot once; the instance key it was built with decides whether
/// a later mount may reuse it.
#[derive(Clone, Debug)]
pub struct ListView {
    instance_key: u64,
    list: VirtualList,
    scratch: Vec<VirtualItemKeyed<ItemKey>>,
}

impl ListView {
    pub fn mount(feed: &PagedFeed, config: &FeedConfig, slot: &RestorationSlot) -> Self {
        let estimate = config.row_estimate;
        let options = ListOptions::new(feed.len(), move |_| estimate)
            .with_overscan(config.overscan)
            .with_viewport_size(config.viewport_height)
            .with_scroll_margin(config.header_height)
            .with_restore_state_from(slot.snapshot().cloned());
        let list = VirtualList::new(options);
        info!(
            instance_key = slot.instance_key(),
            restored = slot.snapshot().is_some(),
            scroll_offset = list.scroll_offset(),
            "list mounted"
        );
        Self {
            instance_key: slot.instance_key(),
            list,
            scratch: Vec::new(),
        }
    }

    pub fn instance_key(&self) -> u64 {
        self.instance_key
    }

    pub fn scroll_offset(&self) -> u64 {
        self.list.scroll_offset()
    }

    pub fn virtual_list(&self) -> &VirtualList {
        &self.list
    }

    /// Catches up with the feed and lays out every rendered row that has no measured height.
    ///
    /// Measuring can change which rows are rendered, so this repeats until a pass measures
    /// nothing new.
    pub fn sync(&mut self, feed: &PagedFeed) {
        self.list.set_count(feed.len());
        loop {
            self.list.collect_rendered_items(&mut self.scratch);
            let mut measured = 0usize;
            for item in &self.scratch {
                if self.list.is_measured(item.index) {
                    continue;
                }
                if let Some(post) = feed.get(item.index) {
                    self.list.measure(item.index, row_height(post));
                    measured += 1;
                }
            }
            if measured == 0 {
                break;
            }
            debug!(measured, "rows laid out");
        }
        // Rows measured shorter than estimated can leave the offset past the document end.
        let offset = self.list.scroll_offset();
        self.list.apply_scroll(offset);
    }

    /// Applies a window scroll and returns the offset the window should be at.
    pub fn on_scroll(&mut self, offset: u64, feed: &PagedFeed) -> u64 {
        self.list.apply_scroll(offset);
        self.sync(feed);
        self.list.scroll_offset()
    }

    pub fn poll_end_reached(&mut self) -> bool {
        self.list.poll_end_reached().is_some()
    }

    pub fn capture(&self) -> RenderSnapshot {
        self.list.capture_state()
    }

    pub fn render(&self, feed: &PagedFeed) -> Screen {
        if feed.pages().is_empty() {
            return match feed.error() {
                Some(e) => Screen::Error(e.to_string()),
                None => Screen::Loading,
            };
        }

        let mut rows = Vec::new();
        self.list.for_each_rendered_item(|item| {
            if let Some(post) = feed.get(item.index) {
                rows.push(Row {
                    key: item.key,
                    index: item.index,
                    start: item.start,
                    id: post.id,
                    title: post.title.clone(),
                    body: post.body.clone(),
                });
            }
        });

        Screen::List(ListScreen {
            rows,
            scroll_offset: self.list.scroll_offset(),
            document_height: (self.list.scroll_margin() as u64)
                .saturating_add(self.list.total_size()),
            loading_more: feed.is_fetching_next_page(),
            error: feed.error().map(ToString::to_string),
        })
    }
}

#[derive(Clone, Debug)]
pub struct DetailView {
    query: DetailQuery,
}

impl DetailView {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            query: DetailQuery::new(id),
        }
    }

    pub fn query(&self) -> &DetailQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut DetailQuery {
        &mut self.query
    }

    pub fn render(&self) -> Screen {
        let placeholder = |s: &str| {
            if s.is_empty() {
                "-".to_string()
            } else {
                s.to_string()
            }
        };
        if !self.query.is_enabled() {
            return Screen::Detail(DetailScreen {
                id: String::new(),
                title: "-".to_string(),
                body: "-".to_string(),
            });
        }
        match self.query.state() {
            QueryState::Loading => Screen::Loading,
            QueryState::Failed(e) => Screen::Error(e.to_string()),
            QueryState::Ready(post) => Screen::Detail(DetailScreen {
                id: self.query.id().to_string(),
                title: placeholder(&post.title),
                body: placeholder(&post.body),
            }),
        }
    }
}
