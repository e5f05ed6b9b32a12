//! A headless browser for a paginated post collection.
//!
//! The browser has two screens: a virtualized list of posts (`/`) that loads pages as the
//! window scrolls toward the end, and a detail screen for one post (`/:id`). Leaving the list
//! keeps its render state so coming back lands on the same rows at the same scroll offset.
//!
//! Pieces, bottom-up:
//! - [`PostApi`] / [`HttpPostApi`]: the two remote reads
//! - [`PagedFeed`]: accumulated pages with an explicit request/response cycle
//! - [`DetailQuery`]: the single-post query
//! - [`RestorationSlot`] / [`Navigator`]: the list snapshot kept across navigation
//! - [`ListView`] / [`DetailView`]: views rendering to a [`Screen`] model
//! - [`AppShell`]: owns all of the above and drives navigation
#![forbid(unsafe_code)]

mod api;
mod config;
mod detail;
mod error;
mod feed;
mod model;
mod navigation;
mod route;
mod shell;
mod view;

#[cfg(test)]
mod tests;

pub use api::{HttpPostApi, PostApi};
pub use config::FeedConfig;
pub use detail::{DetailQuery, QueryState};
pub use error::{ConfigError, FailureCause, RequestFailed, RouteError};
pub use feed::{NextPagePolicy, PageRequest, PagedFeed};
pub use model::Post;
pub use navigation::{Navigator, RestorationSlot};
pub use route::Route;
pub use shell::{ActiveView, AppShell};
pub use view::{
    DETAIL_HEADING, DetailScreen, DetailView, LIST_HEADING, ListScreen, ListView, Row, Screen,
    row_height,
};

pub use virtual_list::RenderSnapshot;
