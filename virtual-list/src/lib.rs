//! A headless virtualizer for window-scrolled, infinitely growing lists.
//!
//! This crate holds the state needed to render a long list through a bounded number of rows:
//! prefix sums over row sizes, offset → row lookup, overscanned render ranges, and dynamic
//! measurement. On top of that it supports the two things an infinite feed needs:
//!
//! - end-of-list detection, so the host knows when to load the next page
//! - render-state capture and restoration, so a list that is torn down (for example when
//!   navigating to a detail view) can be rebuilt showing exactly the same window
//!
//! It is UI-agnostic. The host provides the window height, the window scroll offset, row size
//! estimates and measured row sizes.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod fenwick;
mod key;
mod list;
mod options;
mod state;
mod types;


pub use key::RowKey;
pub use list::VirtualList;
pub use options::ListOptions;
pub use state::RenderSnapshot;
pub use types::{ItemKey, VirtualItemKeyed, VirtualRange};
