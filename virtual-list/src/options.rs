use alloc::sync::Arc;

use crate::{ItemKey, RenderSnapshot};

/// Configuration for [`crate::VirtualList`].
///
/// Closures are stored in `Arc`s so options stay cheap to clone.
pub struct ListOptions<K = ItemKey> {
    pub count: usize,
    pub estimate_size: Arc<dyn Fn(usize) -> u32 + Send + Sync>,
    /// Stable identity for the row at a given index.
    ///
    /// Measured sizes are cached under this key, and render snapshots carry them by key.
    pub compute_item_key: Arc<dyn Fn(usize) -> K + Send + Sync>,

    /// Rows rendered beyond each edge of the visible window.
    pub overscan: usize,

    /// Window height (the list scrolls the window, not an inner container).
    pub viewport_size: u32,

    /// Distance from the top of the window's scroll area to the first row.
    ///
    /// Page content above the list (headings etc.) goes here; item offsets and the scroll offset
    /// are both in window coordinates.
    pub scroll_margin: u32,

    /// Render state to restore on construction instead of mounting at the top.
    pub restore_state_from: Option<RenderSnapshot<K>>,
}

impl<K: Clone> Clone for ListOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            compute_item_key: Arc::clone(&self.compute_item_key),
            overscan: self.overscan,
            viewport_size: self.viewport_size,
            scroll_margin: self.scroll_margin,
            restore_state_from: self.restore_state_from.clone(),
        }
    }
}

impl ListOptions<ItemKey> {
    /// Creates options for a list keyed by position.
    pub fn new(count: usize, estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::new_with_key(count, estimate_size, |i| i as u64)
    }
}

impl<K> ListOptions<K> {
    pub fn new_with_key(
        count: usize,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
        compute_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            compute_item_key: Arc::new(compute_item_key),
            overscan: 1,
            viewport_size: 0,
            scroll_margin: 0,
            restore_state_from: None,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_viewport_size(mut self, viewport_size: u32) -> Self {
        self.viewport_size = viewport_size;
        self
    }

    pub fn with_scroll_margin(mut self, scroll_margin: u32) -> Self {
        self.scroll_margin = scroll_margin;
        self
    }

    pub fn with_restore_state_from(mut self, snapshot: Option<RenderSnapshot<K>>) -> Self {
        self.restore_state_from = snapshot;
        self
    }
}

impl<K> core::fmt::Debug for ListOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("count", &self.count)
            .field("overscan", &self.overscan)
            .field("viewport_size", &self.viewport_size)
            .field("scroll_margin", &self.scroll_margin)
            .field("restores", &self.restore_state_from.is_some())
            .finish_non_exhaustive()
    }
}
