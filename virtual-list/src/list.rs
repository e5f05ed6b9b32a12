use alloc::vec::Vec;
use core::cmp;

use crate::fenwick::Fenwick;
use crate::key::{RowKey, SizeCache};
use crate::{ItemKey, ListOptions, RenderSnapshot, VirtualItemKeyed, VirtualRange};

/// A headless virtualizer for a list that scrolls the window.
///
/// The list never holds UI objects. A host drives it with the window height and scroll offset,
/// reports row heights once rows are laid out, and asks which rows to render. It also answers
/// two questions an infinite list needs:
/// - has the rendered window reached the last known row (`poll_end_reached`)?
/// - what render state must be kept to come back to this exact window (`capture_state`)?
#[derive(Clone, Debug)]
pub struct VirtualList<K = ItemKey> {
    options: ListOptions<K>,
    viewport_size: u32,
    scroll_offset: u64,

    sizes: Vec<u32>,
    measured: Vec<bool>,
    sums: Fenwick,
    key_sizes: SizeCache<K>,

    end_reported_at: Option<usize>,
}

impl<K: RowKey> VirtualList<K> {
    /// Creates a list from options.
    ///
    /// When `options.restore_state_from` is set, the snapshot's measured sizes and scroll offset
    /// are applied here, before any query, so the first rendered window is the captured one.
    pub fn new(mut options: ListOptions<K>) -> Self {
        let snapshot = options.restore_state_from.take();
        let mut list = Self {
            viewport_size: options.viewport_size,
            scroll_offset: 0,
            sizes: Vec::new(),
            measured: Vec::new(),
            sums: Fenwick::default(),
            key_sizes: SizeCache::<K>::new(),
            end_reported_at: None,
            options,
        };

        match snapshot {
            Some(snapshot) => list.restore(snapshot),
            None => list.rebuild_sizes(),
        }
        vdebug!(
            count = list.options.count,
            viewport = list.viewport_size,
            scroll_offset = list.scroll_offset,
            "VirtualList::new"
        );
        list
    }

    fn restore(&mut self, snapshot: RenderSnapshot<K>) {
        let (scroll_offset, viewport_size, sizes) = snapshot.into_parts();
        for (key, size) in sizes {
            self.key_sizes.insert(key, size);
        }
        if self.viewport_size == 0 {
            self.viewport_size = viewport_size;
        }
        self.rebuild_sizes();
        self.scroll_offset = self.clamp_scroll_offset(scroll_offset);
        vdebug!(
            requested = scroll_offset,
            applied = self.scroll_offset,
            cached = self.key_sizes.len(),
            "restored render state"
        );
    }

    pub fn options(&self) -> &ListOptions<K> {
        &self.options
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    /// Updates the row count.
    ///
    /// Growing appends rows (cached size by key, else the estimate) without touching existing
    /// rows, which is the common case for paginated data.
    pub fn set_count(&mut self, count: usize) {
        let prev = self.options.count;
        if prev == count {
            return;
        }
        self.options.count = count;
        vtrace!(prev, count, "set_count");

        if count < prev {
            self.sizes.truncate(count);
            self.measured.truncate(count);
            self.sums = Fenwick::from_sizes(&self.sizes);
            self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
            return;
        }

        self.sizes.reserve(count - prev);
        self.measured.reserve(count - prev);
        for i in prev..count {
            let (size, measured) = self.size_for(i);
            self.sizes.push(size);
            self.measured.push(measured);
            self.sums.push(size);
        }
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        self.viewport_size = size;
    }

    pub fn scroll_margin(&self) -> u32 {
        self.options.scroll_margin
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Applies a window scroll offset, clamped to the scrollable extent.
    ///
    /// Returns the applied offset.
    pub fn apply_scroll(&mut self, offset: u64) -> u64 {
        self.scroll_offset = self.clamp_scroll_offset(offset);
        vtrace!(
            requested = offset,
            applied = self.scroll_offset,
            "apply_scroll"
        );
        self.scroll_offset
    }

    /// Height of all rows (excludes `scroll_margin`).
    pub fn total_size(&self) -> u64 {
        self.sums.total()
    }

    pub fn max_scroll_offset(&self) -> u64 {
        let margin = self.options.scroll_margin as u64;
        margin
            .saturating_add(self.total_size())
            .saturating_sub(self.viewport_size as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    pub fn key_for(&self, index: usize) -> K {
        (self.options.compute_item_key)(index)
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        (index < self.options.count).then(|| self.start_of(index))
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    pub fn item_end(&self, index: usize) -> Option<u64> {
        let start = self.item_start(index)?;
        Some(start.saturating_add(self.item_size(index)? as u64))
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Returns the row under a window offset (offsets above the list map to row 0).
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.options.count;
        if count == 0 {
            return None;
        }
        let in_list = offset.saturating_sub(self.options.scroll_margin as u64);
        Some(self.sums.rows_within(in_list).min(count - 1))
    }

    /// Records the laid-out size of a row.
    ///
    /// Rows starting above the scroll offset shift the offset by the size change so the content
    /// on screen stays put. Returns that shift (0 when nothing moved).
    pub fn measure(&mut self, index: usize, size: u32) -> i64 {
        if index >= self.options.count {
            vwarn!(index, count = self.options.count, "measure: out-of-bounds index");
            return 0;
        }
        let start = self.start_of(index);
        let key = self.key_for(index);
        self.key_sizes.insert(key, size);
        self.measured[index] = true;

        let cur = self.sizes[index];
        if cur == size {
            return 0;
        }
        self.sizes[index] = size;
        let delta = size as i64 - cur as i64;
        self.sums.add(index, delta);

        if start >= self.scroll_offset {
            return 0;
        }
        self.scroll_offset = if delta > 0 {
            self.scroll_offset.saturating_add(delta as u64)
        } else {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        };
        vtrace!(index, delta, scroll_offset = self.scroll_offset, "measure: anchored");
        delta
    }

    /// Rows intersecting the window (no overscan).
    pub fn visible_range(&self) -> VirtualRange {
        self.compute_visible_range(self.scroll_offset, self.viewport_size)
    }

    /// Rows to render: the visible rows plus `overscan` on each side.
    pub fn rendered_range(&self) -> VirtualRange {
        let visible = self.visible_range();
        if visible.is_empty() {
            return visible;
        }
        let overscan = self.options.overscan;
        VirtualRange {
            start_index: visible.start_index.saturating_sub(overscan),
            end_index: cmp::min(
                self.options.count,
                visible.end_index.saturating_add(overscan),
            ),
        }
    }

    pub fn for_each_rendered_item(&self, mut f: impl FnMut(VirtualItemKeyed<K>)) {
        let range = self.rendered_range();
        if range.is_empty() {
            return;
        }
        let mut start = self.start_of(range.start_index);
        for index in range.start_index..range.end_index {
            let size = self.sizes[index];
            f(VirtualItemKeyed {
                key: self.key_for(index),
                index,
                start,
                size,
            });
            start = start.saturating_add(size as u64);
        }
    }

    /// Collects the rendered rows into `out` (clears `out` first).
    pub fn collect_rendered_items(&self, out: &mut Vec<VirtualItemKeyed<K>>) {
        out.clear();
        self.for_each_rendered_item(|it| out.push(it));
    }

    /// Reports that the rendered window includes the last known row.
    ///
    /// Fires at most once per row count: after it returns `Some(count)`, it stays quiet until the
    /// count changes. A source that fails or returns nothing is therefore not asked again by
    /// scrolling alone.
    pub fn poll_end_reached(&mut self) -> Option<usize> {
        let count = self.options.count;
        let rendered = self.rendered_range();
        if rendered.is_empty() || rendered.end_index < count {
            return None;
        }
        if self.end_reported_at == Some(count) {
            return None;
        }
        self.end_reported_at = Some(count);
        vdebug!(count, "end reached");
        Some(count)
    }

    /// Captures the current render state.
    pub fn capture_state(&self) -> RenderSnapshot<K>
    where
        K: Clone,
    {
        let mut sizes = Vec::new();
        for (index, &measured) in self.measured.iter().enumerate() {
            if measured {
                sizes.push((self.key_for(index), self.sizes[index]));
            }
        }
        vdebug!(
            scroll_offset = self.scroll_offset,
            measured = sizes.len(),
            "capture_state"
        );
        RenderSnapshot::new(
            self.scroll_offset,
            self.viewport_size,
            self.visible_range(),
            sizes,
        )
    }

    fn size_for(&self, index: usize) -> (u32, bool) {
        let key = self.key_for(index);
        match self.key_sizes.get(&key) {
            Some(&size) => (size, true),
            None => ((self.options.estimate_size)(index), false),
        }
    }

    fn rebuild_sizes(&mut self) {
        let count = self.options.count;
        self.sizes.clear();
        self.measured.clear();
        self.sizes.reserve_exact(count);
        self.measured.reserve_exact(count);
        for i in 0..count {
            let (size, measured) = self.size_for(i);
            self.sizes.push(size);
            self.measured.push(measured);
        }
        self.sums = Fenwick::from_sizes(&self.sizes);
    }

    fn start_of(&self, index: usize) -> u64 {
        (self.options.scroll_margin as u64).saturating_add(self.sums.prefix_sum(index))
    }

    fn compute_visible_range(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let count = self.options.count;
        if count == 0 || viewport_size == 0 {
            return VirtualRange::EMPTY;
        }

        let margin = self.options.scroll_margin as u64;
        let total = self.total_size();
        let view = viewport_size as u64;
        let max_scroll = margin.saturating_add(total).saturating_sub(view);
        let scroll_offset = scroll_offset.min(max_scroll);
        let scroll_end = scroll_offset.saturating_add(view);
        if scroll_end <= margin {
            return VirtualRange::EMPTY;
        }

        let first = scroll_offset.saturating_sub(margin);
        if first >= total {
            return VirtualRange {
                start_index: count,
                end_index: count,
            };
        }
        let last = cmp::max(scroll_end - margin - 1, first);

        let start = self.sums.rows_within(first).min(count - 1);
        let end = self.sums.rows_within(last).min(count - 1) + 1;
        VirtualRange {
            start_index: start,
            end_index: end,
        }
    }
}
