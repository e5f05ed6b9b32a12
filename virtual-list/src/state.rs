use alloc::vec::Vec;

use crate::{ItemKey, VirtualRange};

/// The render state of a [`crate::VirtualList`] at one point in time.
///
/// The value is opaque to callers: it is produced by [`crate::VirtualList::capture_state`] and
/// consumed by a later list through [`crate::ListOptions::with_restore_state_from`]. It carries
/// the measured row sizes so the restored list lays out exactly like the captured one even when
/// estimates differ from real heights.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderSnapshot<K = ItemKey> {
    scroll_offset: u64,
    viewport_size: u32,
    visible: VirtualRange,
    sizes: Vec<(K, u32)>,
}

impl<K> RenderSnapshot<K> {
    pub(crate) fn new(
        scroll_offset: u64,
        viewport_size: u32,
        visible: VirtualRange,
        sizes: Vec<(K, u32)>,
    ) -> Self {
        Self {
            scroll_offset,
            viewport_size,
            visible,
            sizes,
        }
    }

    /// Window scroll offset at capture time.
    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    /// Rows that were on screen (no overscan) at capture time.
    pub fn visible_range(&self) -> VirtualRange {
        self.visible
    }

    pub fn measured_rows(&self) -> usize {
        self.sizes.len()
    }

    pub(crate) fn into_parts(self) -> (u64, u32, Vec<(K, u32)>) {
        (self.scroll_offset, self.viewport_size, self.sizes)
    }
}
