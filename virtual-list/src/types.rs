/// Default row key: the row's position in the list.
pub type ItemKey = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VirtualRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualItemKeyed<K> {
    pub key: K,
    pub index: usize,
    /// Start offset in window coordinates (includes `scroll_margin`).
    pub start: u64,
    pub size: u32,
}

impl<K> VirtualItemKeyed<K> {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}
