use alloc::vec::Vec;

/// Prefix sums over row sizes.
///
/// `tree[i]` (1-based) holds the sum of the `lsb(i)` sizes ending at row `i - 1`.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick {
    tree: Vec<u64>,
    total: u64,
    top_bit: usize,
}

impl Default for Fenwick {
    fn default() -> Self {
        Self::from_sizes(&[])
    }
}

impl Fenwick {
    pub(crate) fn from_sizes(sizes: &[u32]) -> Self {
        let n = sizes.len();
        let mut tree = alloc::vec![0u64; n + 1];
        let mut total = 0u64;
        for i in 1..=n {
            let v = sizes[i - 1] as u64;
            total = total.saturating_add(v);
            tree[i] = tree[i].saturating_add(v);
            let parent = i + lsb(i);
            if parent <= n {
                tree[parent] = tree[parent].saturating_add(tree[i]);
            }
        }
        Self {
            tree,
            total,
            top_bit: top_bit(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    /// Appends one row in `O(log n)`.
    pub(crate) fn push(&mut self, size: u32) {
        let i = self.len() + 1;
        let covered_from = i - lsb(i);
        // The new node covers rows (covered_from, i]; everything but the new row is already summed.
        let inherited = self
            .prefix_sum(i - 1)
            .saturating_sub(self.prefix_sum(covered_from));
        self.tree.push(inherited.saturating_add(size as u64));
        self.total = self.total.saturating_add(size as u64);
        self.top_bit = top_bit(i);
    }

    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n || delta == 0 {
            return;
        }
        self.total = apply_delta(self.total, delta);
        let mut i = index + 1;
        while i <= n {
            self.tree[i] = apply_delta(self.tree[i], delta);
            i += lsb(i);
        }
    }

    /// Sum of the first `count` sizes.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = count.min(self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Number of leading rows whose combined size is `<= target`.
    ///
    /// For an offset inside the list this is the index of the row under that offset.
    pub(crate) fn rows_within(&self, mut target: u64) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.top_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= target {
                target -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        debug_assert!(value >= delta.unsigned_abs(), "Fenwick underflow");
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn top_bit(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1usize << (usize::BITS - 1 - n.leading_zeros())
    }
}
