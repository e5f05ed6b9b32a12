//! Moving between the list and detail views without losing the list's place.

use tracing::info;
use virtual_list::{ItemKey, RenderSnapshot};

use crate::model::Post;
use crate::route::Route;
use crate::view::ListView;

/// The list render state kept while the list is not mounted.
///
/// There is one slot: storing a snapshot replaces the previous one. Every store bumps the
/// instance key, which tells the list mount that it must build a fresh virtualizer from the
/// snapshot rather than keep a live one.
#[derive(Clone, Debug)]
pub struct RestorationSlot<K = ItemKey> {
    snapshot: Option<RenderSnapshot<K>>,
    instance_key: u64,
}

impl<K> Default for RestorationSlot<K> {
    fn default() -> Self {
        Self {
            snapshot: None,
            instance_key: 0,
        }
    }
}

impl<K> RestorationSlot<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored snapshot and returns the new instance key.
    pub fn store(&mut self, snapshot: RenderSnapshot<K>) -> u64 {
        self.snapshot = Some(snapshot);
        self.instance_key += 1;
        self.instance_key
    }

    pub fn snapshot(&self) -> Option<&RenderSnapshot<K>> {
        self.snapshot.as_ref()
    }

    pub fn instance_key(&self) -> u64 {
        self.instance_key
    }
}

/// Route history plus the restoration slot.
///
/// The slot is written only from [`Navigator::activate`] and read only when the list mounts.
#[derive(Clone, Debug, Default)]
pub struct Navigator {
    history: Vec<Route>,
    restoration: RestorationSlot,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Route> {
        self.history.last()
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    pub fn restoration(&self) -> &RestorationSlot {
        &self.restoration
    }

    pub fn push(&mut self, route: Route) {
        self.history.push(route);
    }

    /// Drops the current route and returns the one before it.
    pub fn back(&mut self) -> Option<&Route> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        self.history.last()
    }

    /// A row was activated: keep the list's render state, then go to the post.
    pub fn activate(&mut self, list: &ListView, post: &Post) -> Route {
        let snapshot = list.capture();
        let scroll_offset = snapshot.scroll_offset();
        let instance_key = self.restoration.store(snapshot);
        let route = Route::detail(post.id.to_string());
        info!(%route, scroll_offset, instance_key, "row activated");
        self.history.push(route.clone());
        route
    }
}
