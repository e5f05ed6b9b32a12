use tracing::info;

use crate::api::PostApi;
use crate::config::FeedConfig;
use crate::error::{ConfigError, RouteError};
use crate::feed::PagedFeed;
use crate::navigation::Navigator;
use crate::route::Route;
use crate::view::{DetailView, ListView, Screen};

#[derive(Clone, Debug)]
pub enum ActiveView {
    Blank,
    List(ListView),
    Detail(DetailView),
}

/// The browser: owns the post cache, the navigator and whichever view is mounted.
///
/// Every operation runs to completion on the caller's task; fetches are awaited in place, so a
/// response can never land on a view that has already been replaced.
pub struct AppShell<A> {
    api: A,
    config: FeedConfig,
    feed: PagedFeed,
    navigator: Navigator,
    view: ActiveView,
}

impl<A: PostApi> AppShell<A> {
    /// Fails when `config` does not validate.
    pub fn new(api: A, config: FeedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let feed = PagedFeed::new(config.page_size, config.next_page_policy);
        Ok(Self {
            api,
            config,
            feed,
            navigator: Navigator::new(),
            view: ActiveView::Blank,
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn feed(&self) -> &PagedFeed {
        &self.feed
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.navigator.current()
    }

    /// The window's scroll offset; detail pages always start at the top.
    pub fn window_scroll(&self) -> u64 {
        match &self.view {
            ActiveView::List(list) => list.scroll_offset(),
            ActiveView::Blank | ActiveView::Detail(_) => 0,
        }
    }

    pub fn render(&self) -> Screen {
        match &self.view {
            ActiveView::Blank => Screen::Loading,
            ActiveView::List(list) => list.render(&self.feed),
            ActiveView::Detail(detail) => detail.render(),
        }
    }

    pub async fn open(&mut self, path: &str) -> Result<(), RouteError> {
        let route = Route::parse(path)?;
        info!(%route, "navigate");
        self.navigator.push(route.clone());
        self.mount(route).await;
        Ok(())
    }

    /// Returns to the previous route; `false` when there is none.
    pub async fn back(&mut self) -> bool {
        let Some(route) = self.navigator.back().cloned() else {
            return false;
        };
        info!(%route, "navigate back");
        self.mount(route).await;
        true
    }

    /// Scrolls the window while the list is mounted and returns the resulting offset.
    pub async fn scroll_to(&mut self, offset: u64) -> u64 {
        let ActiveView::List(list) = &mut self.view else {
            return self.window_scroll();
        };
        list.on_scroll(offset, &self.feed);
        self.settle_list().await;
        self.window_scroll()
    }

    /// Activates the list row at `index` and opens its post.
    ///
    /// Returns `None` when the list is not mounted or the row does not exist.
    pub async fn activate(&mut self, index: usize) -> Option<Route> {
        let ActiveView::List(list) = &self.view else {
            return None;
        };
        let post = self.feed.get(index)?;
        let route = self.navigator.activate(list, post);
        self.mount(route.clone()).await;
        Some(route)
    }

    async fn mount(&mut self, route: Route) {
        match route {
            Route::List => self.mount_list().await,
            Route::Detail { id } => self.mount_detail(id).await,
        }
    }

    async fn mount_list(&mut self) {
        let instance_key = self.navigator.restoration().instance_key();
        let reusable =
            matches!(&self.view, ActiveView::List(list) if list.instance_key() == instance_key);
        if !reusable {
            self.view = ActiveView::List(ListView::mount(
                &self.feed,
                &self.config,
                self.navigator.restoration(),
            ));
        }

        if let Some(request) = self.feed.begin_initial() {
            let result = self.api.fetch_page(request.limit, request.page).await;
            self.feed.complete(request, result);
        }
        self.settle_list().await;
    }

    /// Lays the list out and loads one more page at a time while the rendered rows reach the
    /// end of what is loaded.
    async fn settle_list(&mut self) {
        loop {
            let ActiveView::List(list) = &mut self.view else {
                return;
            };
            list.sync(&self.feed);
            if !list.poll_end_reached() {
                return;
            }
            let Some(request) = self.feed.begin_next_page() else {
                return;
            };
            let result = self.api.fetch_page(request.limit, request.page).await;
            self.feed.complete(request, result);
        }
    }

    async fn mount_detail(&mut self, id: String) {
        let view = DetailView::new(id.clone());
        let enabled = view.query().is_enabled();
        self.view = ActiveView::Detail(view);
        if !enabled {
            return;
        }

        let result = self.api.fetch_post(&id).await;
        if let ActiveView::Detail(view) = &mut self.view {
            view.query_mut().complete(&id, result);
        }
    }
}
