use crate::*;

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use virtual_list::{ListOptions, VirtualList};

fn post(id: u64) -> Post {
    Post {
        id,
        title: format!("title {id}"),
        body: format!("body {id}"),
    }
}

fn posts(ids: std::ops::Range<u64>) -> Vec<Post> {
    ids.map(post).collect()
}

#[derive(Default)]
struct FakeApi {
    posts: Vec<Post>,
    failing_pages: Vec<u32>,
    failing_posts: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn with_posts(count: u64) -> Self {
        Self {
            posts: posts(1..count + 1),
            ..Self::default()
        }
    }

    fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.push(page);
        self
    }

    fn failing_post(mut self, id: &str) -> Self {
        self.failing_posts.push(id.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostApi for FakeApi {
    async fn fetch_page(&self, limit: u32, page: u32) -> Result<Vec<Post>, RequestFailed> {
        self.calls.lock().unwrap().push(format!("page {page}"));
        if self.failing_pages.contains(&page) {
            return Err(RequestFailed::new(
                format!("fake:/posts?_limit={limit}&_page={page}"),
                FailureCause::Status(500),
            ));
        }
        let start = (page as usize - 1) * limit as usize;
        Ok(self
            .posts
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_post(&self, id: &str) -> Result<Post, RequestFailed> {
        self.calls.lock().unwrap().push(format!("post {id}"));
        let url = format!("fake:/posts/{id}");
        if self.failing_posts.iter().any(|f| f == id) {
            return Err(RequestFailed::new(url, FailureCause::Status(500)));
        }
        self.posts
            .iter()
            .find(|p| p.id.to_string() == id)
            .cloned()
            .ok_or_else(|| RequestFailed::new(url, FailureCause::Status(404)))
    }
}

fn shell(api: FakeApi) -> AppShell<FakeApi> {
    AppShell::new(api, FeedConfig::default()).unwrap()
}

fn list_screen(shell: &AppShell<FakeApi>) -> ListScreen {
    match shell.render() {
        Screen::List(list) => list,
        other => panic!("expected the list screen, got {other:?}"),
    }
}

async fn scroll_to_bottom(shell: &mut AppShell<FakeApi>, times: usize) {
    for _ in 0..times {
        shell.scroll_to(u64::MAX).await;
    }
}

// ---- feed ----

#[test]
fn feed_accumulates_pages_of_ten_ten_five() {
    let mut feed = PagedFeed::new(10, NextPagePolicy::ShortPageEnds);
    let all = posts(1..26);

    let first = feed.begin_initial().unwrap();
    assert_eq!(first, PageRequest { page: 1, limit: 10 });
    assert!(feed.is_loading());
    assert!(feed.complete(first, Ok(all[0..10].to_vec())));

    let second = feed.begin_next_page().unwrap();
    assert_eq!(second.page, 2);
    assert!(feed.is_fetching_next_page());
    assert!(feed.complete(second, Ok(all[10..20].to_vec())));
    assert!(feed.has_next_page());

    let third = feed.begin_next_page().unwrap();
    assert_eq!(third.page, 3);
    assert!(feed.complete(third, Ok(all[20..25].to_vec())));

    assert_eq!(feed.len(), 25);
    let ids: Vec<u64> = feed.items().map(|p| p.id).collect();
    assert_eq!(ids, (1..26).collect::<Vec<_>>());
    assert_eq!(feed.get(24).map(|p| p.id), Some(25));
    assert_eq!(feed.get(25), None);
    assert!(!feed.has_next_page());
    assert_eq!(feed.begin_next_page(), None);
}

#[test]
fn feed_keeps_one_request_in_flight() {
    let mut feed = PagedFeed::new(10, NextPagePolicy::ShortPageEnds);
    assert_eq!(feed.begin_next_page(), None);

    let first = feed.begin_initial().unwrap();
    assert_eq!(feed.begin_initial(), None);
    assert_eq!(feed.begin_next_page(), None);

    let stale = PageRequest { page: 2, limit: 10 };
    assert!(!feed.complete(stale, Ok(posts(11..21))));
    assert!(feed.is_empty());

    assert!(feed.complete(first, Ok(posts(1..11))));
    assert!(!feed.complete(first, Ok(posts(1..11))));
    assert_eq!(feed.len(), 10);
}

#[test]
fn failed_page_appends_nothing_and_keeps_earlier_pages() {
    let mut feed = PagedFeed::new(10, NextPagePolicy::ShortPageEnds);
    let first = feed.begin_initial().unwrap();
    feed.complete(first, Ok(posts(1..11)));

    let second = feed.begin_next_page().unwrap();
    let failure = RequestFailed::new("fake:/posts", FailureCause::Status(500));
    assert!(feed.complete(second, Err(failure.clone())));

    assert_eq!(feed.len(), 10);
    assert_eq!(feed.pages().len(), 1);
    assert_eq!(feed.error(), Some(&failure));
    assert!(feed.has_next_page());
    assert_eq!(feed.next_page_param(), 2);

    let retry = feed.begin_next_page().unwrap();
    feed.complete(retry, Ok(posts(11..21)));
    assert_eq!(feed.error(), None);
    assert_eq!(feed.len(), 20);
}

#[test]
fn unbounded_policy_always_has_a_next_page() {
    let mut feed = PagedFeed::new(10, NextPagePolicy::Unbounded);
    let first = feed.begin_initial().unwrap();
    feed.complete(first, Ok(posts(1..4)));
    assert!(feed.has_next_page());

    let next = feed.begin_next_page().unwrap();
    feed.complete(next, Ok(Vec::new()));
    assert!(feed.has_next_page());
    assert_eq!(feed.begin_next_page().map(|r| r.page), Some(3));
}

proptest! {
    #[test]
    fn accumulated_items_are_the_concatenation_of_pages(
        lens in proptest::collection::vec(0usize..=10, 1..8)
    ) {
        let mut feed = PagedFeed::new(10, NextPagePolicy::Unbounded);
        let mut expected = Vec::new();
        let mut next_id = 1u64;

        for (i, len) in lens.iter().enumerate() {
            let page = posts(next_id..next_id + *len as u64);
            next_id += *len as u64;
            expected.extend(page.iter().cloned());

            let request = if i == 0 {
                feed.begin_initial()
            } else {
                feed.begin_next_page()
            };
            let request = request.unwrap();
            prop_assert_eq!(request.page, i as u32 + 1);
            prop_assert!(feed.complete(request, Ok(page)));
        }

        let got: Vec<Post> = feed.items().cloned().collect();
        prop_assert_eq!(feed.len(), expected.len());
        prop_assert_eq!(got, expected);
    }
}

// ---- detail query ----

#[test]
fn detail_query_ignores_other_identifiers() {
    let mut query = DetailQuery::new("4");
    assert!(query.is_enabled());
    assert!(!query.complete("5", Ok(post(5))));
    assert_eq!(query.state(), &QueryState::Loading);

    assert!(query.complete("4", Ok(post(4))));
    assert_eq!(query.state(), &QueryState::Ready(post(4)));

    assert!(!DetailQuery::new("").is_enabled());
}

// ---- routes ----

#[test]
fn routes_parse_list_and_detail_paths() {
    assert_eq!(Route::parse("/"), Ok(Route::List));
    assert_eq!(Route::parse(""), Ok(Route::List));
    assert_eq!(Route::parse("/42"), Ok(Route::detail("42")));
    assert_eq!(Route::parse("/42/"), Ok(Route::detail("42")));
    assert_eq!("/abc".parse::<Route>(), Ok(Route::detail("abc")));

    assert_eq!(
        Route::parse("/a/b"),
        Err(RouteError::NotFound("/a/b".to_string()))
    );
    assert!(Route::parse("42").is_err());
    assert!(Route::parse("//").is_err());

    assert_eq!(Route::List.to_string(), "/");
    assert_eq!(Route::detail("42").to_string(), "/42");
}

// ---- config ----

#[test]
fn config_fills_defaults_and_validates() {
    let config = FeedConfig::from_json_str(r#"{ "page_size": 20, "next_page_policy": "unbounded" }"#)
        .unwrap();
    assert_eq!(config.page_size, 20);
    assert_eq!(config.next_page_policy, NextPagePolicy::Unbounded);
    assert_eq!(config.viewport_height, 24);
    assert_eq!(config.base_url, "https://jsonplaceholder.typicode.com/");

    assert!(matches!(
        FeedConfig::from_json_str(r#"{ "page_size": 0 }"#),
        Err(ConfigError::Zero { field: "page_size" })
    ));
    assert!(matches!(
        FeedConfig::from_json_str(r#"{ "base_url": "not a url" }"#),
        Err(ConfigError::BaseUrl(_))
    ));
    assert!(matches!(
        FeedConfig::from_json_str(r#"{ "page_size": "ten" }"#),
        Err(ConfigError::Parse(_))
    ));
}

// ---- http client ----

#[test]
fn http_api_builds_collection_and_item_urls() {
    let api = HttpPostApi::new(&FeedConfig::default()).unwrap();
    assert_eq!(
        api.page_url(10, 3).unwrap().as_str(),
        "https://jsonplaceholder.typicode.com/posts?_limit=10&_page=3"
    );
    assert_eq!(
        api.post_url("7").unwrap().as_str(),
        "https://jsonplaceholder.typicode.com/posts/7"
    );

    let config = FeedConfig {
        base_url: "http://localhost:8080/api".to_string(),
        ..FeedConfig::default()
    };
    let api = HttpPostApi::new(&config).unwrap();
    assert_eq!(
        api.page_url(5, 1).unwrap().as_str(),
        "http://localhost:8080/api/posts?_limit=5&_page=1"
    );
}

#[test]
fn post_ids_are_encoded_as_one_path_segment() {
    let api = HttpPostApi::new(&FeedConfig::default()).unwrap();
    assert_eq!(
        api.post_url("1?x").unwrap().as_str(),
        "https://jsonplaceholder.typicode.com/posts/1%3Fx"
    );
    assert_eq!(
        api.post_url("a b").unwrap().as_str(),
        "https://jsonplaceholder.typicode.com/posts/a%20b"
    );
}

#[test]
fn constructors_reject_invalid_config() {
    let zero_page = FeedConfig {
        page_size: 0,
        ..FeedConfig::default()
    };
    assert!(matches!(
        HttpPostApi::new(&zero_page),
        Err(ConfigError::Zero { field: "page_size" })
    ));

    let zero_viewport = FeedConfig {
        viewport_height: 0,
        ..FeedConfig::default()
    };
    assert!(matches!(
        AppShell::new(FakeApi::with_posts(1), zero_viewport),
        Err(ConfigError::Zero {
            field: "viewport_height"
        })
    ));
}

/// Serves one canned HTTP response on a local port and returns the base URL.
async fn serve_once(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let mut read = 0;
        while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf[read..]).await.unwrap();
            if n == 0 {
                break;
            }
            read += n;
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/")
}

fn local_api(base_url: String) -> HttpPostApi {
    HttpPostApi::new(&FeedConfig {
        base_url,
        request_timeout_ms: 5_000,
        ..FeedConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn http_error_status_becomes_request_failed() {
    let base = serve_once(
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
    )
    .await;
    let err = local_api(base.clone()).fetch_page(10, 1).await.unwrap_err();
    assert_eq!(err.cause, FailureCause::Status(500));
    assert_eq!(err.url, format!("{base}posts?_limit=10&_page=1"));
    assert_eq!(err.to_string(), "Network response was not ok (HTTP 500)");
}

#[tokio::test]
async fn undecodable_body_becomes_request_failed() {
    let base = serve_once(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 9\r\nconnection: close\r\n\r\nnot json!",
    )
    .await;
    let err = local_api(base).fetch_post("3").await.unwrap_err();
    assert!(matches!(err.cause, FailureCause::Body(_)), "{err:?}");
}

#[tokio::test]
async fn refused_connection_becomes_request_failed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = local_api(format!("http://{addr}/"))
        .fetch_page(10, 1)
        .await
        .unwrap_err();
    assert!(matches!(err.cause, FailureCause::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn http_posts_decode_from_a_live_response() {
    let base = serve_once(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 44\r\nconnection: close\r\n\r\n[{\"userId\":1,\"id\":1,\"title\":\"t\",\"body\":\"b\"}]",
    )
    .await;
    let page = local_api(base).fetch_page(10, 1).await.unwrap();
    assert_eq!(
        page,
        vec![Post {
            id: 1,
            title: "t".to_string(),
            body: "b".to_string(),
        }]
    );
}

#[test]
fn post_json_ignores_unknown_fields() {
    let json = r#"{ "userId": 1, "id": 3, "title": "t", "body": "b\nc" }"#;
    let post: Post = serde_json::from_str(json).unwrap();
    assert_eq!(post.id, 3);
    assert_eq!(row_height(&post), 4);
}

// ---- restoration slot ----

#[test]
fn snapshot_survives_json_and_restores_the_same_window() {
    let options = || {
        ListOptions::new(50, |_| 6)
            .with_viewport_size(24)
            .with_scroll_margin(2)
    };
    let mut list = VirtualList::new(options());
    list.measure(0, 3);
    list.measure(1, 4);
    list.apply_scroll(40);
    let snapshot = list.capture_state();

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"scroll_offset\":40"), "{json}");
    let decoded: RenderSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, snapshot);

    let restored = VirtualList::new(options().with_restore_state_from(Some(decoded)));
    assert_eq!(restored.scroll_offset(), 40);
    assert_eq!(restored.visible_range(), list.visible_range());
    assert_eq!(restored.item_size(1), Some(4));
    assert!(restored.is_measured(0));
}

#[test]
fn restoration_slot_keeps_only_the_last_snapshot() {
    let mut list = VirtualList::new(
        ListOptions::new(100, |_| 6)
            .with_viewport_size(24)
            .with_scroll_margin(2),
    );
    let mut slot = RestorationSlot::new();
    assert_eq!(slot.instance_key(), 0);
    assert!(slot.snapshot().is_none());

    list.apply_scroll(30);
    let first = list.capture_state();
    list.apply_scroll(90);
    let second = list.capture_state();

    assert_eq!(slot.store(first), 1);
    assert_eq!(slot.store(second.clone()), 2);
    assert_eq!(slot.snapshot(), Some(&second));
    assert_eq!(slot.instance_key(), 2);
}

// ---- shell ----

#[tokio::test]
async fn list_loads_the_first_page_on_mount() {
    let mut shell = shell(FakeApi::with_posts(25));
    assert_eq!(shell.render(), Screen::Loading);

    shell.open("/").await.unwrap();
    assert_eq!(shell.api().calls(), vec!["page 1"]);
    assert_eq!(shell.feed().len(), 10);

    let list = list_screen(&shell);
    assert_eq!(list.scroll_offset, 0);
    assert_eq!(list.rows[0].index, 0);
    assert_eq!(list.rows[0].key, 0);
    assert_eq!(list.rows[0].id, 1);
    assert_eq!(list.rows[0].start, 2);
    assert_eq!(list.rows[1].start, 5);
    assert!(list.rows.len() < 10);

    let text = shell.render().to_string();
    assert!(text.starts_with("Main Page\n\n1: title 1\nbody 1\n"));
}

#[tokio::test]
async fn scrolling_to_the_end_requests_pages_in_order() {
    let mut shell = shell(FakeApi::with_posts(25));
    shell.open("/").await.unwrap();
    scroll_to_bottom(&mut shell, 10).await;

    assert_eq!(shell.api().calls(), vec!["page 1", "page 2", "page 3"]);
    assert_eq!(shell.feed().len(), 25);
    let ids: Vec<u64> = shell.feed().items().map(|p| p.id).collect();
    assert_eq!(ids, (1..26).collect::<Vec<_>>());
    assert!(!shell.feed().has_next_page());

    let list = list_screen(&shell);
    assert_eq!(list.rows.last().map(|r| r.id), Some(25));
}

#[tokio::test]
async fn unbounded_policy_stops_once_the_list_stops_growing() {
    let config = FeedConfig {
        next_page_policy: NextPagePolicy::Unbounded,
        ..FeedConfig::default()
    };
    let mut shell = AppShell::new(FakeApi::with_posts(25), config).unwrap();
    shell.open("/").await.unwrap();
    scroll_to_bottom(&mut shell, 10).await;

    assert_eq!(
        shell.api().calls(),
        vec!["page 1", "page 2", "page 3", "page 4"]
    );
    assert_eq!(shell.feed().len(), 25);
    assert!(shell.feed().has_next_page());
}

#[tokio::test]
async fn activating_a_row_opens_its_detail() {
    let mut shell = shell(FakeApi::with_posts(25));
    shell.open("/").await.unwrap();

    let route = shell.activate(3).await.unwrap();
    assert_eq!(route.to_string(), "/4");
    assert_eq!(shell.current_route(), Some(&Route::detail("4")));
    assert_eq!(shell.window_scroll(), 0);
    assert_eq!(
        shell.render(),
        Screen::Detail(DetailScreen {
            id: "4".to_string(),
            title: "title 4".to_string(),
            body: "body 4".to_string(),
        })
    );
    assert_eq!(
        shell.render().to_string(),
        "Detail Page\n\n4: title 4\nbody 4"
    );
    assert_eq!(shell.api().calls(), vec!["page 1", "post 4"]);
}

#[tokio::test]
async fn activate_needs_a_mounted_list_and_an_existing_row() {
    let mut shell = shell(FakeApi::with_posts(25));
    assert_eq!(shell.activate(0).await, None);

    shell.open("/").await.unwrap();
    assert_eq!(shell.activate(99).await, None);
    assert_eq!(shell.navigator().restoration().instance_key(), 0);
}

#[tokio::test]
async fn returning_to_the_list_restores_the_scroll_position() {
    let mut shell = shell(FakeApi::with_posts(100));
    shell.open("/").await.unwrap();
    scroll_to_bottom(&mut shell, 2).await;
    shell.scroll_to(30).await;

    let before = shell.window_scroll();
    assert!(before > 0);
    let rows_before = list_screen(&shell).rows;
    let picked = rows_before[2].clone();
    let pages_before = shell.feed().pages().len();

    shell.activate(picked.index).await.unwrap();
    assert_eq!(shell.navigator().restoration().instance_key(), 1);
    assert_eq!(
        shell.navigator().restoration().snapshot().map(|s| s.scroll_offset()),
        Some(before)
    );

    assert!(shell.back().await);
    assert_eq!(shell.current_route(), Some(&Route::List));
    assert_eq!(shell.window_scroll(), before);
    assert_eq!(list_screen(&shell).rows, rows_before);
    assert_eq!(shell.feed().pages().len(), pages_before);
    match shell.view() {
        ActiveView::List(list) => assert_eq!(list.instance_key(), 1),
        other => panic!("expected the list view, got {other:?}"),
    }
}

#[tokio::test]
async fn second_activation_replaces_the_stored_snapshot() {
    let mut shell = shell(FakeApi::with_posts(100));
    shell.open("/").await.unwrap();
    scroll_to_bottom(&mut shell, 2).await;

    shell.scroll_to(10).await;
    let first_row = list_screen(&shell).rows[1].index;
    shell.activate(first_row).await.unwrap();
    shell.back().await;

    shell.scroll_to(30).await;
    let second_offset = shell.window_scroll();
    let second_row = list_screen(&shell).rows[1].index;
    shell.activate(second_row).await.unwrap();

    let slot = shell.navigator().restoration();
    assert_eq!(slot.instance_key(), 2);
    assert_eq!(slot.snapshot().map(|s| s.scroll_offset()), Some(second_offset));

    shell.back().await;
    assert_eq!(shell.window_scroll(), second_offset);
}

#[tokio::test]
async fn reopening_the_list_without_activation_keeps_the_live_view() {
    let mut shell = shell(FakeApi::with_posts(100));
    shell.open("/").await.unwrap();
    scroll_to_bottom(&mut shell, 2).await;
    shell.scroll_to(12).await;
    let offset = shell.window_scroll();
    let calls = shell.api().calls();

    shell.open("/").await.unwrap();
    assert_eq!(shell.window_scroll(), offset);
    assert_eq!(shell.api().calls(), calls);
    match shell.view() {
        ActiveView::List(list) => assert_eq!(list.instance_key(), 0),
        other => panic!("expected the list view, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_first_page_shows_an_error_and_no_rows() {
    let mut shell = shell(FakeApi::with_posts(25).failing_page(1));
    shell.open("/").await.unwrap();

    let screen = shell.render();
    assert!(matches!(screen, Screen::Error(_)));
    assert_eq!(
        screen.to_string(),
        "Error: Network response was not ok (HTTP 500)"
    );
    assert!(shell.feed().is_empty());
    assert_eq!(shell.api().calls(), vec!["page 1"]);
}

#[tokio::test]
async fn failing_later_page_keeps_loaded_rows_and_does_not_retry() {
    let mut shell = shell(FakeApi::with_posts(25).failing_page(2));
    shell.open("/").await.unwrap();
    scroll_to_bottom(&mut shell, 5).await;

    assert_eq!(shell.api().calls(), vec!["page 1", "page 2"]);
    assert_eq!(shell.feed().len(), 10);
    let list = list_screen(&shell);
    assert!(!list.rows.is_empty());
    assert_eq!(
        list.error.as_deref(),
        Some("Network response was not ok (HTTP 500)")
    );
    assert!(shell.render().to_string().ends_with("Error: Network response was not ok (HTTP 500)\n"));
}

#[tokio::test]
async fn failing_detail_shows_an_error_instead_of_the_post() {
    let mut shell = shell(FakeApi::with_posts(25).failing_post("4"));
    shell.open("/4").await.unwrap();
    assert_eq!(
        shell.render(),
        Screen::Error("Network response was not ok (HTTP 500)".to_string())
    );

    shell.open("/999").await.unwrap();
    assert_eq!(
        shell.render().to_string(),
        "Error: Network response was not ok (HTTP 404)"
    );
}

#[tokio::test]
async fn detail_opened_directly_then_back_mounts_the_list() {
    let mut shell = shell(FakeApi::with_posts(25));
    assert!(!shell.back().await);
    assert!(shell.open("/a/b").await.is_err());

    shell.open("/").await.unwrap();
    shell.open("/7").await.unwrap();
    assert_eq!(shell.navigator().history().len(), 2);

    assert!(shell.back().await);
    assert_eq!(shell.window_scroll(), 0);
    assert!(matches!(shell.render(), Screen::List(_)));
    assert!(!shell.back().await);
}
