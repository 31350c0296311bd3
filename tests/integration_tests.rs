//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: scroll signal → HTTP request → appended markup

use pretty_assertions::assert_eq;
use scroll_pager::driver;
use scroll_pager::http::{HttpClient, HttpClientConfig};
use scroll_pager::{
    ControllerConfig, FallbackPolicy, FeedConfig, HtmlBuffer, HttpFeedSource, ManualClock,
    PaginationController, PaginationState, Phase, ScrollMetrics,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Controller = PaginationController<HttpFeedSource, HtmlBuffer, ManualClock>;

fn source(server: &MockServer, path: &str) -> HttpFeedSource {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_millis(500))
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();
    HttpFeedSource::new(client, &format!("{}{path}", server.uri())).unwrap()
}

fn controller(server: &MockServer, config: &ControllerConfig, clock: &ManualClock) -> Controller {
    PaginationController::with_clock(
        Arc::new(source(server, "/posts/")),
        HtmlBuffer::with_content("<li>first</li>"),
        config,
        clock.clone(),
    )
}

fn near_bottom() -> ScrollMetrics {
    // 100px from the bottom, inside the default 150px threshold
    ScrollMetrics::new(1100.0, 800.0, 2000.0)
}

fn far_from_bottom() -> ScrollMetrics {
    ScrollMetrics::new(0.0, 800.0, 2000.0)
}

async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("page", page))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_scroll_near_bottom_loads_next_page() {
    let server = MockServer::start().await;
    mount_page(&server, "2", json!({"html": "<li>A</li>", "has_next": true})).await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    let phase = controller.handle_scroll(&near_bottom()).await;

    assert_eq!(phase, Phase::Idle);
    assert_eq!(*controller.state(), PaginationState::new(2, true));
    assert_eq!(controller.container().html(), "<li>first</li><li>A</li>");
    assert!(controller.is_listening());
}

#[tokio::test]
async fn test_last_page_detaches_listener() {
    let server = MockServer::start().await;
    mount_page(&server, "2", json!({"html": "", "has_next": false})).await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    let phase = controller.handle_scroll(&near_bottom()).await;

    assert_eq!(phase, Phase::Exhausted);
    assert!(!controller.state().has_next);
    assert!(!controller.is_listening());
    assert_eq!(controller.container().fragments(), ["<li>first</li>"]);

    // Further scrolling issues nothing
    clock.advance(Duration::from_secs(1));
    assert!(controller.on_scroll_signal(&near_bottom()).is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_transient_failure_keeps_state_and_retries_same_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "2", json!({"html": "<li>A</li>", "has_next": true})).await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    let phase = controller.handle_scroll(&near_bottom()).await;
    assert_eq!(phase, Phase::Idle);
    assert_eq!(*controller.state(), PaginationState::new(1, true));
    assert_eq!(controller.stats().failures, 1);

    clock.advance(Duration::from_millis(200));
    controller.handle_scroll(&near_bottom()).await;

    assert_eq!(*controller.state(), PaginationState::new(2, true));
    assert_eq!(controller.container().html(), "<li>first</li><li>A</li>");
}

#[tokio::test]
async fn test_timeout_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"html": "<li>late</li>", "has_next": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    let phase = controller.request_next_page().await;

    assert_eq!(phase, Phase::Idle);
    assert_eq!(*controller.state(), PaginationState::new(1, true));
    assert_eq!(controller.container().len(), 1);
}

#[tokio::test]
async fn test_server_page_overrides_increment() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "2",
        json!({"html": "<li>B</li>", "has_next": true, "page": 7}),
    )
    .await;
    mount_page(&server, "8", json!({"html": "<li>C</li>", "has_next": false})).await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    controller.handle_scroll(&near_bottom()).await;
    assert_eq!(controller.state().current_page, 7);

    clock.advance(Duration::from_millis(250));
    let phase = controller.handle_scroll(&near_bottom()).await;

    assert_eq!(phase, Phase::Exhausted);
    assert_eq!(controller.state().current_page, 8);
    assert_eq!(
        controller.container().html(),
        "<li>first</li><li>B</li><li>C</li>"
    );
}

#[tokio::test]
async fn test_signals_inside_throttle_window_evaluate_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"html": "<li>A</li>", "has_next": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    controller.handle_scroll(&near_bottom()).await;
    clock.advance(Duration::from_millis(50));
    let phase = controller.handle_scroll(&near_bottom()).await;

    assert_eq!(phase, Phase::Idle);
    assert_eq!(controller.state().current_page, 2);
    assert_eq!(controller.stats().requests, 1);
}

#[tokio::test]
async fn test_signal_far_from_bottom_does_nothing() {
    let server = MockServer::start().await;
    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    assert!(controller.on_scroll_signal(&far_from_bottom()).is_none());
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_body_exhausts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    assert_eq!(controller.request_next_page().await, Phase::Exhausted);
    assert_eq!(controller.state().current_page, 1);
}

// ============================================================================
// Fallback policy
// ============================================================================

#[tokio::test]
async fn test_markup_fallback_appends_and_stays_open() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("page", "2"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<not json>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("page", "2"))
        .and(header("Accept", "text/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<li>raw</li>"))
        .expect(1)
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let config = ControllerConfig::new().fallback(FallbackPolicy::Markup);
    let mut controller = controller(&server, &config, &clock);

    let phase = controller.handle_scroll(&near_bottom()).await;

    assert_eq!(phase, Phase::Idle);
    assert_eq!(*controller.state(), PaginationState::new(2, true));
    assert_eq!(controller.container().html(), "<li>first</li><li>raw</li>");
    assert_eq!(controller.stats().fallback_requests, 1);
}

#[tokio::test]
async fn test_markup_fallback_blank_body_exhausts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(header("Accept", "text/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let config = ControllerConfig::new().fallback(FallbackPolicy::Markup);
    let mut controller = controller(&server, &config, &clock);

    assert_eq!(controller.request_next_page().await, Phase::Exhausted);
    assert_eq!(controller.state().current_page, 1);
    assert!(!controller.is_listening());
}

#[tokio::test]
async fn test_malformed_json_without_fallback_exhausts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2, 3]"))
        .expect(1)
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let mut controller = controller(&server, &ControllerConfig::new(), &clock);

    assert_eq!(controller.request_next_page().await, Phase::Exhausted);
    assert_eq!(controller.stats().failures, 1);
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn test_existing_query_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/board/"))
        .and(query_param("category", "news"))
        .and(query_param("page", "4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"html": "<li>n</li>", "has_next": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let config = ControllerConfig::new().initial(3, true);
    let mut controller = PaginationController::with_clock(
        Arc::new(source(&server, "/board/?category=news&page=3")),
        HtmlBuffer::new(),
        &config,
        clock,
    );

    controller.request_next_page().await;
    assert_eq!(controller.state().current_page, 4);
}

#[tokio::test]
async fn test_initial_last_page_never_requests() {
    let server = MockServer::start().await;
    let clock = ManualClock::new();
    let config = ControllerConfig::new().initial(5, false);
    let mut controller = controller(&server, &config, &clock);

    assert!(!controller.is_listening());
    assert_eq!(controller.request_next_page().await, Phase::Exhausted);
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Driver and config
// ============================================================================

#[tokio::test]
async fn test_drain_from_config_until_exhausted() {
    let server = MockServer::start().await;
    mount_page(&server, "2", json!({"html": "<li>2</li>", "has_next": true})).await;
    mount_page(&server, "3", json!({"html": "<li>3</li>", "has_next": true, "page": "3"})).await;
    mount_page(&server, "4", json!({"html": "<li>4</li>", "has_next": 0})).await;

    let yaml = format!(
        "endpoint: {}/posts/\nthrottle_ms: 10\nhttp:\n  rate_limit: null\n",
        server.uri()
    );
    let config = FeedConfig::from_yaml_str(&yaml).unwrap();
    let source = Arc::new(config.build_source().unwrap());
    let mut controller =
        PaginationController::new(source, HtmlBuffer::new(), &config.controller_config());

    let (tx, rx) = mpsc::channel(8);
    let producer = tokio::spawn(async move {
        while tx
            .send(ScrollMetrics::at_bottom(800.0, 2000.0))
            .await
            .is_ok()
        {
            tokio::time::sleep(Duration::from_millis(15)).await;
        }
    });

    let stats = tokio::time::timeout(Duration::from_secs(10), driver::run(&mut controller, rx))
        .await
        .unwrap();
    producer.abort();

    assert_eq!(stats.requests, 3);
    assert_eq!(stats.pages_loaded, 3);
    assert_eq!(controller.phase(), Phase::Exhausted);
    assert_eq!(controller.state().current_page, 4);
    assert_eq!(controller.container().html(), "<li>2</li><li>3</li><li>4</li>");
}
