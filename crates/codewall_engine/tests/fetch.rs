use std::sync::{Arc, Mutex};
use std::time::Duration;

use codewall_engine::{
    EngineEvent, FailureKind, FetchProgress, FetchSettings, Fetcher, ProgressSink, ReqwestFetcher,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn settings_for(server: &MockServer) -> FetchSettings {
    FetchSettings {
        raw_github_origin: server.uri(),
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn fetcher_returns_plain_text_and_emits_progress() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/main.rs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("fn main() {}\n", "text/plain; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let sink = TestSink::new();
    let url = format!("{}/main.rs", server.uri());

    let output = fetcher.fetch(1, &url, &sink).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.requested_url, url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(output.bytes, b"fn main() {}\n");
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/plain"));

    let progress = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(FetchProgress { bytes, .. }) => Some(bytes),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&13));
}

#[tokio::test]
async fn non_200_status_is_reported_with_the_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(7, &url, &TestSink::new()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "Check your URL, server returned status 404.");
}

#[tokio::test]
async fn other_success_codes_are_rejected_too() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/empty", server.uri());

    let err = fetcher.fetch(8, &url, &TestSink::new()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(204));
}

#[tokio::test]
async fn html_is_not_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/page", server.uri());

    let err = fetcher.fetch(3, &url, &TestSink::new()).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "text/html".to_string()
        }
    );
    assert_eq!(
        err.message,
        "This doesn't appear to be a text file. Expected text/plain, received text/html."
    );
}

#[tokio::test]
async fn binary_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/bare", server.uri());

    let err = fetcher.fetch(4, &url, &TestSink::new()).await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::UnsupportedContentType { .. }
    ));
}

#[tokio::test]
async fn status_is_checked_before_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("<h1>oops</h1>", "text/html"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let url = format!("{}/gone", server.uri());

    let err = fetcher.fetch(5, &url, &TestSink::new()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn github_blob_urls_are_fetched_from_raw_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repo/main/file.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("raw", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(settings_for(&server));
    let url = "https://github.com/user/repo/blob/main/file.txt";

    let output = fetcher.fetch(6, url, &TestSink::new()).await.expect("fetch ok");
    assert_eq!(output.bytes, b"raw");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(
        output.metadata.requested_url,
        format!("{}/user/repo/main/file.txt", server.uri())
    );
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("slow", "text/plain"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(2, &url, &TestSink::new()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("x".repeat(64), "text/plain"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 16,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch(9, &url, &TestSink::new()).await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 16, .. }
    ));
}

#[tokio::test]
async fn unparseable_url_is_invalid() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher
        .fetch(10, "not a url", &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
