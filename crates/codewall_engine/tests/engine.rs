use std::sync::Arc;
use std::time::{Duration, Instant};

use codewall_core::{Aesthetic, RenderRequest, StyleClass, Viewport};
use codewall_engine::{
    ContentRenderer, EngineEvent, EngineHandle, FailureKind, FetchSettings, Fetcher,
    RasterError, Rasterizer, RenderedContent, ReqwestFetcher, SyntectHighlighter,
};
use image::{Rgba, RgbaImage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FlatRasterizer;

impl Rasterizer for FlatRasterizer {
    fn rasterize(&self, _: &RenderedContent, width: u32) -> Result<RgbaImage, RasterError> {
        Ok(RgbaImage::from_pixel(width, 10, Rgba([0, 0, 0, 255])))
    }
}

fn engine(rasterizer: Option<Arc<dyn Rasterizer>>) -> EngineHandle {
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let renderer = ContentRenderer::new(Arc::new(SyntectHighlighter::new()));
    EngineHandle::with_parts(fetcher, renderer, rasterizer)
}

/// Waits for the first event that is not fetch progress.
fn next_completion(engine: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        match engine.recv_timeout(Duration::from_millis(100)) {
            Some(EngineEvent::Progress(_)) | None => continue,
            Some(event) => return event,
        }
    }
    panic!("engine produced no completion");
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_completes_with_decoded_text() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin1.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"caf\xE9".to_vec(),
            "text/plain; charset=iso-8859-1",
        ))
        .mount(&server)
        .await;

    let engine = engine(None);
    engine.fetch(11, format!("{}/latin1.txt", server.uri()));

    let event = tokio::task::spawn_blocking(move || next_completion(&engine))
        .await
        .unwrap();
    match event {
        EngineEvent::FetchCompleted { request_id, result } => {
            assert_eq!(request_id, 11);
            let fetched = result.expect("fetch ok");
            assert_eq!(fetched.text, "café");
            assert_eq!(fetched.encoding_label, "windows-1252");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_failure_carries_the_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nope"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let engine = engine(None);
    engine.fetch(12, format!("{}/nope", server.uri()));

    let event = tokio::task::spawn_blocking(move || next_completion(&engine))
        .await
        .unwrap();
    match event {
        EngineEvent::FetchCompleted { request_id, result } => {
            assert_eq!(request_id, 12);
            let err = result.unwrap_err();
            assert_eq!(err.kind, FailureKind::HttpStatus(403));
            assert_eq!(err.to_string(), "Check your URL, server returned status 403.");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn render_completes_with_texture_when_display_is_available() {
    let engine = engine(Some(Arc::new(FlatRasterizer)));
    assert!(engine.display_available());

    engine.render(RenderRequest {
        request_id: 21,
        text: "fn main() {}".to_string(),
        source_url: Some("main.rs".to_string()),
        style: StyleClass::Venturis,
        aesthetic: Aesthetic::Ntef,
        font_size: 12,
        hide_comments: false,
        viewport: Viewport {
            width: 200,
            height: 100,
        },
    });

    match next_completion(&engine) {
        EngineEvent::RenderCompleted { request_id, result } => {
            assert_eq!(request_id, 21);
            let output = result.expect("render ok");
            assert_eq!(output.content.language, "Rust");
            assert_eq!(output.content.aesthetic, Aesthetic::Ntef);
            assert_eq!(output.texture.map(|t| t.width()), Some(200));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn markup_only_engine_reports_no_display() {
    let engine = engine(None);
    assert!(!engine.display_available());

    engine.render(RenderRequest {
        request_id: 22,
        text: "plain words".to_string(),
        source_url: None,
        style: StyleClass::Delos,
        aesthetic: Aesthetic::Gibson,
        font_size: 16,
        hide_comments: false,
        viewport: Viewport::default(),
    });

    match next_completion(&engine) {
        EngineEvent::RenderCompleted { result, .. } => {
            assert!(result.expect("render ok").texture.is_none());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn polling_clone_does_not_starve_other_consumers() {
    let engine = engine(None);
    let poller = engine.clone();
    let stop = Instant::now() + Duration::from_millis(300);
    let worker = std::thread::spawn(move || {
        while Instant::now() < stop {
            let _ = poller.recv_timeout(Duration::from_millis(20));
        }
    });

    std::thread::sleep(Duration::from_millis(50));
    let started = Instant::now();
    assert!(engine.try_recv().is_none());
    assert!(started.elapsed() < Duration::from_secs(2));
    worker.join().unwrap();
}
