use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use codewall_core::RenderRequest;
use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::decode::decode_text;
use crate::fetch::{ChannelProgressSink, FetchSettings, Fetcher, ReqwestFetcher};
use crate::raster::{GlyphRasterizer, Rasterizer};
use crate::render::ContentRenderer;
use crate::{
    EngineEvent, FailureKind, FetchError, FetchedText, RenderError, RenderOutput, RequestId,
    SyntectHighlighter,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    /// Font for the rasterizer; system fonts are searched when unset.
    pub font_path: Option<PathBuf>,
    /// When false, content is rendered to markup only and never rasterized.
    pub display_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            font_path: None,
            display_enabled: true,
        }
    }
}

enum EngineCommand {
    Fetch { request_id: RequestId, url: String },
    Render(Box<RenderRequest>),
}

#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    display_available: bool,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch));
        let renderer = ContentRenderer::new(Arc::new(SyntectHighlighter::new()));
        let rasterizer = if config.display_enabled {
            match GlyphRasterizer::load(config.font_path.as_deref()) {
                Ok(rasterizer) => Some(Arc::new(rasterizer) as Arc<dyn Rasterizer>),
                Err(err) => {
                    engine_warn!("Display disabled: {err}");
                    None
                }
            }
        } else {
            engine_info!("Display disabled by configuration");
            None
        };
        Self::with_parts(fetcher, renderer, rasterizer)
    }

    /// Builds an engine from explicit parts; `None` disables rasterization.
    pub fn with_parts(
        fetcher: Arc<dyn Fetcher>,
        renderer: ContentRenderer,
        rasterizer: Option<Arc<dyn Rasterizer>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let display_available = rasterizer.is_some();
        let renderer = Arc::new(renderer);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let event_tx = event_tx.clone();
                match command {
                    EngineCommand::Fetch { request_id, url } => {
                        let fetcher = fetcher.clone();
                        runtime.spawn(async move {
                            handle_fetch(fetcher.as_ref(), request_id, url, event_tx).await;
                        });
                    }
                    EngineCommand::Render(request) => {
                        let renderer = renderer.clone();
                        let rasterizer = rasterizer.clone();
                        runtime.spawn(async move {
                            handle_render(renderer, rasterizer, *request, event_tx).await;
                        });
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            display_available,
        }
    }

    /// Whether rendered content comes back with a texture.
    pub fn display_available(&self) -> bool {
        self.display_available
    }

    pub fn fetch(&self, request_id: RequestId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch {
            request_id,
            url: url.into(),
        });
    }

    pub fn render(&self, request: RenderRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Render(Box::new(request)));
    }

    /// Clones share one event queue; each event goes to whichever caller
    /// takes it first.
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Waits up to `timeout` for an event. Other clones wait at most as long
    /// for the queue.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn handle_fetch(
    fetcher: &dyn Fetcher,
    request_id: RequestId,
    url: String,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelProgressSink::new(event_tx.clone());
    let result = match fetcher.fetch(request_id, &url, &sink).await {
        Ok(output) => decode_text(&output.bytes, output.metadata.content_type.as_deref())
            .map(|decoded| {
                engine_debug!("request {request_id}: decoded as {}", decoded.encoding_label);
                FetchedText {
                    text: decoded.text,
                    encoding_label: decoded.encoding_label,
                    metadata: output.metadata,
                }
            })
            .map_err(|err| {
                FetchError::new(
                    FailureKind::Decode,
                    format!("This file could not be read as text ({err})."),
                )
            }),
        Err(err) => Err(err),
    };
    if let Err(err) = &result {
        engine_warn!("request {request_id}: fetch failed ({}): {}", err.kind, err.message);
    }
    let _ = event_tx.send(EngineEvent::FetchCompleted { request_id, result });
}

async fn handle_render(
    renderer: Arc<ContentRenderer>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
    request: RenderRequest,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let request_id = request.request_id;
    let result = tokio::task::spawn_blocking(move || {
        render_request(&renderer, rasterizer.as_deref(), &request)
    })
    .await
    .unwrap_or_else(|err| Err(RenderError::Worker(err.to_string())));

    match &result {
        Ok(output) => engine_info!(
            "request {request_id}: rendered {} source{}",
            output.content.language,
            if output.texture.is_some() { " and texture" } else { "" }
        ),
        Err(err) => engine_warn!("request {request_id}: render failed: {err}"),
    }
    let _ = event_tx.send(EngineEvent::RenderCompleted { request_id, result });
}

/// Renders markup and, when a rasterizer is given, the texture for it.
pub fn render_request(
    renderer: &ContentRenderer,
    rasterizer: Option<&dyn Rasterizer>,
    request: &RenderRequest,
) -> Result<RenderOutput, RenderError> {
    let content = renderer.render(request)?;
    let texture = rasterizer
        .map(|rasterizer| rasterizer.rasterize(&content, request.viewport.width))
        .transpose()?;
    Ok(RenderOutput { content, texture })
}
