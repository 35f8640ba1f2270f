use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use codewall_core::{Effect, Msg, Viewport};
use codewall_engine::display::SharedDisplay;
use codewall_engine::{EngineEvent, EngineHandle, RenderOutput, RenderedContent};
use engine_logging::{engine_info, engine_warn};

use super::app::Inbound;

const EVENT_POLL: Duration = Duration::from_millis(50);

/// Executes core effects against the engine and the display, and turns
/// engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    display: SharedDisplay,
    /// Latest rendered content, shown in the page's content container.
    content: Option<RenderedContent>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        display: SharedDisplay,
        inbound: mpsc::Sender<Inbound>,
    ) -> Self {
        let runner = Self {
            engine,
            display,
            content: None,
        };
        runner.spawn_event_forwarder(inbound);
        runner
    }

    pub fn content(&self) -> Option<&RenderedContent> {
        self.content.as_ref()
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Fetch { request_id, url } => {
                    engine_info!("Fetch request_id={} url={}", request_id, url);
                    self.engine.fetch(request_id, url);
                }
                Effect::Render(request) => {
                    engine_info!(
                        "Render request_id={} style={} aesthetic={} font_size={} hide_comments={}",
                        request.request_id,
                        request.style,
                        request.aesthetic,
                        request.font_size,
                        request.hide_comments
                    );
                    self.engine.render(request);
                }
                Effect::ResizeDisplay { width, height } => {
                    self.display
                        .lock()
                        .expect("lock display")
                        .resize(Viewport { width, height });
                }
            }
        }
    }

    /// Maps an engine event to a message. Rendered output is made visible
    /// (content container, then display texture) before `ContentPresented`.
    pub fn handle_event(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::Progress(progress) => Msg::FetchProgress {
                request_id: progress.request_id,
                bytes: progress.bytes,
            },
            EngineEvent::FetchCompleted { request_id, result } => match result {
                Ok(fetched) => Msg::FetchSucceeded {
                    request_id,
                    text: fetched.text,
                },
                Err(err) => {
                    engine_warn!("Request {} failed: {}", request_id, err.kind);
                    Msg::FetchFailed {
                        request_id,
                        message: err.message,
                    }
                }
            },
            EngineEvent::RenderCompleted { request_id, result } => match result {
                Ok(RenderOutput { content, texture }) => {
                    let language = content.language.clone();
                    let aesthetic = content.aesthetic;
                    self.content = Some(content);
                    let rasterized = match texture {
                        Some(texture) => {
                            self.display
                                .lock()
                                .expect("lock display")
                                .present(texture, aesthetic);
                            true
                        }
                        None => false,
                    };
                    Msg::ContentPresented {
                        request_id,
                        language,
                        rasterized,
                    }
                }
                Err(err) => Msg::RenderFailed {
                    request_id,
                    message: err.to_string(),
                },
            },
        }
    }

    fn spawn_event_forwarder(&self, inbound: mpsc::Sender<Inbound>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(EVENT_POLL) else {
                continue;
            };
            if inbound.send(Inbound::Engine(event)).is_err() {
                break;
            }
        });
    }
}
