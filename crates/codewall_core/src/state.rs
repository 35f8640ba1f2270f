use crate::view_model::AppViewModel;
use crate::{container_class, Aesthetic, OptionSet, RenderRequest};

pub type RequestId = u64;

pub const DEFAULT_PERMALINK_BASE: &str = "http://localhost:8000/";

/// Which panel of the page is in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    /// Awaiting URL input.
    #[default]
    Form,
    /// A fetch or a redraw is in flight.
    Loading,
    /// Content rendered.
    Content,
    /// Fetch or render failed.
    Error,
}

/// What the in-flight request is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Rendering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub(crate) request_id: RequestId,
    pub(crate) stage: Stage,
    /// True for a redraw of cached text (no fetch involved).
    pub(crate) redraw: bool,
}

/// Values that outlive a single request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Text of the last successful fetch.
    pub current_text: Option<String>,
    /// URL of the last successful fetch.
    pub current_url: Option<String>,
    /// The display pipeline has presented content at least once.
    pub display_running: bool,
    /// Cached hide-comments flag, consulted at the next render.
    pub hide_comments: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) panel: Panel,
    pub(crate) session: SessionState,
    pub(crate) options: OptionSet,
    pub(crate) url_input: String,
    pub(crate) pending_url: Option<String>,
    pub(crate) in_flight: Option<InFlight>,
    pub(crate) next_request_id: RequestId,
    pub(crate) loading_bytes: Option<u64>,
    pub(crate) error_message: Option<String>,
    pub(crate) notice: Option<String>,
    pub(crate) reset_visible: bool,
    pub(crate) redraw_visible: bool,
    /// Options or viewport changed after the in-flight render was captured.
    pub(crate) pending_changes: bool,
    /// Aesthetic captured by the in-flight render.
    pub(crate) rendering_aesthetic: Option<Aesthetic>,
    pub(crate) content_visible: bool,
    pub(crate) language: Option<String>,
    /// Aesthetic of the frame currently on the display.
    pub(crate) presented_aesthetic: Option<Aesthetic>,
    pub(crate) permalink_base: String,
    pub(crate) permalink: Option<String>,
    pub(crate) viewport: Viewport,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            panel: Panel::default(),
            session: SessionState::default(),
            options: OptionSet::default(),
            url_input: String::new(),
            pending_url: None,
            in_flight: None,
            next_request_id: 1,
            loading_bytes: None,
            error_message: None,
            notice: None,
            reset_visible: false,
            redraw_visible: false,
            pending_changes: false,
            rendering_aesthetic: None,
            content_visible: false,
            language: None,
            presented_aesthetic: None,
            permalink_base: DEFAULT_PERMALINK_BASE.to_string(),
            permalink: None,
            viewport: Viewport::default(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page address used when generating permalinks.
    pub fn with_permalink_base(mut self, base: impl Into<String>) -> Self {
        self.permalink_base = base.into();
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn view(&self) -> AppViewModel {
        let loading_label = self
            .in_flight
            .map(|in_flight| match (in_flight.stage, in_flight.redraw) {
                (_, true) => "Redrawing...".to_string(),
                (Stage::Fetching, false) => match self.loading_bytes {
                    Some(bytes) => format!("Fetching... {bytes} bytes"),
                    None => "Fetching...".to_string(),
                },
                (Stage::Rendering, false) => "Rendering...".to_string(),
            });

        AppViewModel {
            panel: self.panel,
            url_input: self.url_input.clone(),
            loading_label,
            error_message: self.error_message.clone(),
            notice: self.notice.clone(),
            reset_visible: self.reset_visible,
            redraw_visible: self.redraw_visible,
            options_visible: !self.options.hide_options,
            canvas_visible: self.session.display_running,
            content_visible: self.content_visible,
            options: self.options,
            container_class: container_class(self.options.style, self.session.hide_comments),
            container_style: format!("font-size: {}px;", self.options.font_size),
            current_url: self.session.current_url.clone(),
            language: self.language.clone(),
            presented_aesthetic: self.presented_aesthetic,
            permalink: self.permalink.clone(),
            viewport: self.viewport,
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the view changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn allocate_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// True when `request_id` is the in-flight request and it is at `stage`.
    pub(crate) fn is_current(&self, request_id: RequestId, stage: Stage) -> bool {
        matches!(
            self.in_flight,
            Some(in_flight) if in_flight.request_id == request_id && in_flight.stage == stage
        )
    }

    /// Snapshot of live options for rendering `text`.
    /// Captures live options into a render request.
    pub(crate) fn render_request(&mut self, request_id: RequestId, text: String) -> RenderRequest {
        self.pending_changes = false;
        self.rendering_aesthetic = Some(self.options.aesthetic);
        RenderRequest {
            request_id,
            text,
            source_url: self.session.current_url.clone(),
            style: self.options.style,
            aesthetic: self.options.aesthetic,
            font_size: self.options.font_size,
            hide_comments: self.session.hide_comments,
            viewport: self.viewport,
        }
    }
}
