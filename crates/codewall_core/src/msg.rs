#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// User submitted the current URL input.
    UrlSubmitted,
    /// Page loaded with a query string; pre-fills controls and may auto-submit.
    Bootstrap(String),
    /// Body bytes received so far for the in-flight fetch.
    FetchProgress {
        request_id: crate::RequestId,
        bytes: u64,
    },
    /// Engine fetched and decoded the requested file.
    FetchSucceeded {
        request_id: crate::RequestId,
        text: String,
    },
    /// Engine failed to fetch or decode; `message` is shown verbatim.
    FetchFailed {
        request_id: crate::RequestId,
        message: String,
    },
    /// Rendered content is visible. `rasterized` is false when the display
    /// pipeline is unavailable and the markup is shown directly.
    ContentPresented {
        request_id: crate::RequestId,
        language: String,
        rasterized: bool,
    },
    /// Highlighting or rasterization failed.
    RenderFailed {
        request_id: crate::RequestId,
        message: String,
    },
    /// User clicked "try again" on the error panel.
    TryAgainClicked,
    /// User clicked Reset.
    ResetClicked,
    /// User clicked Redraw.
    RedrawClicked,
    /// A named control changed value.
    ControlChanged { name: String, value: String },
    /// Viewport was resized.
    Resized { width: u32, height: u32 },
    /// Host tick to coalesce rendering.
    Tick,
}
