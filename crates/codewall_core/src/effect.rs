use crate::{Aesthetic, RequestId, StyleClass, Viewport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { request_id: RequestId, url: String },
    Render(RenderRequest),
    ResizeDisplay { width: u32, height: u32 },
}

/// Everything the renderer needs, captured from live state when the effect is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub request_id: RequestId,
    pub text: String,
    pub source_url: Option<String>,
    pub style: StyleClass,
    pub aesthetic: Aesthetic,
    pub font_size: u32,
    pub hide_comments: bool,
    pub viewport: Viewport,
}
