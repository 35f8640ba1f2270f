use std::fmt;

use image::RgbaImage;

use crate::render::RenderedContent;
use crate::{HighlightError, RasterError};

pub type RequestId = codewall_core::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchProgress {
    pub request_id: RequestId,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Progress(FetchProgress),
    FetchCompleted {
        request_id: RequestId,
        result: Result<FetchedText, FetchError>,
    },
    RenderCompleted {
        request_id: RequestId,
        result: Result<RenderOutput, RenderError>,
    },
}

/// Raw response body plus what we learned while fetching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    /// URL as submitted by the user.
    pub original_url: String,
    /// URL actually requested after the raw-content rewrite.
    pub requested_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// Decoded text of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedText {
    pub text: String,
    pub encoding_label: String,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FailureKind,
    /// User-facing message, shown verbatim on the error panel.
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Server answered with a status other than 200.
    HttpStatus(u16),
    /// Declared content type is missing or not plain text.
    UnsupportedContentType { content_type: String },
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Transport,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Transport => write!(f, "network error"),
        }
    }
}

/// Rendered markup and, when the display pipeline is available, its raster.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub content: RenderedContent,
    pub texture: Option<RgbaImage>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Highlight(#[from] HighlightError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("render worker failed: {0}")]
    Worker(String),
}
