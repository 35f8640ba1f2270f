//! Codewall engine: fetching, highlighting, rasterization and the display pipeline.
mod decode;
pub mod display;
mod engine;
mod fetch;
mod highlight;
mod palette;
mod persist;
mod raster;
mod render;
mod types;

pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::{render_request, EngineConfig, EngineHandle};
pub use fetch::{
    is_plain_text, raw_content_url, ChannelProgressSink, FetchSettings, Fetcher, ProgressSink,
    ReqwestFetcher, PLAIN_TEXT_PREFIX, RAW_GITHUB_ORIGIN,
};
pub use highlight::{
    HighlightError, HighlightedSource, Highlighter, SyntectHighlighter, Token, TokenClass,
};
pub use palette::{stylesheet, Palette, Rgb};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use raster::{
    layout_runs, GlyphRasterizer, PlacedGlyph, RasterError, Rasterizer, TextLayout,
    MAX_TEXTURE_HEIGHT, PADDING,
};
pub use render::{
    collapse_whitespace, escape_html, is_run_visible, ContentRenderer, RenderedContent,
};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, FetchProgress,
    FetchedText, RenderError, RenderOutput, RequestId,
};
