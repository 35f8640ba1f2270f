//! Software rasterizer turning rendered content into a texture.
//!
//! Glyphs are rendered with fontdue and alpha-blended onto an RGBA buffer
//! filled with the style's background color. Text flows as one paragraph
//! (whitespace is already collapsed) wrapped at the viewport width.

use std::collections::HashMap;
use std::path::Path;

use engine_logging::{engine_debug, engine_info, engine_warn};
use fontdue::{Font, FontSettings, Metrics};
use image::{Rgba, RgbaImage};

use crate::palette::{Palette, Rgb};
use crate::render::{is_run_visible, RenderedContent};
use crate::{Token, TokenClass};

/// Monospace fonts first, then common sans fonts.
const FONT_SEARCH_PATHS: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    // macOS
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "/Library/Fonts/Courier New.ttf",
    // Windows
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub const PADDING: f32 = 16.0;
pub const MAX_TEXTURE_HEIGHT: u32 = 8192;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("no usable font found (searched {searched})")]
    NoFont { searched: String },
    #[error("failed to load font {path}: {message}")]
    FontLoad { path: String, message: String },
    #[error("cannot rasterize into a viewport {width} pixels wide")]
    EmptyViewport { width: u32 },
}

pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, content: &RenderedContent, width: u32) -> Result<RgbaImage, RasterError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    pub x: f32,
    pub line: u32,
    pub class: TokenClass,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub glyphs: Vec<PlacedGlyph>,
    /// Number of lines used (0 for empty content).
    pub lines: u32,
}

/// Word-wraps visible runs into lines no wider than `max_width`.
/// Words wider than a whole line are broken between characters.
pub fn layout_runs(
    runs: &[Token],
    hide_comments: bool,
    max_width: f32,
    advance: impl Fn(char) -> f32,
) -> TextLayout {
    let mut cursor = Cursor {
        glyphs: Vec::new(),
        x: 0.0,
        line: 0,
        max_width,
        spaced: false,
    };
    let mut word: Vec<(char, TokenClass)> = Vec::new();

    for run in runs.iter().filter(|run| is_run_visible(run, hide_comments)) {
        for ch in run.text.chars() {
            if ch.is_whitespace() {
                cursor.place_word(&word, &advance);
                word.clear();
                cursor.space(advance(' '));
            } else {
                word.push((ch, run.class));
            }
        }
    }
    cursor.place_word(&word, &advance);

    let lines = if cursor.glyphs.is_empty() {
        0
    } else {
        cursor.line + 1
    };
    TextLayout {
        glyphs: cursor.glyphs,
        lines,
    }
}

struct Cursor {
    glyphs: Vec<PlacedGlyph>,
    x: f32,
    line: u32,
    max_width: f32,
    spaced: bool,
}

impl Cursor {
    fn place_word(&mut self, word: &[(char, TokenClass)], advance: &impl Fn(char) -> f32) {
        if word.is_empty() {
            return;
        }
        let width: f32 = word.iter().map(|(ch, _)| advance(*ch)).sum();
        if self.x > 0.0 && self.x + width > self.max_width {
            self.newline();
        }
        for &(ch, class) in word {
            let step = advance(ch);
            if self.x > 0.0 && self.x + step > self.max_width {
                self.newline();
            }
            self.glyphs.push(PlacedGlyph {
                ch,
                x: self.x,
                line: self.line,
                class,
            });
            self.x += step;
        }
        self.spaced = false;
    }

    // Spaces never start a line and never stack.
    fn space(&mut self, step: f32) {
        if self.x > 0.0 && !self.spaced {
            self.x += step;
            self.spaced = true;
        }
    }

    fn newline(&mut self) {
        self.line += 1;
        self.x = 0.0;
        self.spaced = false;
    }
}

pub struct GlyphRasterizer {
    font: Font,
}

impl GlyphRasterizer {
    /// Loads `preferred` when given, otherwise the first system font found.
    pub fn load(preferred: Option<&Path>) -> Result<Self, RasterError> {
        match preferred {
            Some(path) => Self::from_path(path),
            None => Self::from_system(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, RasterError> {
        let load_error = |message: String| RasterError::FontLoad {
            path: path.display().to_string(),
            message,
        };
        let data = std::fs::read(path).map_err(|err| load_error(err.to_string()))?;
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|err| load_error(err.to_string()))?;
        engine_info!("Loaded font {}", path.display());
        Ok(Self { font })
    }

    pub fn from_system() -> Result<Self, RasterError> {
        for path in FONT_SEARCH_PATHS {
            match Self::from_path(Path::new(path)) {
                Ok(rasterizer) => return Ok(rasterizer),
                Err(err) => engine_debug!("{err}"),
            }
        }
        Err(RasterError::NoFont {
            searched: FONT_SEARCH_PATHS.join(", "),
        })
    }

    fn line_height(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|metrics| metrics.new_line_size)
            .filter(|size| *size > 0.0)
            .unwrap_or(px * 1.2)
    }
}

impl Rasterizer for GlyphRasterizer {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn rasterize(&self, content: &RenderedContent, width: u32) -> Result<RgbaImage, RasterError> {
        let usable = width as f32 - 2.0 * PADDING;
        if usable <= 0.0 {
            return Err(RasterError::EmptyViewport { width });
        }

        let px = content.font_size as f32;
        let line_height = self.line_height(px);
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map(|metrics| metrics.ascent)
            .unwrap_or(px);
        let layout = layout_runs(&content.runs, content.hide_comments, usable, |ch| {
            self.font.metrics(ch, px).advance_width
        });

        let max_lines =
            (((MAX_TEXTURE_HEIGHT as f32 - 2.0 * PADDING) / line_height).floor() as u32).max(1);
        if layout.lines > max_lines {
            engine_warn!(
                "Texture holds {} of {} lines; {} lines dropped",
                max_lines,
                layout.lines,
                layout.lines - max_lines
            );
        }
        let lines = layout.lines.clamp(1, max_lines);
        let height = ((lines as f32 * line_height) + 2.0 * PADDING).ceil() as u32;

        let palette = Palette::for_style(content.style);
        let [r, g, b] = palette.background;
        let mut buffer = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
        let mut cache: HashMap<char, (Metrics, Vec<u8>)> = HashMap::new();

        for glyph in layout.glyphs.iter().filter(|glyph| glyph.line < lines) {
            let (metrics, bitmap) = cache
                .entry(glyph.ch)
                .or_insert_with(|| self.font.rasterize(glyph.ch, px));
            let baseline = PADDING + glyph.line as f32 * line_height + ascent;
            let origin_x = (PADDING + glyph.x) as i32 + metrics.xmin;
            let origin_y = baseline as i32 - metrics.ymin - metrics.height as i32;
            let color = palette.color_of(glyph.class);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = bitmap[gy * metrics.width + gx];
                    if alpha == 0 {
                        continue;
                    }
                    let x = origin_x + gx as i32;
                    let y = origin_y + gy as i32;
                    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                        continue;
                    }
                    let pixel = buffer.get_pixel_mut(x as u32, y as u32);
                    *pixel = alpha_blend(color, *pixel, alpha);
                }
            }
        }

        engine_debug!(
            "Rasterized {} glyphs on {} lines into {}x{}",
            layout.glyphs.len(),
            lines,
            width,
            height
        );
        Ok(buffer)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_blend(fg: Rgb, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;

    Rgba([
        f32::from(fg[0]).mul_add(a, f32::from(bg[0]) * inv_a) as u8,
        f32::from(fg[1]).mul_add(a, f32::from(bg[1]) * inv_a) as u8,
        f32::from(fg[2]).mul_add(a, f32::from(bg[2]) * inv_a) as u8,
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use codewall_core::{Aesthetic, StyleClass};

    fn token(class: TokenClass, text: &str) -> Token {
        Token {
            class,
            text: text.to_string(),
        }
    }

    fn line_texts(layout: &TextLayout) -> Vec<String> {
        let mut lines = vec![String::new(); layout.lines as usize];
        for glyph in &layout.glyphs {
            lines[glyph.line as usize].push(glyph.ch);
        }
        lines
    }

    #[test]
    fn words_wrap_at_width() {
        let runs = [token(TokenClass::Plain, "aaa bbb ccc")];
        // 10 units per char: "aaa bbb" is 70 wide.
        let layout = layout_runs(&runs, false, 75.0, |_| 10.0);
        assert_eq!(line_texts(&layout), vec!["aaabbb", "ccc"]);
        assert_eq!(layout.glyphs[3].x, 40.0);
        assert_eq!(layout.glyphs[6].x, 0.0);
    }

    #[test]
    fn long_words_break_between_characters() {
        let runs = [token(TokenClass::Plain, "abcdef")];
        let layout = layout_runs(&runs, false, 30.0, |_| 10.0);
        assert_eq!(line_texts(&layout), vec!["abc", "def"]);
    }

    #[test]
    fn hidden_comments_leave_no_gap() {
        let runs = [
            token(TokenClass::Keyword, "fn "),
            token(TokenClass::Comment, "// note "),
            token(TokenClass::Function, "main"),
        ];
        let layout = layout_runs(&runs, true, 1000.0, |_| 10.0);
        let text: String = layout.glyphs.iter().map(|g| g.ch).collect();
        assert_eq!(text, "fnmain");
        assert!(layout.glyphs.iter().all(|g| g.class != TokenClass::Comment));
        // one space between "fn" and "main", never two
        assert_eq!(layout.glyphs[2].x, 30.0);
    }

    #[test]
    fn empty_content_has_no_lines() {
        let layout = layout_runs(&[], false, 100.0, |_| 10.0);
        assert_eq!(layout.lines, 0);
    }

    fn content(text: &str, font_size: u32) -> RenderedContent {
        RenderedContent {
            language: "Plain Text".to_string(),
            markup: text.to_string(),
            runs: vec![token(TokenClass::Plain, text)],
            container_class: "venturis".to_string(),
            container_style: format!("font-size: {font_size}px;"),
            style: StyleClass::Venturis,
            aesthetic: Aesthetic::Gibson,
            font_size,
            hide_comments: false,
        }
    }

    fn system_rasterizer() -> Option<GlyphRasterizer> {
        match GlyphRasterizer::from_system() {
            Ok(rasterizer) => Some(rasterizer),
            Err(err) => {
                eprintln!("skipping: {err}");
                None
            }
        }
    }

    #[test]
    fn glyphs_are_drawn_inside_the_padding() {
        let Some(rasterizer) = system_rasterizer() else {
            return;
        };
        let texture = rasterizer
            .rasterize(&content("fn main() {}", 16), 320)
            .unwrap();

        let line_height = rasterizer.line_height(16.0);
        let expected_height = (line_height + 2.0 * PADDING).ceil() as u32;
        assert_eq!(texture.dimensions(), (320, expected_height));

        let [r, g, b] = Palette::for_style(StyleClass::Venturis).background;
        let background = Rgba([r, g, b, 255]);
        let inked: Vec<(u32, u32)> = texture
            .enumerate_pixels()
            .filter(|(_, _, pixel)| **pixel != background)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(x, _)| x >= PADDING as u32 - 2));
    }

    #[test]
    fn tall_content_is_clamped_to_the_texture_limit() {
        let Some(rasterizer) = system_rasterizer() else {
            return;
        };
        let text = vec!["word"; 2000].join(" ");
        let texture = rasterizer.rasterize(&content(&text, 64), 160).unwrap();
        assert_eq!(texture.width(), 160);
        assert!(texture.height() <= MAX_TEXTURE_HEIGHT);
        assert!(texture.height() > MAX_TEXTURE_HEIGHT / 2);
    }

    #[test]
    fn narrow_viewport_is_rejected() {
        let Some(rasterizer) = system_rasterizer() else {
            return;
        };
        let err = rasterizer.rasterize(&content("x", 16), 20).unwrap_err();
        assert_eq!(err, RasterError::EmptyViewport { width: 20 });
    }

    #[test]
    fn blend_is_opaque_at_full_alpha() {
        let out = alpha_blend([10, 20, 30], Rgba([200, 200, 200, 255]), 255);
        assert_eq!(out, Rgba([10, 20, 30, 255]));
    }
}
