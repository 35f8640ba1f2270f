//! Colors for each style class. The page stylesheet and the rasterizer both
//! read from here so the markup and the texture agree.

use std::fmt::Write as _;

use codewall_core::{StyleClass, HIDE_COMMENTS_CLASS};

use crate::TokenClass;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub foreground: Rgb,
    pub comment: Rgb,
    pub keyword: Rgb,
    pub string: Rgb,
    pub number: Rgb,
    pub constant: Rgb,
    pub function: Rgb,
    pub type_name: Rgb,
    pub punctuation: Rgb,
}

impl Palette {
    pub fn for_style(style: StyleClass) -> Self {
        match style {
            // amber terminal
            StyleClass::Venturis => Palette {
                background: [0x14, 0x0c, 0x02],
                foreground: [0xff, 0xb0, 0x00],
                comment: [0x80, 0x5a, 0x10],
                keyword: [0xff, 0xd8, 0x60],
                string: [0xff, 0xc8, 0x40],
                number: [0xff, 0xe0, 0x90],
                constant: [0xff, 0xe0, 0x90],
                function: [0xff, 0xcc, 0x33],
                type_name: [0xff, 0xbb, 0x22],
                punctuation: [0xcc, 0x88, 0x00],
            },
            StyleClass::WeylandYutani => Palette {
                background: [0x02, 0x10, 0x06],
                foreground: [0x33, 0xff, 0x66],
                comment: [0x1a, 0x66, 0x30],
                keyword: [0x99, 0xff, 0xaa],
                string: [0x66, 0xff, 0x99],
                number: [0xcc, 0xff, 0xcc],
                constant: [0xcc, 0xff, 0xcc],
                function: [0x55, 0xee, 0x88],
                type_name: [0x44, 0xdd, 0x77],
                punctuation: [0x22, 0xaa, 0x44],
            },
            StyleClass::Delos => Palette {
                background: [0xf2, 0xee, 0xe4],
                foreground: [0x2b, 0x2b, 0x2b],
                comment: [0x9a, 0x94, 0x86],
                keyword: [0x8b, 0x1e, 0x1e],
                string: [0x2e, 0x5e, 0x3a],
                number: [0x6a, 0x3d, 0x9a],
                constant: [0x6a, 0x3d, 0x9a],
                function: [0x1f, 0x4e, 0x79],
                type_name: [0x7a, 0x4b, 0x00],
                punctuation: [0x55, 0x55, 0x55],
            },
            StyleClass::Cyberdyne => Palette {
                background: [0x08, 0x08, 0x10],
                foreground: [0xd0, 0xd8, 0xff],
                comment: [0x50, 0x58, 0x80],
                keyword: [0xff, 0x33, 0x33],
                string: [0x66, 0xcc, 0xff],
                number: [0xff, 0x88, 0x55],
                constant: [0xff, 0x88, 0x55],
                function: [0xee, 0xee, 0xff],
                type_name: [0xaa, 0x99, 0xff],
                punctuation: [0x88, 0x90, 0xb0],
            },
            StyleClass::Tyrell => Palette {
                background: [0x12, 0x04, 0x1c],
                foreground: [0xf0, 0xd0, 0xff],
                comment: [0x6a, 0x4a, 0x80],
                keyword: [0xff, 0x3c, 0xac],
                string: [0x3c, 0xf0, 0xff],
                number: [0xff, 0xe0, 0x66],
                constant: [0xff, 0xe0, 0x66],
                function: [0xb0, 0x80, 0xff],
                type_name: [0x66, 0xff, 0xcc],
                punctuation: [0xc0, 0x90, 0xd8],
            },
        }
    }

    pub fn color_of(&self, class: TokenClass) -> Rgb {
        match class {
            TokenClass::Plain => self.foreground,
            TokenClass::Comment => self.comment,
            TokenClass::Keyword => self.keyword,
            TokenClass::String => self.string,
            TokenClass::Number => self.number,
            TokenClass::Constant => self.constant,
            TokenClass::Function => self.function,
            TokenClass::Type => self.type_name,
            TokenClass::Punctuation => self.punctuation,
        }
    }
}

fn hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Stylesheet covering every style class and the hide-comments modifier.
pub fn stylesheet() -> String {
    let mut css = String::new();
    for style in StyleClass::ALL {
        let palette = Palette::for_style(style);
        let class = style.class_name();
        let _ = writeln!(
            css,
            ".{class} {{ background: {}; color: {}; }}",
            hex(palette.background),
            hex(palette.foreground)
        );
        for token in TokenClass::STYLED {
            if let Some(token_class) = token.css_class() {
                let _ = writeln!(
                    css,
                    ".{class} .{token_class} {{ color: {}; }}",
                    hex(palette.color_of(token))
                );
            }
        }
    }
    let _ = writeln!(css, ".{HIDE_COMMENTS_CLASS} .cw-comment {{ display: none; }}");
    css
}
