//! Highlighted text to container markup.

use std::sync::Arc;

use codewall_core::{container_class, Aesthetic, RenderRequest, StyleClass};

use crate::{HighlightError, Highlighter, Token, TokenClass};

/// The content container as it should appear on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub language: String,
    /// Highlighted markup with every whitespace run collapsed to one space.
    pub markup: String,
    /// Same text as the markup, as collapsed runs for rasterization.
    pub runs: Vec<Token>,
    pub container_class: String,
    pub container_style: String,
    pub style: StyleClass,
    pub aesthetic: Aesthetic,
    pub font_size: u32,
    pub hide_comments: bool,
}

pub struct ContentRenderer {
    highlighter: Arc<dyn Highlighter>,
}

impl ContentRenderer {
    pub fn new(highlighter: Arc<dyn Highlighter>) -> Self {
        Self { highlighter }
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderedContent, HighlightError> {
        let highlighted = self
            .highlighter
            .highlight(&request.text, request.source_url.as_deref())?;
        let runs = collapse_runs(&highlighted.tokens);
        let markup = collapse_whitespace(&markup_for(&runs));

        Ok(RenderedContent {
            language: highlighted.language,
            markup,
            runs,
            container_class: container_class(request.style, request.hide_comments),
            container_style: format!("font-size: {}px;", request.font_size),
            style: request.style,
            aesthetic: request.aesthetic,
            font_size: request.font_size,
            hide_comments: request.hide_comments,
        })
    }
}

/// Replaces every run of whitespace with a single space.
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Collapses whitespace across token boundaries, dropping tokens left empty.
fn collapse_runs(tokens: &[Token]) -> Vec<Token> {
    let mut runs = Vec::with_capacity(tokens.len());
    let mut in_space = false;
    for token in tokens {
        let mut text = String::with_capacity(token.text.len());
        for ch in token.text.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    text.push(' ');
                }
                in_space = true;
            } else {
                text.push(ch);
                in_space = false;
            }
        }
        if !text.is_empty() {
            runs.push(Token {
                class: token.class,
                text,
            });
        }
    }
    runs
}

fn markup_for(runs: &[Token]) -> String {
    let mut markup = String::new();
    for run in runs {
        match run.class.css_class() {
            Some(class) => {
                markup.push_str("<span class=\"");
                markup.push_str(class);
                markup.push_str("\">");
                escape_into(&mut markup, &run.text);
                markup.push_str("</span>");
            }
            None => escape_into(&mut markup, &run.text),
        }
    }
    markup
}

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// Whether a run is drawn, given the hide-comments flag.
pub fn is_run_visible(run: &Token, hide_comments: bool) -> bool {
    !(hide_comments && run.class == TokenClass::Comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(class: TokenClass, text: &str) -> Token {
        Token {
            class,
            text: text.to_string(),
        }
    }

    #[test]
    fn collapse_handles_tabs_newlines_and_unicode_spaces() {
        assert_eq!(collapse_whitespace("a \t\n  b\u{00a0}\u{2003}c\n"), "a b c ");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn runs_collapse_across_token_boundaries() {
        let runs = collapse_runs(&[
            token(TokenClass::Keyword, "fn  "),
            token(TokenClass::Plain, "   \n"),
            token(TokenClass::Function, "\tmain"),
        ]);
        assert_eq!(
            runs,
            vec![
                token(TokenClass::Keyword, "fn "),
                token(TokenClass::Function, "main"),
            ]
        );
    }

    #[test]
    fn markup_escapes_and_wraps_styled_tokens() {
        let markup = markup_for(&[
            token(TokenClass::Plain, "a < b && "),
            token(TokenClass::String, "\"x\""),
        ]);
        assert_eq!(
            markup,
            "a &lt; b &amp;&amp; <span class=\"cw-string\">&quot;x&quot;</span>"
        );
    }

    #[test]
    fn hidden_comments_are_not_visible() {
        let comment = token(TokenClass::Comment, "// hi");
        assert!(is_run_visible(&comment, false));
        assert!(!is_run_visible(&comment, true));
        assert!(is_run_visible(&token(TokenClass::Plain, "x"), true));
    }
}
