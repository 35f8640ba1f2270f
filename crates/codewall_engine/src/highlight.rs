//! Language detection and token classification.

use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Coarse token categories shared by the HTML markup and the rasterizer palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Plain,
    Comment,
    Keyword,
    String,
    Number,
    Constant,
    Function,
    Type,
    Punctuation,
}

impl TokenClass {
    pub const STYLED: [TokenClass; 8] = [
        TokenClass::Comment,
        TokenClass::Keyword,
        TokenClass::String,
        TokenClass::Number,
        TokenClass::Constant,
        TokenClass::Function,
        TokenClass::Type,
        TokenClass::Punctuation,
    ];

    /// CSS class of the span wrapping this token; plain text is not wrapped.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            TokenClass::Plain => None,
            TokenClass::Comment => Some("cw-comment"),
            TokenClass::Keyword => Some("cw-keyword"),
            TokenClass::String => Some("cw-string"),
            TokenClass::Number => Some("cw-number"),
            TokenClass::Constant => Some("cw-constant"),
            TokenClass::Function => Some("cw-function"),
            TokenClass::Type => Some("cw-type"),
            TokenClass::Punctuation => Some("cw-punctuation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub class: TokenClass,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedSource {
    pub language: String,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HighlightError {
    #[error("failed to highlight {language} source: {message}")]
    Parse { language: String, message: String },
}

pub trait Highlighter: Send + Sync {
    /// Detects the language of `text` and splits it into classified tokens.
    /// `source_url` is only a hint for detection.
    fn highlight(
        &self,
        text: &str,
        source_url: Option<&str>,
    ) -> Result<HighlightedSource, HighlightError>;
}

pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// URL file extension, then file name, then first line, then plain text.
    fn detect(&self, text: &str, source_url: Option<&str>) -> &SyntaxReference {
        let file_name = source_url.and_then(file_name_of);
        let by_name = file_name.and_then(|name| {
            let by_extension = name
                .rsplit_once('.')
                .and_then(|(_, ext)| self.syntaxes.find_syntax_by_extension(ext));
            by_extension.or_else(|| self.syntaxes.find_syntax_by_extension(name))
        });

        by_name
            .or_else(|| {
                text.lines()
                    .next()
                    .and_then(|line| self.syntaxes.find_syntax_by_first_line(line))
            })
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(
        &self,
        text: &str,
        source_url: Option<&str>,
    ) -> Result<HighlightedSource, HighlightError> {
        let syntax = self.detect(text, source_url);
        let language = syntax.name.clone();
        let parse_error = |message: String| HighlightError::Parse {
            language: language.clone(),
            message,
        };

        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens: Vec<Token> = Vec::new();

        for line in LinesWithEndings::from(text) {
            let ops = state
                .parse_line(line, &self.syntaxes)
                .map_err(|err| parse_error(err.to_string()))?;
            let mut cursor = 0;
            for (offset, op) in ops {
                if offset > cursor {
                    push_token(&mut tokens, classify(&stack), &line[cursor..offset]);
                    cursor = offset;
                }
                stack
                    .apply(&op)
                    .map_err(|err| parse_error(err.to_string()))?;
            }
            if cursor < line.len() {
                push_token(&mut tokens, classify(&stack), &line[cursor..]);
            }
        }

        Ok(HighlightedSource { language, tokens })
    }
}

fn file_name_of(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let name = path.rsplit('/').next()?;
    (!name.is_empty()).then_some(name)
}

/// Comments and strings win over whatever is nested inside them; otherwise
/// the innermost recognizable scope decides.
fn classify(stack: &ScopeStack) -> TokenClass {
    let names: Vec<String> = stack
        .as_slice()
        .iter()
        .map(|scope| scope.build_string())
        .collect();

    if names.iter().any(|name| name.starts_with("comment")) {
        return TokenClass::Comment;
    }
    if names.iter().any(|name| name.starts_with("string")) {
        return TokenClass::String;
    }
    names
        .iter()
        .rev()
        .find_map(|name| classify_scope(name))
        .unwrap_or(TokenClass::Plain)
}

fn classify_scope(name: &str) -> Option<TokenClass> {
    let class = if name.starts_with("constant.numeric") {
        TokenClass::Number
    } else if name.starts_with("constant") {
        TokenClass::Constant
    } else if name.starts_with("keyword.operator") || name.starts_with("punctuation") {
        TokenClass::Punctuation
    } else if name.starts_with("keyword")
        || name.starts_with("storage.type")
        || name.starts_with("storage.modifier")
    {
        TokenClass::Keyword
    } else if name.starts_with("entity.name.function")
        || name.starts_with("support.function")
        || name.starts_with("variable.function")
    {
        TokenClass::Function
    } else if name.starts_with("entity.name")
        || name.starts_with("support.type")
        || name.starts_with("support.class")
    {
        TokenClass::Type
    } else {
        return None;
    };
    Some(class)
}

fn push_token(tokens: &mut Vec<Token>, class: TokenClass, text: &str) {
    if text.is_empty() {
        return;
    }
    match tokens.last_mut() {
        Some(last) if last.class == class => last.text.push_str(text),
        _ => tokens.push(Token {
            class,
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_ignores_query_and_fragment() {
        assert_eq!(file_name_of("https://x.org/a/b/main.rs?raw=1#L3"), Some("main.rs"));
        assert_eq!(file_name_of("https://x.org/a/"), None);
    }

    #[test]
    fn scope_classification() {
        assert_eq!(classify_scope("constant.numeric.integer.rust"), Some(TokenClass::Number));
        assert_eq!(classify_scope("storage.type.function.rust"), Some(TokenClass::Keyword));
        assert_eq!(classify_scope("keyword.operator.arithmetic"), Some(TokenClass::Punctuation));
        assert_eq!(classify_scope("entity.name.function.rust"), Some(TokenClass::Function));
        assert_eq!(classify_scope("entity.name.struct.rust"), Some(TokenClass::Type));
        assert_eq!(classify_scope("source.rust"), None);
    }

    #[test]
    fn adjacent_tokens_of_same_class_merge() {
        let mut tokens = Vec::new();
        push_token(&mut tokens, TokenClass::Plain, "a");
        push_token(&mut tokens, TokenClass::Plain, "b");
        push_token(&mut tokens, TokenClass::Keyword, "fn");
        push_token(&mut tokens, TokenClass::Keyword, "");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "ab");
    }
}
