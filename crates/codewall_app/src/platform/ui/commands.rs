//! Console command parsing. Each input line maps to zero or more messages
//! for the state machine, or to a host-only action.

use codewall_core::Msg;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  open <url>               fetch and display a source file
  set <control> <value>    change an option (styleSelect, aestheticSelect,
                           fontSize, hideComments, hideOptions)
  redraw                   re-render the cached file with current options
  reset                    return to the form, keeping the display
  retry                    leave the error panel
  resize <width> <height>  resize the display
  permalink                print a link that restores the current view
  help                     show this text
  quit                     exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Permalink,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{0}` is not a valid size")]
    InvalidSize(String),
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let Some((verb, rest)) = split_word(line) else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "open" => {
            let url = rest.trim();
            if url.is_empty() {
                return Err(CommandError::Usage("open <url>"));
            }
            Command::Dispatch(vec![Msg::InputChanged(url.to_string()), Msg::UrlSubmitted])
        }
        "set" => {
            let (name, value) =
                split_word(rest).ok_or(CommandError::Usage("set <control> <value>"))?;
            let value = value.trim();
            if value.is_empty() {
                return Err(CommandError::Usage("set <control> <value>"));
            }
            Command::Dispatch(vec![Msg::ControlChanged {
                name: name.to_string(),
                value: value.to_string(),
            }])
        }
        "redraw" => Command::Dispatch(vec![Msg::RedrawClicked]),
        "reset" => Command::Dispatch(vec![Msg::ResetClicked]),
        "retry" => Command::Dispatch(vec![Msg::TryAgainClicked]),
        "resize" => {
            let mut parts = rest.split_whitespace();
            let (Some(width), Some(height), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(CommandError::Usage("resize <width> <height>"));
            };
            Command::Dispatch(vec![Msg::Resized {
                width: parse_size(width)?,
                height: parse_size(height)?,
            }])
        }
        "permalink" => Command::Permalink,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (text, ""),
    })
}

fn parse_size(text: &str) -> Result<u32, CommandError> {
    text.parse()
        .map_err(|_| CommandError::InvalidSize(text.to_string()))
}

/// Turns the program argument into bootstrap messages. A query string or a
/// full permalink restores the view; anything else is opened as a URL.
pub fn bootstrap_messages(arg: &str) -> Vec<Msg> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Vec::new();
    }
    if arg.starts_with("url=") {
        return vec![Msg::Bootstrap(arg.to_string())];
    }
    match arg.split_once('?') {
        Some((_, query)) if query.split('&').any(|pair| pair.starts_with("url=")) => {
            vec![Msg::Bootstrap(query.to_string())]
        }
        _ => vec![Msg::InputChanged(arg.to_string()), Msg::UrlSubmitted],
    }
}
