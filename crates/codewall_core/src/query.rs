//! Query-string bootstrapping and permalinks.

use url::form_urlencoded;
use url::Url;

use crate::{ControlId, OptionSet};

/// Query parameter carrying the source URL.
pub const URL_PARAM: &str = "url";

/// Parameters recovered from a page query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bootstrap {
    pub url: Option<String>,
    /// Recognized controls, in query order.
    pub controls: Vec<(ControlId, String)>,
    /// Parameter names that were neither `url` nor a control.
    pub ignored: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid permalink base: {0}")]
    InvalidBase(#[from] url::ParseError),
    #[error("permalink base cannot carry a query: {0}")]
    CannotBeABase(String),
}

/// Parses a query string (with or without a leading `?`).
/// Empty values are skipped; a repeated parameter keeps its last value.
pub fn parse_query(query: &str) -> Bootstrap {
    let query = query.trim().trim_start_matches('?');
    let mut bootstrap = Bootstrap::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.trim().is_empty() {
            continue;
        }
        if key == URL_PARAM {
            bootstrap.url = Some(value.trim().to_string());
            continue;
        }
        match key.parse::<ControlId>() {
            Ok(control) => {
                bootstrap.controls.retain(|(existing, _)| *existing != control);
                bootstrap.controls.push((control, value.into_owned()));
            }
            Err(_) => bootstrap.ignored.push(key.into_owned()),
        }
    }

    bootstrap
}

/// Builds a URL that reproduces `source_url` with the given options when visited.
pub fn permalink(base: &str, source_url: &str, options: &OptionSet) -> Result<String, QueryError> {
    let mut link = Url::parse(base)?;
    if link.cannot_be_a_base() {
        return Err(QueryError::CannotBeABase(base.to_string()));
    }
    link.set_query(None);
    link.set_fragment(None);
    {
        let mut pairs = link.query_pairs_mut();
        pairs.append_pair(URL_PARAM, source_url);
        for control in ControlId::ALL {
            pairs.append_pair(control.name(), &options.value_of(control));
        }
    }
    Ok(link.to_string())
}
