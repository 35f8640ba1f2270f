use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, FetchProgress, RequestId,
};

pub const RAW_GITHUB_ORIGIN: &str = "https://raw.githubusercontent.com";
pub const PLAIN_TEXT_PREFIX: &str = "text/plain";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Origin that GitHub blob URLs are rewritten to.
    pub raw_github_origin: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            raw_github_origin: RAW_GITHUB_ORIGIN.to_string(),
        }
    }
}

/// Rewrites a GitHub file-viewer URL to its raw-content equivalent.
/// Any other URL is returned trimmed but otherwise unchanged.
pub fn raw_content_url(url: &str) -> String {
    rewrite_github_url(url, RAW_GITHUB_ORIGIN)
}

fn rewrite_github_url(url: &str, raw_origin: &str) -> String {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://github.com")
        .or_else(|| url.strip_prefix("http://github.com"));
    match rest {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            format!(
                "{}{}",
                raw_origin.trim_end_matches('/'),
                rest.replacen("/blob/", "/", 1)
            )
        }
        _ => url.to_string(),
    }
}

/// True when a declared content type is plain text (parameters allowed).
pub fn is_plain_text(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with(PLAIN_TEXT_PREFIX)
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        request_id: RequestId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(
        &self,
        redirect_counter: Arc<AtomicUsize>,
    ) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Transport, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            format!(
                "The file is too large ({actual} bytes, limit {} bytes).",
                self.settings.max_bytes
            ),
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        request_id: RequestId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        let requested_url = rewrite_github_url(url, &self.settings.raw_github_origin);
        if requested_url != url.trim() {
            engine_debug!("request {request_id}: rewrote {url} to {requested_url}");
        }
        let parsed = reqwest::Url::parse(&requested_url).map_err(|err| {
            FetchError::new(
                FailureKind::InvalidUrl,
                format!("Check your URL, it could not be parsed ({err})."),
            )
        })?;
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status),
                format!("Check your URL, server returned status {status}."),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        match content_type.as_deref() {
            Some(ct) if is_plain_text(ct) => {}
            other => {
                let received = other.unwrap_or("no content type").to_string();
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: received.clone(),
                    },
                    format!(
                        "This doesn't appear to be a text file. \
                         Expected {PLAIN_TEXT_PREFIX}, received {received}."
                    ),
                ));
            }
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let final_url = response.url().to_string();
        sink.emit(EngineEvent::Progress(FetchProgress {
            request_id,
            bytes: 0,
        }));

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
            sink.emit(EngineEvent::Progress(FetchProgress {
                request_id,
                bytes: bytes.len() as u64,
            }));
        }

        engine_info!(
            "request {request_id}: fetched {} bytes from {final_url}",
            bytes.len()
        );

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            requested_url,
            final_url,
            redirect_count: redirect_counter.load(Ordering::Relaxed),
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(FetchOutput { bytes, metadata })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(
            FailureKind::Timeout,
            "The server took too long to respond.".to_string(),
        );
    }
    if err.is_redirect() {
        return FetchError::new(
            FailureKind::RedirectLimitExceeded,
            "Too many redirects.".to_string(),
        );
    }
    FetchError::new(FailureKind::Transport, format!("Network error: {err}"))
}
