//! Access logging.
//!
//! An [`Interaction`] is the completed (request, response, duration) triple
//! the [`Responder`](crate::http::Responder) hands to a [`Logger`] once per
//! request. [`SystemLogger`] renders it through an [`AccessFormat`] template.
//!
//! # Template syntax
//! - `{key}` for a basic key: `agent`, `duration`, `host`, `length`,
//!   `process`, `referer`, `request`, `status`, `time`
//! - `{Name}i` for the request header `Name`
//! - `{Name}o` for the response header `Name`
//!
//! A lowercase basic key name is never read as a header, whatever follows it.
//! Header keys resolve only in extended mode. Anything missing renders as `-`.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::body::HttpBody;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Method, Uri, Version};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::ObservabilityConfig;
use crate::http::handler::{Request, Response};

/// Placeholder for values that are not available.
pub const MISSING: &str = "-";

/// Keys with a fixed meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicKey {
    Agent,
    Duration,
    Host,
    Length,
    Process,
    Referer,
    Request,
    Status,
    Time,
}

impl FromStr for BasicKey {
    type Err = AccessFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "agent" => BasicKey::Agent,
            "duration" => BasicKey::Duration,
            "host" => BasicKey::Host,
            "length" => BasicKey::Length,
            "process" => BasicKey::Process,
            "referer" => BasicKey::Referer,
            "request" => BasicKey::Request,
            "status" => BasicKey::Status,
            "time" => BasicKey::Time,
            other => {
                return Err(AccessFormatError::UnknownKey {
                    key: other.to_string(),
                })
            }
        })
    }
}

/// A lookup key into an [`Interaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Basic(BasicKey),
    RequestHeader(String),
    ResponseHeader(String),
}

/// Errors in an access-log template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessFormatError {
    #[error("unclosed '{{' at byte {position}")]
    Unclosed { position: usize },

    #[error("unexpected '}}' at byte {position}")]
    StrayBrace { position: usize },

    #[error("empty key at byte {position}")]
    EmptyKey { position: usize },

    #[error("unknown key '{key}'")]
    UnknownKey { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Key(Key),
}

/// A compiled access-log template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessFormat {
    tokens: Vec<Token>,
}

impl AccessFormat {
    pub fn parse(template: &str) -> Result<Self, AccessFormatError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        let mut offset = 0;

        while let Some(position) = rest.find(['{', '}']) {
            if rest.as_bytes()[position] == b'}' {
                return Err(AccessFormatError::StrayBrace {
                    position: offset + position,
                });
            }

            literal.push_str(&rest[..position]);
            let after_open = &rest[position + 1..];
            let close = after_open.find('}').ok_or(AccessFormatError::Unclosed {
                position: offset + position,
            })?;
            let inner = &after_open[..close];
            if inner.contains('{') {
                return Err(AccessFormatError::Unclosed {
                    position: offset + position,
                });
            }
            if inner.is_empty() {
                return Err(AccessFormatError::EmptyKey {
                    position: offset + position,
                });
            }

            let mut consumed = position + 1 + close + 1;
            // Basic key names are lowercase and always win, so `{status}ok`
            // is the status followed by "ok" while `{Status}o` is a header.
            let key = if let Ok(basic) = inner.parse::<BasicKey>() {
                Key::Basic(basic)
            } else {
                match rest[consumed..].chars().next() {
                    Some('i') => {
                        consumed += 1;
                        Key::RequestHeader(inner.to_ascii_lowercase())
                    }
                    Some('o') => {
                        consumed += 1;
                        Key::ResponseHeader(inner.to_ascii_lowercase())
                    }
                    _ => Key::Basic(inner.parse()?),
                }
            };

            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Key(key));

            rest = &rest[consumed..];
            offset += consumed;
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self { tokens })
    }

    /// Render one line; missing values become `-`.
    pub fn render(&self, interaction: &Interaction) -> String {
        let mut line = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => line.push_str(text),
                Token::Key(key) => line.push_str(&interaction.get_or(key, MISSING)),
            }
        }
        line
    }
}

/// Request metadata captured before the request enters the middleware chain.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub remote: Option<SocketAddr>,
    pub started: DateTime<Utc>,
}

impl RequestSummary {
    pub fn capture(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: request.headers().clone(),
            remote: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            started: Utc::now(),
        }
    }
}

/// A finished request/response exchange.
#[derive(Debug, Clone)]
pub struct Interaction {
    request: RequestSummary,
    status: u16,
    response_headers: HeaderMap,
    length: Option<u64>,
    duration: Duration,
    extended: bool,
}

impl Interaction {
    pub fn new(request: RequestSummary, response: &Response, duration: Duration) -> Self {
        let length = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .or_else(|| response.body().size_hint().exact());

        Self {
            request,
            status: response.status().as_u16(),
            response_headers: response.headers().clone(),
            length,
            duration,
            extended: false,
        }
    }

    /// Enable header keys.
    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn request(&self) -> &RequestSummary {
        &self.request
    }

    /// Look up a key. Header keys are `None` unless extended mode is on.
    pub fn get(&self, key: &Key) -> Option<String> {
        match key {
            Key::Basic(basic) => self.basic(*basic),
            Key::RequestHeader(name) if self.extended => header_value(&self.request.headers, name),
            Key::ResponseHeader(name) if self.extended => {
                header_value(&self.response_headers, name)
            }
            Key::RequestHeader(_) | Key::ResponseHeader(_) => None,
        }
    }

    /// Look up a key, falling back to `default`.
    pub fn get_or(&self, key: &Key, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn basic(&self, key: BasicKey) -> Option<String> {
        match key {
            BasicKey::Agent => header_value(&self.request.headers, header::USER_AGENT.as_str()),
            BasicKey::Duration => Some(format!("{:.3}", self.duration.as_secs_f64() * 1000.0)),
            BasicKey::Host => self.request.remote.map(|addr| addr.ip().to_string()),
            BasicKey::Length => self.length.map(|len| len.to_string()),
            BasicKey::Process => Some(std::process::id().to_string()),
            BasicKey::Referer => header_value(&self.request.headers, header::REFERER.as_str()),
            BasicKey::Request => {
                let target = self
                    .request
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                Some(format!("{} {} {:?}", self.request.method, target, self.request.version))
            }
            BasicKey::Status => Some(self.status.to_string()),
            BasicKey::Time => Some(
                self.request
                    .started
                    .format("%d/%b/%Y:%H:%M:%S +0000")
                    .to_string(),
            ),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Receives one interaction per completed request.
pub trait Logger: Send + Sync + 'static {
    fn access(&self, interaction: Interaction);
}

/// Logger that writes access lines through `tracing`.
#[derive(Debug, Clone)]
pub struct SystemLogger {
    format: AccessFormat,
    extended: bool,
    enabled: bool,
}

impl SystemLogger {
    pub fn new(format: AccessFormat) -> Self {
        Self {
            format,
            extended: false,
            enabled: true,
        }
    }

    pub fn from_config(config: &ObservabilityConfig) -> Result<Self, AccessFormatError> {
        Ok(Self {
            format: AccessFormat::parse(&config.access_format)?,
            extended: config.access_extended,
            enabled: config.access_log,
        })
    }

    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Render without emitting; used by `access` and handy in tests.
    pub fn render(&self, interaction: Interaction) -> String {
        self.format.render(&interaction.with_extended(self.extended))
    }
}

impl Logger for SystemLogger {
    fn access(&self, interaction: Interaction) {
        if !self.enabled {
            return;
        }
        let line = self.render(interaction);
        tracing::info!(target: "resource_dispatch::access", "{}", line);
    }
}
