//! Error types shared by the search, aggregation, rendering and publishing layers.
//!
//! Every failure aborts the current run. Nothing is retried, and errors that
//! come from a remote system carry a [`Service`] tag so the message names it.

use std::fmt;

/// The remote system a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// The news search API.
    Search,
    /// The document-workspace API pages are published to.
    Pages,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Search => f.write_str("Naver Search API"),
            Service::Pages => f.write_str("Notion API"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid category: \"{0}\"")]
    InvalidQuery(String),

    #[error("{service} authentication failed. Check your credentials.")]
    Auth { service: Service },

    #[error("{service}: not found ({message}). Check the page id and integration access.")]
    NotFound { service: Service, message: String },

    #[error("{service} rate limit exceeded. Please try again later.")]
    RateLimited { service: Service },

    #[error("network error calling {service}: {source}")]
    Unavailable {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} error {status}: {message}")]
    Remote {
        service: Service,
        status: u16,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;
