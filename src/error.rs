//! Error types for pages, timers and the toast presenter

use crate::dom::ElementId;
use thiserror::Error;

/// Result type alias for page and toast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating a page
#[derive(Error, Debug)]
pub enum Error {
    /// The document has no `<body>` to attach elements to
    #[error("Document has no body element")]
    MissingBody,

    /// An element handle does not belong to this document
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),

    /// A tree mutation would produce an invalid hierarchy
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// `run_until_idle` gave up after running this many timers
    #[error("Timer limit reached after {0} callbacks")]
    TimerLimit(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Page source or scenario could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Reading a page, config or scenario from disk failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}
