//! Error types for schema construction, option fetching and submission

use thiserror::Error;

use crate::schema::RequiredViolation;

/// Errors raised while building a [`FormSchema`](crate::FormSchema)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Field at index {0} has an empty name")]
    EmptyName(usize),

    #[error("Duplicate field name: {0}")]
    DuplicateName(String),

    #[error("Field '{field}' depends on unknown field '{depends_on}'")]
    UnknownDependency { field: String, depends_on: String },

    #[error("Field '{0}' depends on itself")]
    SelfDependency(String),

    #[error("Dependency cycle through field '{0}'")]
    DependencyCycle(String),

    #[error("Field '{field}' has column span {col_span}, expected 1..=24")]
    InvalidColSpan { field: String, col_span: u8 },
}

/// The single failure kind of the option-fetch protocol.
///
/// The resolver recovers from it locally; it never reaches the form's caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionFetchError {
    /// The request could not be sent or the connection failed
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The body was not a list of options
    #[error("Malformed option list from {url}: {message}")]
    Decode { url: String, message: String },
}

impl OptionFetchError {
    pub fn url(&self) -> &str {
        match self {
            OptionFetchError::Transport { url, .. }
            | OptionFetchError::Status { url, .. }
            | OptionFetchError::Decode { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{} required field(s) missing", .0.len())]
    MissingRequired(Vec<RequiredViolation>),
}
