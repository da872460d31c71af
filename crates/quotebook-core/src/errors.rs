use crate::model::DocId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("document {0} not found")]
    NotFound(DocId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("malformed filter for `{field}`: {reason}")]
    MalformedFilter { field: &'static str, reason: String },
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
