use thiserror::Error;

/// Why a load ended without a list of books.
///
/// Being offline before a search is handled by the controller and an empty
/// catalog answer is `LoadResult::Empty`; neither is an error here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
    #[error("malformed response: {0}")]
    Parse(String),
}
