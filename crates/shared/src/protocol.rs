use std::fmt;

use serde::Serialize;

use crate::{
    domain::{Book, LoadId},
    error::SearchError,
};

/// Terminal outcome of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    Success(Vec<Book>),
    Empty,
    NetworkUnavailable,
    Failure(SearchError),
}

impl LoadResult {
    pub fn books(&self) -> &[Book] {
        match self {
            Self::Success(books) => books,
            _ => &[],
        }
    }
}

/// A result tagged with the load that produced it and the trimmed query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDelivery {
    pub load_id: LoadId,
    pub query: String,
    pub blank_query: bool,
    pub result: LoadResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMessage {
    EnterSearchTerm,
    NoBooksFound,
    NoConnection,
    RequestFailed,
}

impl StatusMessage {
    pub fn text(self) -> &'static str {
        match self {
            Self::EnterSearchTerm => "Enter a search term to look for books.",
            Self::NoBooksFound => "No books found.",
            Self::NoConnection => "No internet connection.",
            Self::RequestFailed => "Could not load books. Please try again.",
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
