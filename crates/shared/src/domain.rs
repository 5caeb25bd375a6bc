use serde::Serialize;

/// Placeholder author used when the catalog omits the `authors` field.
pub const AUTHOR_NOT_AVAILABLE: &str = "Author N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadId(pub u64);

impl LoadId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A single catalog hit. Authors are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    title: String,
    authors: Vec<String>,
}

impl Book {
    pub fn new(title: impl Into<String>, authors: Vec<String>) -> Self {
        let authors = if authors.is_empty() {
            vec![AUTHOR_NOT_AVAILABLE.to_string()]
        } else {
            authors
        };

        Self {
            title: title.into(),
            authors,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }
}
