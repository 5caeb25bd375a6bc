//! Tolerant decoding of the volumes response.
//!
//! The parser is total: every input maps to a [`LoadResult`]. Items without a
//! usable title are skipped one by one instead of failing the batch.

use serde_json::{Map, Value};
use shared::{
    domain::{Book, AUTHOR_NOT_AVAILABLE},
    error::SearchError,
    protocol::LoadResult,
};
use tracing::debug;

pub fn parse_volumes(text: Option<&str>) -> LoadResult {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return LoadResult::Empty;
    };

    let root: Value = match serde_json::from_str(text) {
        Ok(root) => root,
        Err(err) => return LoadResult::Failure(SearchError::Parse(err.to_string())),
    };

    let Value::Object(root) = root else {
        return LoadResult::Failure(SearchError::Parse(
            "top-level value is not an object".to_string(),
        ));
    };

    let items = match root.get("items") {
        None | Some(Value::Null) => return LoadResult::Empty,
        Some(Value::Array(items)) => items,
        Some(_) => {
            return LoadResult::Failure(SearchError::Parse(
                "`items` is not an array".to_string(),
            ))
        }
    };

    let books: Vec<Book> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match book_from_item(item) {
            Ok(book) => Some(book),
            Err(reason) => {
                debug!(index, reason, "skipping volume");
                None
            }
        })
        .collect();

    if books.is_empty() {
        LoadResult::Empty
    } else {
        LoadResult::Success(books)
    }
}

fn book_from_item(item: &Value) -> Result<Book, &'static str> {
    let info = item
        .get("volumeInfo")
        .and_then(Value::as_object)
        .ok_or("missing volumeInfo")?;

    let title = match info.get("title") {
        Some(Value::String(title)) if !title.is_empty() => title.clone(),
        Some(Value::String(_)) => return Err("empty title"),
        Some(_) => return Err("title is not a string"),
        None => return Err("missing title"),
    };

    Ok(Book::new(title, authors(info)))
}

fn authors(info: &Map<String, Value>) -> Vec<String> {
    let authors: Vec<String> = info
        .get("authors")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if authors.is_empty() {
        vec![AUTHOR_NOT_AVAILABLE.to_string()]
    } else {
        authors
    }
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod tests;
