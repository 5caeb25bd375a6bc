pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod parser;
pub mod query;

pub use config::{load_settings, load_settings_with, Settings};
pub use controller::{Connectivity, SearchController, SearchView};
pub use error::{ConfigError, FetchError};
pub use fetch::{BookFetcher, HttpBookFetcher};
pub use loader::{Attachment, LoaderState, SearchLoader};
pub use parser::parse_volumes;
pub use query::{QueryBuilder, SearchQuery};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
