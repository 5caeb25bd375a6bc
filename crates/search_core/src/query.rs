//! Turns free-text input into a bounded volumes request.

use url::Url;

use crate::{
    config::{parse_endpoint, validate_max_results, Settings},
    error::ConfigError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw_text: String,
    endpoint: Url,
    max_results: u32,
}

impl SearchQuery {
    /// The trimmed user input, before escaping.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn is_blank(&self) -> bool {
        self.raw_text.is_empty()
    }

    /// `{endpoint}?q={text}&maxResults={n}`, keeping any query pairs already on the endpoint.
    pub fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &self.raw_text)
            .append_pair("maxResults", &self.max_results.to_string());
        url
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    endpoint: Url,
    max_results: u32,
}

impl QueryBuilder {
    pub fn new(endpoint: &str, max_results: u32) -> Result<Self, ConfigError> {
        validate_max_results(max_results)?;
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            max_results,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::new(&settings.endpoint, settings.max_results)
    }

    pub fn build(&self, input: &str) -> SearchQuery {
        SearchQuery {
            raw_text: input.trim().to_string(),
            endpoint: self.endpoint.clone(),
            max_results: self.max_results,
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
