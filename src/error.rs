// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

/// Search error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The item source handed to the enumerator was empty
    EmptyItemSource,

    /// The renderer could not build an artifact from the kept items
    Render(String),

    /// The oracle returned an error for a candidate
    Oracle(String),

    /// The oracle panicked while evaluating a candidate
    OraclePanicked(String),

    /// Invalid search configuration
    Config(String),

    /// Serialization error (reports, configuration)
    Serialization(String),

    /// IO error (file operations, etc.)
    Io(String),

    /// The background search worker panicked
    WorkerPanicked,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::EmptyItemSource => write!(f, "Item source is empty"),
            SearchError::Render(msg) => write!(f, "Render error: {msg}"),
            SearchError::Oracle(msg) => write!(f, "Oracle error: {msg}"),
            SearchError::OraclePanicked(msg) => write!(f, "Oracle panicked: {msg}"),
            SearchError::Config(msg) => write!(f, "Config error: {msg}"),
            SearchError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            SearchError::Io(msg) => write!(f, "IO error: {msg}"),
            SearchError::WorkerPanicked => write!(f, "Search worker panicked"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Serialization(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SearchError::EmptyItemSource.to_string(),
            "Item source is empty"
        );
        assert_eq!(
            SearchError::Oracle("exit status 1".into()).to_string(),
            "Oracle error: exit status 1"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(SearchError::from(io), SearchError::Io(_)));
    }
}
