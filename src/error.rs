// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for file, import and media boundaries.
//!
//! Store transitions never fail; everything that can fail happens when data
//! crosses into or out of the process (project files, the session cache,
//! media probing) and is reported through [`EditorError`].

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid project: {0}")]
    InvalidProject(String),
    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),
}

impl EditorError {
    pub fn invalid_project(msg: impl Into<String>) -> Self {
        Self::InvalidProject(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert!(EditorError::invalid_project("missing stage")
            .to_string()
            .starts_with("Invalid project:"));
        assert!(EditorError::UnsupportedFormat("txt".into())
            .to_string()
            .contains("txt"));
    }
}
