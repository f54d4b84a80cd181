// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module handles exporting and importing the editor state in JSON
//! (the native project format) and YAML. A project is only accepted when
//! it carries both a `layers` collection and a `stage` record.

use crate::error::{EditorError, EditorResult};
use crate::models::project::EditorState;
use crate::util::timestamp;
use std::path::Path;
use std::time::SystemTime;

const REQUIRED_KEYS: [&str; 2] = ["layers", "stage"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Json,
    Yaml,
}

impl ProjectFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> EditorResult<Self> {
        let extension = path.extension().and_then(|s| s.to_str());
        match extension {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            other => Err(EditorError::UnsupportedFormat(format!("{:?}", other))),
        }
    }
}

/// Default download name, e.g. `video-editor-2025-01-31T12:00:00.000Z.json`.
pub fn export_file_name(now: SystemTime) -> String {
    format!("video-editor-{}.json", timestamp::iso8601(now))
}

pub fn to_json(state: &EditorState) -> EditorResult<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

pub fn to_yaml(state: &EditorState) -> EditorResult<String> {
    Ok(serde_yaml::to_string(state)?)
}

fn missing_key(has_key: impl Fn(&str) -> bool) -> Option<&'static str> {
    REQUIRED_KEYS.into_iter().find(|key| !has_key(key))
}

/// Parse a JSON project, requiring `layers` and `stage`.
pub fn parse_json(text: &str) -> EditorResult<EditorState> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = value
        .as_object()
        .ok_or_else(|| EditorError::invalid_project("top level is not an object"))?;
    if let Some(key) = missing_key(|k| object.get(k).is_some_and(|v| !v.is_null())) {
        return Err(EditorError::invalid_project(format!("missing `{}`", key)));
    }
    Ok(serde_json::from_value(value)?)
}

/// Parse a YAML project, requiring `layers` and `stage`.
pub fn parse_yaml(text: &str) -> EditorResult<EditorState> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    let mapping = value
        .as_mapping()
        .ok_or_else(|| EditorError::invalid_project("top level is not a mapping"))?;
    if let Some(key) = missing_key(|k| mapping.get(k).is_some_and(|v| !v.is_null())) {
        return Err(EditorError::invalid_project(format!("missing `{}`", key)));
    }
    Ok(serde_yaml::from_value(value)?)
}

/// Write the state verbatim in the format implied by the path's extension.
pub fn export_project(state: &EditorState, path: &Path) -> EditorResult<()> {
    let text = match ProjectFormat::from_path(path)? {
        ProjectFormat::Json => to_json(state)?,
        ProjectFormat::Yaml => to_yaml(state)?,
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Read and validate a project file.
pub fn import_project(path: &Path) -> EditorResult<EditorState> {
    let format = ProjectFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    match format {
        ProjectFormat::Json => parse_json(&text),
        ProjectFormat::Yaml => parse_yaml(&text),
    }
}
