//! Problem files
//!
//! A problem bundles the name of the function a solution must define with
//! the test cases it is judged against. Fields the judge does not use are
//! ignored when reading catalog entries.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TestCase;

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("failed to read problem file at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse problem: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        })
    }
}

/// A practice problem and its test cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    /// Name of the function a solution must define
    pub function_name: String,
    #[serde(default)]
    pub starter_code: String,
    pub tests: Vec<TestCase>,
}

impl Problem {
    /// Parse a problem from JSON
    pub fn from_json(content: &str) -> Result<Self, ProblemError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a problem from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProblemError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ProblemError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}
