//! JSON output of generated flow lines.

use flowhatch_core::{FlowLine, Seed};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CliError;

/// One polyline as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub length: f64,
    pub points: Vec<[f64; 2]>,
}

impl From<&FlowLine> for LineRecord {
    fn from(line: &FlowLine) -> Self {
        Self {
            length: line.length(),
            points: line.points().iter().map(|p| p.to_array()).collect(),
        }
    }
}

/// A complete run: the seed that reproduces it plus every kept line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSet {
    pub width: f64,
    pub height: f64,
    pub seed: Seed,
    pub lines: Vec<LineRecord>,
}

impl LineSet {
    pub fn point_count(&self) -> usize {
        self.lines.iter().map(|l| l.points.len()).sum()
    }

    pub fn total_length(&self) -> f64 {
        self.lines.iter().map(|l| l.length).sum()
    }
}

/// Writes a line set as pretty-printed JSON.
///
/// Returns `CliError::OutputWrite` on write failure.
pub fn write_json(set: &LineSet, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(set)?;
    std::fs::write(path, json)
        .map_err(|source| CliError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })
}
