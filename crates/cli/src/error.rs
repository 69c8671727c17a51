//! Failures of a `flowhatch` invocation and the exit code each one maps to.
//!
//! | code | kind            | raised by                                   |
//! |------|-----------------|---------------------------------------------|
//! | 2    | usage           | clap, before `run`                          |
//! | 10   | `generator`     | field/density lookup, config validation     |
//! | 11   | `config-read`   | reading the `--config` file                 |
//! | 11   | `output-write`  | writing the `-o` file                       |
//! | 12   | `input`         | malformed `--params` or `--config` JSON     |
//! | 13   | `serialization` | encoding the line set or summary            |

use flowhatch_core::HatchError;
use std::path::PathBuf;
use thiserror::Error;

/// Which user-supplied JSON document was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Params,
    ConfigFile,
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Document::Params => "--params",
            Document::ConfigFile => "--config file",
        })
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    /// The generator, field registry or config rejected its inputs.
    #[error(transparent)]
    Hatch(#[from] HatchError),

    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write lines to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{document}: {reason}")]
    BadDocument { document: Document, reason: String },

    #[error("cannot encode output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Hatch(HatchError::Io(_)) => 11,
            CliError::Hatch(_) => 10,
            CliError::ConfigRead { .. } | CliError::OutputWrite { .. } => 11,
            CliError::BadDocument { .. } => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Short machine-readable tag for `--json` error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Hatch(HatchError::Io(_)) => "io",
            CliError::Hatch(_) => "generator",
            CliError::ConfigRead { .. } => "config-read",
            CliError::OutputWrite { .. } => "output-write",
            CliError::BadDocument { .. } => "input",
            CliError::Serialization(_) => "serialization",
        }
    }
}
