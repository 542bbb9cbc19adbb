use std::fs;
use std::path::Path;

use crate::domain::ResolutionError;

pub mod dictionaries;
pub mod plan;
pub mod resolve;

/// Output rendering for read-oriented commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    /// Parses a user-supplied format name.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(ResolutionError::config_error(format!(
                "Unknown output format '{}', expected 'table' or 'json'",
                other
            ))),
        }
    }
}

pub(crate) fn read_file(path: &Path, what: &'static str) -> Result<String, ResolutionError> {
    fs::read_to_string(path).map_err(|source| ResolutionError::Io {
        what,
        path: path.display().to_string(),
        source,
    })
}
