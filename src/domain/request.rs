//! Resolution request model and file parser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::assignment::ResourceAssignment;
use crate::domain::error::ResolutionError;

/// One resolution request: the ordered assignment list plus the
/// caller-supplied input store (string attributes, override semantics).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolutionRequest {
    #[serde(default)]
    pub assignments: Vec<ResourceAssignment>,
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
}

impl ResolutionRequest {
    /// Normalize all assignments and validate request-level invariants.
    pub fn normalize(&mut self) -> Result<(), ResolutionError> {
        for assignment in &mut self.assignments {
            if assignment.name.trim().is_empty() {
                return Err(ResolutionError::MissingField {
                    assignment: "<unnamed>".into(),
                    field: "name",
                });
            }
            assignment.normalize();
        }
        Ok(())
    }
}

/// Parse and validate a request file (YAML, or JSON — a YAML subset).
pub fn parse_request_content(content: &str) -> Result<ResolutionRequest, ResolutionError> {
    let mut request: ResolutionRequest = serde_yaml::from_str(content)
        .map_err(|e| ResolutionError::parse_error("request file", e.to_string()))?;
    request.normalize()?;
    Ok(request)
}
