//! Resolution session: the typed per-request store of dictionaries,
//! pending assignments, resolved values, and failure markers.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::assignment::{AssignmentStatus, ResourceAssignment};
use crate::domain::dictionary::{DataTypeDefinition, DictionarySet, ResourceDefinition};
use crate::domain::error::ResolutionError;
use crate::domain::request::ResolutionRequest;

/// One recorded per-assignment failure, kept for diagnostics alongside
/// the status written onto the assignment itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub assignment: String,
    pub code: &'static str,
    pub message: String,
}

/// Mutable state for one resolution request.
///
/// Values are stored under both the assignment name and its dictionary
/// name so cross-references (input key mappings address dictionary keys)
/// and template keys both find them. Not shared across requests.
#[derive(Debug, Default)]
pub struct ResolutionSession {
    pending: Vec<ResourceAssignment>,
    completed: Vec<ResourceAssignment>,
    dictionaries: DictionarySet,
    inputs: BTreeMap<String, String>,
    resolved: BTreeMap<String, Value>,
    failures: Vec<FailureRecord>,
}

impl ResolutionSession {
    /// Build a session from a normalized request and a loaded dictionary
    /// store.
    pub fn new(
        mut request: ResolutionRequest,
        dictionaries: DictionarySet,
    ) -> Result<Self, ResolutionError> {
        request.normalize()?;
        Ok(ResolutionSession {
            pending: request.assignments,
            completed: Vec::new(),
            dictionaries,
            inputs: request.inputs,
            resolved: BTreeMap::new(),
            failures: Vec::new(),
        })
    }

    // -- dictionary store ---------------------------------------------------

    pub fn dictionary(&self, name: &str) -> Option<&ResourceDefinition> {
        self.dictionaries.get(name)
    }

    pub fn data_type(&self, name: &str) -> Option<&DataTypeDefinition> {
        self.dictionaries.data_type(name)
    }

    // -- caller input store -------------------------------------------------

    /// Caller-supplied attribute for `key`, when present and non-blank.
    pub fn non_blank_input(&self, key: &str) -> Option<&str> {
        self.inputs.get(key).map(String::as_str).filter(|value| !value.trim().is_empty())
    }

    // -- resolved values ----------------------------------------------------

    /// Record a resolved value under the assignment name and its
    /// dictionary name. First write wins; later writes are ignored.
    pub fn set_value(&mut self, name: &str, dictionary_name: &str, value: Value) {
        self.set_value_at(name, value.clone());
        if dictionary_name != name && !dictionary_name.is_empty() {
            self.set_value_at(dictionary_name, value);
        }
    }

    fn set_value_at(&mut self, key: &str, value: Value) {
        if self.resolved.contains_key(key) {
            warn!(key, "ignoring overwrite of already-resolved value");
            return;
        }
        self.resolved.insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.resolved.get(key)
    }

    /// True when `key` holds a resolved, non-null value.
    pub fn has_value(&self, key: &str) -> bool {
        matches!(self.resolved.get(key), Some(value) if !value.is_null())
    }

    pub fn resolved_values(&self) -> &BTreeMap<String, Value> {
        &self.resolved
    }

    // -- failures -----------------------------------------------------------

    pub fn record_failure(&mut self, assignment: &str, error: &ResolutionError) {
        self.failures.push(FailureRecord {
            assignment: assignment.to_string(),
            code: error.code(),
            message: error.to_string(),
        });
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    // -- assignment lifecycle -----------------------------------------------

    /// Move the pending assignments out for sequencing; the engine
    /// archives them back as their batches complete.
    pub fn take_pending(&mut self) -> Vec<ResourceAssignment> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn archive(&mut self, assignment: ResourceAssignment) {
        self.completed.push(assignment);
    }

    /// Flip archived assignments still pending to success. Runs once at
    /// the end of a clean run; a failed run keeps pending statuses so
    /// never-attempted assignments stay visible.
    pub fn finish_pending_as_success(&mut self) {
        for assignment in &mut self.completed {
            if assignment.status == AssignmentStatus::Pending {
                assignment.mark_success();
            }
        }
    }

    /// Assignments in processing order with their final status/message.
    pub fn assignments(&self) -> &[ResourceAssignment] {
        &self.completed
    }
}
