use std::io;

use thiserror::Error;

use crate::domain::assignment::SourceKind;
use crate::ports::{RestClientError, SqlClientError};

/// Library-wide error type for resolution operations.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// An input file could not be read.
    #[error("Failed to read {what} '{path}': {source}")]
    Io { what: &'static str, path: String, source: io::Error },

    /// Configuration or environment issue.
    #[error("{0}")]
    Config(String),

    /// File content could not be parsed.
    #[error("Failed to parse {what}: {details}")]
    Parse { what: String, details: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A mandatory assignment field is blank or absent.
    #[error("Resource assignment '{assignment}' is missing mandatory field '{field}'")]
    MissingField { assignment: String, field: &'static str },

    /// The referenced dictionary entry does not exist.
    #[error("Resource assignment '{assignment}' references unknown dictionary '{dictionary}'")]
    MissingDictionary { assignment: String, dictionary: String },

    /// The dictionary entry exists but lacks the required source definition.
    /// thiserror reserves the field name `source` for the error cause, so
    /// the source kind travels as `kind`.
    #[error("Dictionary '{dictionary}' has no '{kind}' source definition")]
    MissingSource { dictionary: String, kind: SourceKind },

    /// An assignment was handed to a resolver for a different source.
    #[error("Resource assignment '{assignment}' has source '{found}', expected '{expected}'")]
    SourceMismatch { assignment: String, expected: SourceKind, found: SourceKind },

    /// No resolver is registered for the batch's source.
    #[error("No resolver registered for source '{kind}'")]
    NoResolverForSource { kind: SourceKind },

    /// An input-key-mapping reference could not be satisfied from the session.
    #[error(
        "Resource assignment '{assignment}' parameter '{parameter}' maps to '{key}', which has no resolved value"
    )]
    UnresolvedParameter { assignment: String, parameter: String, key: String },

    /// A required assignment ended with no resolved value.
    #[error("Mandatory resource assignment '{assignment}' could not be resolved: {reason}")]
    MandatoryUnresolved { assignment: String, reason: String },

    /// The dependency graph contains a cycle.
    #[error("Unresolvable dependency graph, cycle among: {remaining}")]
    CyclicDependency { remaining: String },

    /// A declared dependency names no assignment in the request.
    #[error("Resource assignment '{assignment}' depends on unknown assignment '{dependency}'")]
    UnknownDependency { assignment: String, dependency: String },

    /// Two assignments in one request share a name.
    #[error("Duplicate resource assignment name '{name}'")]
    DuplicateAssignment { name: String },

    /// A resolved value did not match the declared property type.
    #[error("Resource assignment '{assignment}' expected {expected} value, found {found}")]
    Coercion { assignment: String, expected: String, found: String },

    /// SQL port failure.
    #[error(transparent)]
    Sql(#[from] SqlClientError),

    /// RESTCONF port failure.
    #[error(transparent)]
    Rest(#[from] RestClientError),
}

impl ResolutionError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        ResolutionError::Config(message.into())
    }

    pub fn parse_error<S: Into<String>, D: Into<String>>(what: S, details: D) -> Self {
        ResolutionError::Parse { what: what.into(), details: details.into() }
    }

    /// Stable machine-readable code for each failure mode.
    pub fn code(&self) -> &'static str {
        match self {
            ResolutionError::Io { .. } => "E_IO",
            ResolutionError::Config(_) => "E_CONFIG",
            ResolutionError::Parse { .. } => "E_PARSE",
            ResolutionError::TomlParse(_) => "E_PARSE",
            ResolutionError::MissingField { .. } => "E_MISSING_FIELD",
            ResolutionError::MissingDictionary { .. } => "E_MISSING_DICTIONARY",
            ResolutionError::MissingSource { .. } => "E_MISSING_SOURCE",
            ResolutionError::SourceMismatch { .. } => "E_SOURCE_MISMATCH",
            ResolutionError::NoResolverForSource { .. } => "E_NO_RESOLVER",
            ResolutionError::UnresolvedParameter { .. } => "E_PARAM_UNRESOLVED",
            ResolutionError::MandatoryUnresolved { .. } => "E_MANDATORY_UNRESOLVED",
            ResolutionError::CyclicDependency { .. } => "E_CYCLE",
            ResolutionError::UnknownDependency { .. } => "E_UNKNOWN_DEPENDENCY",
            ResolutionError::DuplicateAssignment { .. } => "E_DUPLICATE_ASSIGNMENT",
            ResolutionError::Coercion { .. } => "E_COERCION",
            ResolutionError::Sql(_) => "E_SQL",
            ResolutionError::Rest(_) => "E_REST",
        }
    }

    /// True for errors the engine treats as per-assignment (fail-soft)
    /// rather than fatal for the whole component.
    pub fn is_assignment_scoped(&self) -> bool {
        matches!(
            self,
            ResolutionError::MissingField { .. }
                | ResolutionError::MissingDictionary { .. }
                | ResolutionError::MissingSource { .. }
                | ResolutionError::SourceMismatch { .. }
                | ResolutionError::UnresolvedParameter { .. }
                | ResolutionError::MandatoryUnresolved { .. }
                | ResolutionError::Coercion { .. }
                | ResolutionError::Sql(_)
                | ResolutionError::Rest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let err = ResolutionError::MissingField { assignment: "vnf-id".into(), field: "name" };
        assert_eq!(err.code(), "E_MISSING_FIELD");

        let err = ResolutionError::CyclicDependency { remaining: "a, b".into() };
        assert_eq!(err.code(), "E_CYCLE");

        let err = ResolutionError::MandatoryUnresolved {
            assignment: "vnf-name".into(),
            reason: "no rows".into(),
        };
        assert_eq!(err.code(), "E_MANDATORY_UNRESOLVED");
    }

    #[test]
    fn source_kind_variants_render_the_kind() {
        let err = ResolutionError::MissingSource {
            dictionary: "vnf-name".into(),
            kind: SourceKind::Db,
        };
        assert_eq!(err.code(), "E_MISSING_SOURCE");
        assert_eq!(err.to_string(), "Dictionary 'vnf-name' has no 'db' source definition");

        let err = ResolutionError::NoResolverForSource { kind: SourceKind::Component };
        assert_eq!(err.code(), "E_NO_RESOLVER");
        assert_eq!(err.to_string(), "No resolver registered for source 'component'");
    }

    #[test]
    fn display_names_the_assignment() {
        let err = ResolutionError::MissingDictionary {
            assignment: "vnf-name".into(),
            dictionary: "vnf-name".into(),
        };
        assert!(err.to_string().contains("vnf-name"));
    }

    #[test]
    fn sequencing_errors_are_not_assignment_scoped() {
        let err = ResolutionError::CyclicDependency { remaining: "a".into() };
        assert!(!err.is_assignment_scoped());

        let err = ResolutionError::DuplicateAssignment { name: "a".into() };
        assert!(!err.is_assignment_scoped());
    }
}
