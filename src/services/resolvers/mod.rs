//! Source resolvers and their dispatch registry.

mod db;
mod default;
mod input;
mod mdsal;

pub use db::DbResolver;
pub use default::DefaultResolver;
pub use input::InputResolver;
pub use mdsal::MdsalResolver;

use serde_json::Value;
use tracing::debug;

use crate::domain::assignment::{
    is_primitive_type, PropertyDefinition, ResourceAssignment, SourceKind,
};
use crate::domain::dictionary::ResourceDefinition;
use crate::domain::error::ResolutionError;
use crate::domain::session::ResolutionSession;
use crate::ports::{RestconfClient, SqlClient};
use crate::services::shaping;

/// One source backend: resolves every assignment of its source kind.
pub trait Resolver {
    /// Source this resolver serves.
    fn source(&self) -> SourceKind;

    /// Whether the assignment belongs to this resolver.
    fn can_handle(&self, assignment: &ResourceAssignment) -> bool {
        assignment.dictionary_source == self.source()
    }

    /// Resolve one assignment, writing its value into the session.
    ///
    /// Leaving the session untouched is valid (nothing to resolve); the
    /// engine's mandatory assertion decides what that means. Errors are
    /// per assignment, the rest of the batch still runs.
    fn resolve(
        &self,
        assignment: &mut ResourceAssignment,
        session: &mut ResolutionSession,
    ) -> Result<(), ResolutionError>;
}

/// Closed dispatch table over the built-in resolvers.
///
/// Assignments declaring a source with no registered resolver (such as
/// `component`) fail with a typed error instead of a lookup by name.
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Registry with the four built-in resolvers wired to the given ports.
    pub fn new(sql: Box<dyn SqlClient>, restconf: Box<dyn RestconfClient>) -> Self {
        ResolverRegistry {
            resolvers: vec![
                Box::new(InputResolver),
                Box::new(DefaultResolver),
                Box::new(DbResolver::new(sql)),
                Box::new(MdsalResolver::new(restconf)),
            ],
        }
    }

    /// Resolver registered for `kind`, if any.
    pub fn for_source(&self, kind: SourceKind) -> Option<&dyn Resolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.source() == kind)
            .map(|resolver| resolver.as_ref())
    }

    /// Source kinds with a registered resolver.
    pub fn registered_sources(&self) -> Vec<SourceKind> {
        self.resolvers.iter().map(|resolver| resolver.source()).collect()
    }
}

/// Uniform override precedence: a non-blank caller input under the
/// assignment name beats the declared source.
fn apply_input_override(
    assignment: &ResourceAssignment,
    session: &mut ResolutionSession,
) -> Result<bool, ResolutionError> {
    let Some(text) = session.non_blank_input(&assignment.name).map(str::to_owned) else {
        return Ok(false);
    };
    let value = shaping::coerce_text(assignment, &text)?;
    debug!(assignment = %assignment.name, "caller input overrides the declared source");
    session.set_value(&assignment.name, &assignment.dictionary_name, value);
    Ok(true)
}

/// Field-level validation shared by the dictionary-backed resolvers,
/// each failure with its own message.
fn validated_dictionary<'s>(
    assignment: &ResourceAssignment,
    session: &'s ResolutionSession,
    expected: SourceKind,
) -> Result<&'s ResourceDefinition, ResolutionError> {
    if assignment.name.trim().is_empty() {
        return Err(ResolutionError::MissingField {
            assignment: assignment.name.clone(),
            field: "name",
        });
    }
    if assignment.dictionary_name.trim().is_empty() {
        return Err(ResolutionError::MissingField {
            assignment: assignment.name.clone(),
            field: "dictionary-name",
        });
    }
    if assignment.dictionary_source != expected {
        return Err(ResolutionError::SourceMismatch {
            assignment: assignment.name.clone(),
            expected,
            found: assignment.dictionary_source,
        });
    }
    session.dictionary(&assignment.dictionary_name).ok_or_else(|| {
        ResolutionError::MissingDictionary {
            assignment: assignment.name.clone(),
            dictionary: assignment.dictionary_name.clone(),
        }
    })
}

/// Value for a mapped dictionary key: earlier-batch session writes win,
/// then the caller input store.
fn mapped_value(session: &ResolutionSession, key: &str) -> Option<Value> {
    if let Some(value) = session.value(key) {
        if !value.is_null() {
            return Some(value.clone());
        }
    }
    session.non_blank_input(key).map(|text| Value::String(text.to_string()))
}

/// Complex type referenced by the property, for field coercion during
/// shaping; `None` for purely primitive shapes.
fn complex_type_name(property: &PropertyDefinition) -> Option<&str> {
    if property.is_list() {
        property.entry_type().filter(|entry| !is_primitive_type(entry))
    } else if !property.is_primitive() {
        Some(&property.type_name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::PropertyDefinition;
    use crate::domain::request::ResolutionRequest;
    use crate::ports::{UnconfiguredRestconfClient, UnconfiguredSqlClient};
    use serde_json::json;

    fn empty_session() -> ResolutionSession {
        ResolutionSession::new(
            ResolutionRequest { assignments: Vec::new(), inputs: Default::default() },
            Default::default(),
        )
        .unwrap()
    }

    #[test]
    fn registry_serves_the_four_builtin_sources() {
        let registry = ResolverRegistry::new(
            Box::new(UnconfiguredSqlClient),
            Box::new(UnconfiguredRestconfClient),
        );
        let expected =
            [SourceKind::Input, SourceKind::Default, SourceKind::Db, SourceKind::Mdsal];
        assert_eq!(registry.registered_sources(), expected);
        for kind in expected {
            let resolver = registry.for_source(kind).unwrap();
            assert_eq!(resolver.source(), kind);
        }
        assert!(registry.for_source(SourceKind::Component).is_none());
    }

    #[test]
    fn can_handle_rejects_other_sources() {
        let registry = ResolverRegistry::new(
            Box::new(UnconfiguredSqlClient),
            Box::new(UnconfiguredRestconfClient),
        );
        let assignment = ResourceAssignment::new(
            "vnf-id",
            SourceKind::Input,
            PropertyDefinition::of_type("string"),
        );
        assert!(registry.for_source(SourceKind::Input).unwrap().can_handle(&assignment));
        assert!(!registry.for_source(SourceKind::Db).unwrap().can_handle(&assignment));
    }

    #[test]
    fn validation_reports_the_missing_dictionary() {
        let assignment = ResourceAssignment::new(
            "vnf-name",
            SourceKind::Db,
            PropertyDefinition::of_type("string"),
        );
        let session = empty_session();
        let err = validated_dictionary(&assignment, &session, SourceKind::Db).unwrap_err();
        assert_eq!(err.code(), "E_MISSING_DICTIONARY");
    }

    #[test]
    fn validation_reports_source_mismatch() {
        let assignment = ResourceAssignment::new(
            "vnf-name",
            SourceKind::Input,
            PropertyDefinition::of_type("string"),
        );
        let session = empty_session();
        let err = validated_dictionary(&assignment, &session, SourceKind::Db).unwrap_err();
        assert_eq!(err.code(), "E_SOURCE_MISMATCH");
    }

    #[test]
    fn mapped_values_prefer_session_writes_over_inputs() {
        let request = ResolutionRequest {
            assignments: Vec::new(),
            inputs: [("vnf-id".to_string(), "from-input".to_string())].into(),
        };
        let mut session = ResolutionSession::new(request, Default::default()).unwrap();
        assert_eq!(mapped_value(&session, "vnf-id"), Some(json!("from-input")));

        session.set_value("vnf-id", "vnf-id", json!("from-session"));
        assert_eq!(mapped_value(&session, "vnf-id"), Some(json!("from-session")));
        assert_eq!(mapped_value(&session, "absent"), None);
    }

    #[test]
    fn complex_type_is_detected_for_lists_and_objects() {
        let primitive = PropertyDefinition::of_type("string");
        assert_eq!(complex_type_name(&primitive), None);

        let complex = PropertyDefinition::of_type("vnf-info");
        assert_eq!(complex_type_name(&complex), Some("vnf-info"));

        let list: PropertyDefinition =
            serde_yaml::from_str("type: list\nentry-schema:\n  type: port-info").unwrap();
        assert_eq!(complex_type_name(&list), Some("port-info"));

        let primitive_list: PropertyDefinition =
            serde_yaml::from_str("type: list\nentry-schema:\n  type: string").unwrap();
        assert_eq!(complex_type_name(&primitive_list), None);
    }
}
