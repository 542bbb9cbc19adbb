//! Declared-constant source resolver.

use tracing::debug;

use crate::domain::assignment::{ResourceAssignment, SourceKind};
use crate::domain::error::ResolutionError;
use crate::domain::session::ResolutionSession;
use crate::services::shaping;

use super::{apply_input_override, Resolver};

/// Resolves to the constant the dictionary declares, falling back to the
/// property's own default. A caller input still wins.
pub struct DefaultResolver;

impl Resolver for DefaultResolver {
    fn source(&self) -> SourceKind {
        SourceKind::Default
    }

    fn resolve(
        &self,
        assignment: &mut ResourceAssignment,
        session: &mut ResolutionSession,
    ) -> Result<(), ResolutionError> {
        if apply_input_override(assignment, session)? {
            return Ok(());
        }

        let declared = session
            .dictionary(&assignment.dictionary_name)
            .and_then(|dictionary| dictionary.sources.default.as_ref())
            .and_then(|default| default.value.clone())
            .or_else(|| assignment.property.default.clone());

        let Some(raw) = declared else {
            debug!(assignment = %assignment.name, "no declared default, leaving unresolved");
            return Ok(());
        };

        let value = if assignment.property.is_primitive() {
            shaping::coerce_primitive(&assignment.name, &assignment.property.type_name, &raw)?
        } else {
            raw
        };
        session.set_value(&assignment.name, &assignment.dictionary_name, value);
        Ok(())
    }
}
