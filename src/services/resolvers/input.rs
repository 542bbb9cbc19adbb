//! Caller-input source resolver.

use tracing::debug;

use crate::domain::assignment::{ResourceAssignment, SourceKind};
use crate::domain::error::ResolutionError;
use crate::domain::session::ResolutionSession;
use crate::services::shaping;

use super::Resolver;

/// Resolves from the caller's input store.
///
/// The dictionary entry is optional here; when present, `sources.input.key`
/// may redirect the lookup to another input name. The value itself never
/// comes from the dictionary.
pub struct InputResolver;

impl Resolver for InputResolver {
    fn source(&self) -> SourceKind {
        SourceKind::Input
    }

    fn resolve(
        &self,
        assignment: &mut ResourceAssignment,
        session: &mut ResolutionSession,
    ) -> Result<(), ResolutionError> {
        let key = session
            .dictionary(&assignment.dictionary_name)
            .and_then(|dictionary| dictionary.sources.input.as_ref())
            .and_then(|input| input.key.clone())
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| assignment.name.clone());

        let Some(text) = session.non_blank_input(&key).map(str::to_owned) else {
            debug!(assignment = %assignment.name, key, "no caller input, leaving unresolved");
            return Ok(());
        };

        let value = shaping::coerce_text(assignment, &text)?;
        session.set_value(&assignment.name, &assignment.dictionary_name, value);
        Ok(())
    }
}
