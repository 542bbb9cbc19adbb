//! RESTCONF-backed source resolver.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::assignment::{ResourceAssignment, SourceKind};
use crate::domain::error::ResolutionError;
use crate::domain::session::ResolutionSession;
use crate::ports::RestconfClient;
use crate::services::shaping;

use super::{apply_input_override, complex_type_name, mapped_value, validated_dictionary, Resolver};

/// Resolves through the RESTCONF port: substitute the dictionary's
/// `url-path` placeholders, GET, then navigate `path` into the body.
///
/// Transport and status failures leave the assignment unresolved with a
/// warning; only the mandatory assertion turns that into a failure.
pub struct MdsalResolver {
    restconf: Box<dyn RestconfClient>,
}

impl MdsalResolver {
    pub fn new(restconf: Box<dyn RestconfClient>) -> Self {
        MdsalResolver { restconf }
    }
}

impl Resolver for MdsalResolver {
    fn source(&self) -> SourceKind {
        SourceKind::Mdsal
    }

    fn resolve(
        &self,
        assignment: &mut ResourceAssignment,
        session: &mut ResolutionSession,
    ) -> Result<(), ResolutionError> {
        if apply_input_override(assignment, session)? {
            return Ok(());
        }

        let dictionary = validated_dictionary(assignment, session, SourceKind::Mdsal)?;
        if assignment.property.type_name.trim().is_empty() {
            return Err(ResolutionError::MissingField {
                assignment: assignment.name.clone(),
                field: "property.type",
            });
        }
        let Some(mdsal) = dictionary.sources.mdsal.clone() else {
            return Err(ResolutionError::MissingSource {
                dictionary: assignment.dictionary_name.clone(),
                kind: SourceKind::Mdsal,
            });
        };
        if mdsal.url_path.trim().is_empty() {
            return Err(ResolutionError::MissingField {
                assignment: assignment.name.clone(),
                field: "sources.mdsal.url-path",
            });
        }
        if mdsal.path.trim().is_empty() {
            return Err(ResolutionError::MissingField {
                assignment: assignment.name.clone(),
                field: "sources.mdsal.path",
            });
        }

        let url = substitute_url(assignment, session, &mdsal.url_path, &mdsal.input_key_mapping)?;
        if url.contains('$') {
            warn!(assignment = %assignment.name, url, "url path still carries a placeholder");
        }

        let body = match self.restconf.get(&url) {
            Ok(body) => body,
            Err(error) if error.is_fetch_failure() => {
                warn!(assignment = %assignment.name, url, %error, "restconf fetch failed");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        if body.trim().is_empty() {
            warn!(assignment = %assignment.name, url, "restconf response body is empty");
            return Ok(());
        }
        let document: Value = match serde_json::from_str(&body) {
            Ok(document) => document,
            Err(error) => {
                warn!(assignment = %assignment.name, url, %error, "response body is not JSON");
                return Ok(());
            }
        };

        // Dictionary paths may omit the leading slash of the JSON pointer.
        let pointer = if mdsal.path.starts_with('/') {
            mdsal.path.clone()
        } else {
            format!("/{}", mdsal.path)
        };
        let Some(node) = document.pointer(&pointer) else {
            warn!(assignment = %assignment.name, pointer, "path not found in response body");
            return Ok(());
        };
        debug!(assignment = %assignment.name, pointer, "located response node");

        let records: Vec<Value> = match node {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        };
        let shaped = {
            let data_type = complex_type_name(&assignment.property)
                .and_then(|name| session.data_type(name));
            shaping::shape_records(assignment, &records, &mdsal.output_key_mapping, data_type)?
        };

        let Some(value) = shaped else {
            warn!(assignment = %assignment.name, "response node held no mapped value");
            return Ok(());
        };
        session.set_value(&assignment.name, &assignment.dictionary_name, value);
        Ok(())
    }
}

/// Fill each `$param` placeholder from the mapped dictionary key.
/// Longer names substitute first so `$vnf` cannot capture part of
/// `$vnf-id`.
fn substitute_url(
    assignment: &ResourceAssignment,
    session: &ResolutionSession,
    url_path: &str,
    input_key_mapping: &std::collections::BTreeMap<String, String>,
) -> Result<String, ResolutionError> {
    let mut parameters: Vec<(&String, &String)> = input_key_mapping.iter().collect();
    parameters.sort_by_key(|(parameter, _)| std::cmp::Reverse(parameter.len()));

    let mut url = url_path.to_string();
    for (parameter, key) in parameters {
        let placeholder = format!("${parameter}");
        if !url.contains(&placeholder) {
            continue;
        }
        let Some(value) = mapped_value(session, key) else {
            return Err(ResolutionError::UnresolvedParameter {
                assignment: assignment.name.clone(),
                parameter: parameter.clone(),
                key: key.clone(),
            });
        };
        url = url.replace(&placeholder, &path_text(&value));
    }
    Ok(url)
}

/// Textual form of a value inside a URL path; strings drop their quotes.
fn path_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
