//! SQL-backed source resolver.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::assignment::{ResourceAssignment, SourceKind};
use crate::domain::error::ResolutionError;
use crate::domain::session::ResolutionSession;
use crate::ports::SqlClient;
use crate::services::shaping;

use super::{apply_input_override, complex_type_name, mapped_value, validated_dictionary, Resolver};

/// Resolves through the SQL port with the dictionary's named-parameter
/// query.
pub struct DbResolver {
    sql: Box<dyn SqlClient>,
}

impl DbResolver {
    pub fn new(sql: Box<dyn SqlClient>) -> Self {
        DbResolver { sql }
    }
}

impl Resolver for DbResolver {
    fn source(&self) -> SourceKind {
        SourceKind::Db
    }

    fn resolve(
        &self,
        assignment: &mut ResourceAssignment,
        session: &mut ResolutionSession,
    ) -> Result<(), ResolutionError> {
        if apply_input_override(assignment, session)? {
            return Ok(());
        }

        let dictionary = validated_dictionary(assignment, session, SourceKind::Db)?;
        let Some(db) = dictionary.sources.db.clone() else {
            return Err(ResolutionError::MissingSource {
                dictionary: assignment.dictionary_name.clone(),
                kind: SourceKind::Db,
            });
        };
        if db.query.trim().is_empty() {
            return Err(ResolutionError::MissingField {
                assignment: assignment.name.clone(),
                field: "sources.db.query",
            });
        }

        let mut params: BTreeMap<String, Value> = BTreeMap::new();
        for (parameter, key) in &db.input_key_mapping {
            let Some(value) = mapped_value(session, key) else {
                return Err(ResolutionError::UnresolvedParameter {
                    assignment: assignment.name.clone(),
                    parameter: parameter.clone(),
                    key: key.clone(),
                });
            };
            params.insert(parameter.clone(), value);
        }

        debug!(assignment = %assignment.name, query = %db.query, "executing dictionary query");
        let rows = self.sql.query(&db.query, &params)?;
        if rows.is_empty() {
            warn!(assignment = %assignment.name, "query returned no rows");
            return Ok(());
        }

        let records: Vec<Value> =
            rows.into_iter().map(|row| Value::Object(row.into_iter().collect())).collect();
        let shaped = {
            let data_type = complex_type_name(&assignment.property)
                .and_then(|name| session.data_type(name));
            shaping::shape_records(assignment, &records, &db.output_key_mapping, data_type)?
        };

        let Some(value) = shaped else {
            warn!(assignment = %assignment.name, "rows held no mapped value");
            return Ok(());
        };
        session.set_value(&assignment.name, &assignment.dictionary_name, value);
        Ok(())
    }
}
