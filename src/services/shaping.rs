//! Shaping of raw source records into typed JSON values.
//!
//! The DB and MDSAL resolvers both produce a list of raw records plus an
//! output key mapping; this module turns that pair into the value shape
//! the assignment's property declares (primitive, list of primitives,
//! list of objects, or a single object).

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::assignment::{
    is_primitive_type, ResourceAssignment, TYPE_BOOLEAN, TYPE_FLOAT, TYPE_INTEGER, TYPE_STRING,
};
use crate::domain::dictionary::DataTypeDefinition;
use crate::domain::error::ResolutionError;

/// JSON kind name used in coercion error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coercion_error(assignment: &str, expected: &str, found: String) -> ResolutionError {
    ResolutionError::Coercion {
        assignment: assignment.to_string(),
        expected: expected.to_string(),
        found,
    }
}

/// Coerce a scalar to the declared primitive type.
///
/// Null passes through untouched so the mandatory assertion can decide
/// what a missing value means for the assignment.
pub fn coerce_primitive(
    assignment: &str,
    type_name: &str,
    raw: &Value,
) -> Result<Value, ResolutionError> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match type_name {
        TYPE_STRING => match raw {
            Value::String(text) => Ok(Value::String(text.clone())),
            Value::Bool(_) | Value::Number(_) => Ok(Value::String(raw.to_string())),
            other => Err(coercion_error(assignment, TYPE_STRING, value_kind(other).to_string())),
        },
        TYPE_INTEGER => match raw {
            Value::Number(number) if number.as_i64().is_some() => Ok(raw.clone()),
            Value::String(text) => match text.trim().parse::<i64>() {
                Ok(parsed) => Ok(Value::from(parsed)),
                Err(_) => Err(coercion_error(
                    assignment,
                    TYPE_INTEGER,
                    format!("non-numeric string '{text}'"),
                )),
            },
            other => Err(coercion_error(assignment, TYPE_INTEGER, value_kind(other).to_string())),
        },
        TYPE_FLOAT => match raw {
            Value::Number(number) => match number.as_f64() {
                Some(parsed) => Ok(Value::from(parsed)),
                None => Err(coercion_error(assignment, TYPE_FLOAT, "out-of-range number".into())),
            },
            Value::String(text) => match text.trim().parse::<f64>() {
                Ok(parsed) => Ok(Value::from(parsed)),
                Err(_) => Err(coercion_error(
                    assignment,
                    TYPE_FLOAT,
                    format!("non-numeric string '{text}'"),
                )),
            },
            other => Err(coercion_error(assignment, TYPE_FLOAT, value_kind(other).to_string())),
        },
        TYPE_BOOLEAN => match raw {
            Value::Bool(_) => Ok(raw.clone()),
            Value::String(text) => match text.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(coercion_error(
                    assignment,
                    TYPE_BOOLEAN,
                    format!("non-boolean string '{other}'"),
                )),
            },
            other => Err(coercion_error(assignment, TYPE_BOOLEAN, value_kind(other).to_string())),
        },
        other => Err(ResolutionError::config_error(format!(
            "Unknown primitive type '{other}' for resource assignment '{assignment}'"
        ))),
    }
}

/// Coerce caller-supplied text to the declared property type.
///
/// Primitives parse from the text itself; `list` and complex values are
/// parsed as JSON.
pub fn coerce_text(
    assignment: &ResourceAssignment,
    text: &str,
) -> Result<Value, ResolutionError> {
    let property = &assignment.property;
    if property.is_primitive() {
        return coerce_primitive(
            &assignment.name,
            &property.type_name,
            &Value::String(text.to_string()),
        );
    }
    serde_json::from_str(text).map_err(|_| {
        coercion_error(
            &assignment.name,
            &property.type_name,
            format!("unparsable JSON text '{text}'"),
        )
    })
}

/// Shape raw records into the assignment's declared value.
///
/// Returns `Ok(None)` when the records hold nothing to project (empty
/// input, or every mapped field absent); the caller's mandatory
/// assertion decides whether that is a failure.
pub fn shape_records(
    assignment: &ResourceAssignment,
    records: &[Value],
    output_key_mapping: &BTreeMap<String, String>,
    data_type: Option<&DataTypeDefinition>,
) -> Result<Option<Value>, ResolutionError> {
    if records.is_empty() {
        return Ok(None);
    }
    let property = &assignment.property;

    if property.is_primitive() {
        return match project_scalar(assignment, &records[0], output_key_mapping)? {
            Some(raw) => {
                coerce_primitive(&assignment.name, &property.type_name, &raw).map(Some)
            }
            None => Ok(None),
        };
    }

    if property.is_list() {
        let entry_type = property.entry_type();
        if entry_type.is_some_and(is_primitive_type) {
            let entry_type = entry_type.unwrap_or(TYPE_STRING);
            let mut elements = Vec::with_capacity(records.len());
            for record in records {
                if let Some(raw) = project_scalar(assignment, record, output_key_mapping)? {
                    elements.push(coerce_primitive(&assignment.name, entry_type, &raw)?);
                }
            }
            return Ok(Some(Value::Array(elements)));
        }

        let mut elements = Vec::with_capacity(records.len());
        for record in records {
            if let Some(object) =
                project_object(assignment, record, output_key_mapping, data_type)?
            {
                elements.push(Value::Object(object));
            }
        }
        return Ok(Some(Value::Array(elements)));
    }

    Ok(project_object(assignment, &records[0], output_key_mapping, data_type)?
        .map(Value::Object))
}

/// Column to project for scalar shapes: the mapping entry keyed by the
/// dictionary name, else the sole mapping entry.
fn projected_column<'a>(
    assignment: &ResourceAssignment,
    output_key_mapping: &'a BTreeMap<String, String>,
) -> Option<&'a str> {
    output_key_mapping
        .get(&assignment.dictionary_name)
        .or_else(|| {
            if output_key_mapping.len() == 1 {
                output_key_mapping.values().next()
            } else {
                None
            }
        })
        .map(String::as_str)
}

fn project_scalar(
    assignment: &ResourceAssignment,
    record: &Value,
    output_key_mapping: &BTreeMap<String, String>,
) -> Result<Option<Value>, ResolutionError> {
    let Value::Object(fields) = record else {
        return Ok(Some(record.clone()));
    };
    let Some(column) = projected_column(assignment, output_key_mapping) else {
        warn!(
            assignment = %assignment.name,
            "no output key mapping selects a column for a scalar value"
        );
        return Ok(None);
    };
    match fields.get(column) {
        Some(raw) => Ok(Some(raw.clone())),
        None => {
            warn!(assignment = %assignment.name, column, "record has no mapped column");
            Ok(None)
        }
    }
}

/// Build one output object from a record: every mapping entry projects a
/// field, coerced when the data type declares a primitive shape for it.
/// An empty mapping passes the record through unchanged.
fn project_object(
    assignment: &ResourceAssignment,
    record: &Value,
    output_key_mapping: &BTreeMap<String, String>,
    data_type: Option<&DataTypeDefinition>,
) -> Result<Option<Map<String, Value>>, ResolutionError> {
    let Value::Object(fields) = record else {
        warn!(
            assignment = %assignment.name,
            found = value_kind(record),
            "expected an object record for a complex value"
        );
        return Ok(None);
    };
    if output_key_mapping.is_empty() {
        return Ok(Some(fields.clone()));
    }

    let mut object = Map::new();
    for (field, column) in output_key_mapping {
        let Some(raw) = fields.get(column) else {
            warn!(assignment = %assignment.name, field, column, "record has no mapped column");
            continue;
        };
        let field_type = data_type.and_then(|dt| dt.properties.get(field));
        let value = match field_type {
            Some(property) if property.is_primitive() => {
                coerce_primitive(&assignment.name, &property.type_name, raw)?
            }
            _ => raw.clone(),
        };
        object.insert(field.clone(), value);
    }
    Ok(Some(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::{PropertyDefinition, SourceKind};
    use serde_json::json;

    fn assignment_of(type_name: &str) -> ResourceAssignment {
        ResourceAssignment::new("vnf-name", SourceKind::Db, PropertyDefinition::of_type(type_name))
    }

    fn list_assignment(entry_type: &str) -> ResourceAssignment {
        let yaml = format!("type: list\nentry-schema:\n  type: {entry_type}");
        let property: PropertyDefinition = serde_yaml::from_str(&yaml).unwrap();
        ResourceAssignment::new("interfaces", SourceKind::Db, property)
    }

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn primitives_coerce_from_matching_scalars() {
        assert_eq!(coerce_primitive("a", "string", &json!("x")).unwrap(), json!("x"));
        assert_eq!(coerce_primitive("a", "integer", &json!(7)).unwrap(), json!(7));
        assert_eq!(coerce_primitive("a", "float", &json!(1.5)).unwrap(), json!(1.5));
        assert_eq!(coerce_primitive("a", "boolean", &json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn primitives_parse_from_strings() {
        assert_eq!(coerce_primitive("a", "integer", &json!("42")).unwrap(), json!(42));
        assert_eq!(coerce_primitive("a", "float", &json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(coerce_primitive("a", "boolean", &json!("false")).unwrap(), json!(false));
    }

    #[test]
    fn numbers_stringify_for_string_properties() {
        assert_eq!(coerce_primitive("a", "string", &json!(18800)).unwrap(), json!("18800"));
        assert_eq!(coerce_primitive("a", "string", &json!(true)).unwrap(), json!("true"));
    }

    #[test]
    fn null_passes_through() {
        assert_eq!(coerce_primitive("a", "integer", &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn mismatches_are_coercion_errors() {
        let err = coerce_primitive("port", "integer", &json!("not-a-number")).unwrap_err();
        assert_eq!(err.code(), "E_COERCION");
        assert!(err.to_string().contains("not-a-number"));

        let err = coerce_primitive("port", "integer", &json!({"nested": 1})).unwrap_err();
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn text_coerces_by_declared_type() {
        let value = coerce_text(&assignment_of("integer"), "42").unwrap();
        assert_eq!(value, json!(42));

        let value = coerce_text(&list_assignment("string"), r#"["a","b"]"#).unwrap();
        assert_eq!(value, json!(["a", "b"]));

        let err = coerce_text(&list_assignment("string"), "not json").unwrap_err();
        assert_eq!(err.code(), "E_COERCION");
    }

    #[test]
    fn scalar_shape_projects_the_mapped_column() {
        let assignment = assignment_of("string");
        let records = vec![json!({"vnf_name": "vnf-a", "other": 1})];
        let shaped = shape_records(
            &assignment,
            &records,
            &mapping(&[("vnf-name", "vnf_name")]),
            None,
        )
        .unwrap();
        assert_eq!(shaped, Some(json!("vnf-a")));
    }

    #[test]
    fn scalar_shape_accepts_bare_values() {
        let assignment = assignment_of("string");
        let shaped =
            shape_records(&assignment, &[json!("bare")], &BTreeMap::new(), None).unwrap();
        assert_eq!(shaped, Some(json!("bare")));
    }

    #[test]
    fn missing_mapped_column_yields_no_value() {
        let assignment = assignment_of("string");
        let records = vec![json!({"unrelated": "x"})];
        let shaped = shape_records(
            &assignment,
            &records,
            &mapping(&[("vnf-name", "vnf_name")]),
            None,
        )
        .unwrap();
        assert_eq!(shaped, None);
    }

    #[test]
    fn empty_records_yield_no_value() {
        let assignment = assignment_of("string");
        let shaped = shape_records(&assignment, &[], &BTreeMap::new(), None).unwrap();
        assert_eq!(shaped, None);
    }

    #[test]
    fn primitive_list_collects_one_element_per_record() {
        let assignment = list_assignment("string");
        let records = vec![
            json!({"if_name": "eth0"}),
            json!({"if_name": "eth1"}),
            json!({"if_name": "eth2"}),
        ];
        let shaped = shape_records(
            &assignment,
            &records,
            &mapping(&[("interfaces", "if_name")]),
            None,
        )
        .unwrap();
        assert_eq!(shaped, Some(json!(["eth0", "eth1", "eth2"])));
    }

    #[test]
    fn complex_list_builds_one_object_per_record() {
        let assignment = list_assignment("interface-info");
        let records = vec![
            json!({"if_name": "eth0", "if_speed": "1000"}),
            json!({"if_name": "eth1", "if_speed": "10000"}),
        ];
        let data_type: DataTypeDefinition = serde_yaml::from_str(
            "properties:\n  name:\n    type: string\n  speed:\n    type: integer",
        )
        .unwrap();
        let shaped = shape_records(
            &assignment,
            &records,
            &mapping(&[("name", "if_name"), ("speed", "if_speed")]),
            Some(&data_type),
        )
        .unwrap();
        assert_eq!(
            shaped,
            Some(json!([
                {"name": "eth0", "speed": 1000},
                {"name": "eth1", "speed": 10000},
            ]))
        );
    }

    #[test]
    fn complex_shape_uses_only_the_first_record() {
        let assignment = assignment_of("vnf-info");
        let records = vec![
            json!({"vnf_id": "vnf001", "vnf_name": "a"}),
            json!({"vnf_id": "vnf002", "vnf_name": "b"}),
        ];
        let shaped = shape_records(
            &assignment,
            &records,
            &mapping(&[("vnf-id", "vnf_id"), ("vnf-name", "vnf_name")]),
            None,
        )
        .unwrap();
        assert_eq!(shaped, Some(json!({"vnf-id": "vnf001", "vnf-name": "a"})));
    }

    #[test]
    fn empty_mapping_passes_the_record_through() {
        let assignment = assignment_of("vnf-info");
        let records = vec![json!({"anything": {"nested": true}})];
        let shaped = shape_records(&assignment, &records, &BTreeMap::new(), None).unwrap();
        assert_eq!(shaped, Some(json!({"anything": {"nested": true}})));
    }

    #[test]
    fn coercion_failure_inside_a_list_propagates() {
        let assignment = list_assignment("integer");
        let records = vec![json!({"port": "80"}), json!({"port": "abc"})];
        let err = shape_records(&assignment, &records, &mapping(&[("interfaces", "port")]), None)
            .unwrap_err();
        assert_eq!(err.code(), "E_COERCION");
    }
}
