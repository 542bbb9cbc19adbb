//! Resource dictionary model and file parser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::assignment::{PropertyDefinition, SourceKind};
use crate::domain::error::ResolutionError;

/// Alternate input-store key for the `input` source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Constant value for the `default` source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceDefault {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Named-parameter SQL query for the `db` source.
///
/// `query` uses `:param` placeholders; `input_key_mapping` maps each
/// parameter to the dictionary key whose resolved value fills it, and
/// `output_key_mapping` maps output fields to result columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceDb {
    pub query: String,
    #[serde(default)]
    pub input_key_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub output_key_mapping: BTreeMap<String, String>,
}

/// RESTCONF GET for the `mdsal` source.
///
/// `url_path` carries `$param` placeholders filled via
/// `input_key_mapping`; `path` is a JSON pointer into the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceMdsal {
    pub url_path: String,
    pub path: String,
    #[serde(default)]
    pub input_key_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub output_key_mapping: BTreeMap<String, String>,
}

/// Per-source definitions of one dictionary entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<SourceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SourceDefault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<SourceDb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdsal: Option<SourceMdsal>,
}

impl SourceCatalog {
    /// Source kinds this entry declares, in dispatch-preference order.
    pub fn declared(&self) -> Vec<SourceKind> {
        let mut kinds = Vec::new();
        if self.input.is_some() {
            kinds.push(SourceKind::Input);
        }
        if self.default.is_some() {
            kinds.push(SourceKind::Default);
        }
        if self.db.is_some() {
            kinds.push(SourceKind::Db);
        }
        if self.mdsal.is_some() {
            kinds.push(SourceKind::Mdsal);
        }
        kinds
    }
}

/// Read-only dictionary metadata describing how to fetch one named
/// resource's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceDefinition {
    pub name: String,
    pub property: PropertyDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default)]
    pub sources: SourceCatalog,
}

/// Field schema for a complex property type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataTypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDefinition>,
}

/// Loaded dictionary store: definitions by name plus the data types
/// referenced by complex properties.
#[derive(Debug, Clone, Default)]
pub struct DictionarySet {
    pub dictionaries: BTreeMap<String, ResourceDefinition>,
    pub data_types: BTreeMap<String, DataTypeDefinition>,
}

impl DictionarySet {
    pub fn get(&self, name: &str) -> Option<&ResourceDefinition> {
        self.dictionaries.get(name)
    }

    pub fn data_type(&self, name: &str) -> Option<&DataTypeDefinition> {
        self.data_types.get(name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DictionaryFile {
    #[serde(default)]
    dictionaries: Vec<ResourceDefinition>,
    #[serde(default)]
    data_types: BTreeMap<String, DataTypeDefinition>,
}

/// Parse and validate a dictionary file (YAML, or JSON — a YAML subset).
pub fn parse_dictionary_content(content: &str) -> Result<DictionarySet, ResolutionError> {
    let file: DictionaryFile = serde_yaml::from_str(content).map_err(|e| {
        ResolutionError::parse_error("dictionary file", e.to_string())
    })?;

    let mut dictionaries = BTreeMap::new();
    for definition in file.dictionaries {
        if definition.name.trim().is_empty() {
            return Err(ResolutionError::config_error(
                "Dictionary entry with blank name in dictionary file",
            ));
        }
        let name = definition.name.clone();
        if dictionaries.insert(name.clone(), definition).is_some() {
            return Err(ResolutionError::config_error(format!(
                "Duplicate dictionary entry '{name}' in dictionary file"
            )));
        }
    }

    Ok(DictionarySet { dictionaries, data_types: file.data_types })
}
