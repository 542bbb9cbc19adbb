//! Resource assignment domain model.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend kind an assignment is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Caller-supplied value from the request input store.
    Input,
    /// Constant declared in the dictionary or the property definition.
    Default,
    /// Named-parameter SQL query through the `SqlClient` port.
    Db,
    /// RESTCONF-style HTTP GET through the `RestconfClient` port.
    Mdsal,
    /// Produced by an upstream component; no built-in resolver.
    Component,
}

impl SourceKind {
    /// All source kinds in dispatch-preference order.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Input,
        SourceKind::Default,
        SourceKind::Db,
        SourceKind::Mdsal,
        SourceKind::Component,
    ];

    /// Wire tag for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Input => "input",
            SourceKind::Default => "default",
            SourceKind::Db => "db",
            SourceKind::Mdsal => "mdsal",
            SourceKind::Component => "component",
        }
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: &str) -> Option<SourceKind> {
        match tag {
            "input" => Some(SourceKind::Input),
            "default" => Some(SourceKind::Default),
            "db" => Some(SourceKind::Db),
            "mdsal" => Some(SourceKind::Mdsal),
            "component" => Some(SourceKind::Component),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolution outcome recorded on each assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    /// Not yet attempted.
    #[default]
    Pending,
    /// A value was written to the session.
    Success,
    /// Resolution failed; `message` carries the reason.
    Failure,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Success => "success",
            AssignmentStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Primitive property type names; everything else except `list` is a
/// complex data-type reference.
pub const TYPE_STRING: &str = "string";
pub const TYPE_INTEGER: &str = "integer";
pub const TYPE_BOOLEAN: &str = "boolean";
pub const TYPE_FLOAT: &str = "float";
pub const TYPE_LIST: &str = "list";

/// True for the four primitive type names.
pub fn is_primitive_type(name: &str) -> bool {
    matches!(name, TYPE_STRING | TYPE_INTEGER | TYPE_BOOLEAN | TYPE_FLOAT)
}

/// Entry schema for `list` properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntrySchema {
    /// Element type: a primitive name or a data-type reference.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Declared shape of an assignment's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PropertyDefinition {
    /// Property type: primitive, `list`, or a data-type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether resolution must produce a value. Defaults to true.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Fallback value used by the `default` source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Element schema for `list` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_schema: Option<EntrySchema>,
}

fn default_required() -> bool {
    true
}

impl PropertyDefinition {
    /// Shorthand for a required property of the given type.
    pub fn of_type<S: Into<String>>(type_name: S) -> Self {
        PropertyDefinition {
            type_name: type_name.into(),
            description: None,
            required: true,
            default: None,
            entry_schema: None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        is_primitive_type(&self.type_name)
    }

    pub fn is_list(&self) -> bool {
        self.type_name == TYPE_LIST
    }

    /// Element type for lists; `None` when no entry schema is declared.
    pub fn entry_type(&self) -> Option<&str> {
        self.entry_schema.as_ref().map(|schema| schema.type_name.as_str())
    }
}

/// One named value to resolve for a configuration template.
///
/// Constructed by the caller, mutated in place by exactly one resolver
/// during its batch, never removed; the finished list is the output of
/// the whole operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceAssignment {
    /// Template key, unique within one request.
    pub name: String,
    /// Dictionary entry describing the sources; defaults to `name`.
    #[serde(default)]
    pub dictionary_name: String,
    /// Which backend resolves this assignment.
    pub dictionary_source: SourceKind,
    /// Declared value shape.
    pub property: PropertyDefinition,
    /// Names of assignments that must resolve before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Resolution outcome, written by the engine.
    #[serde(default)]
    pub status: AssignmentStatus,
    /// Failure reason when `status` is `failure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResourceAssignment {
    /// Create a pending assignment with `dictionary_name == name`.
    pub fn new<S: Into<String>>(
        name: S,
        source: SourceKind,
        property: PropertyDefinition,
    ) -> Self {
        let name = name.into();
        ResourceAssignment {
            dictionary_name: name.clone(),
            name,
            dictionary_source: source,
            property,
            dependencies: Vec::new(),
            status: AssignmentStatus::Pending,
            message: None,
        }
    }

    /// Fill derivable fields after deserialization: an omitted
    /// dictionary name falls back to the assignment name.
    pub fn normalize(&mut self) {
        if self.dictionary_name.trim().is_empty() {
            self.dictionary_name = self.name.clone();
        }
    }

    /// Whether the engine must fail this assignment when unresolved.
    pub fn is_required(&self) -> bool {
        self.property.required
    }

    pub fn mark_success(&mut self) {
        self.status = AssignmentStatus::Success;
        self.message = None;
    }

    pub fn mark_failure<S: Into<String>>(&mut self, message: S) {
        self.status = AssignmentStatus::Failure;
        self.message = Some(message.into());
    }
}
