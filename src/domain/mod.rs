pub mod assignment;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod request;
pub mod session;

pub use assignment::{
    AssignmentStatus, EntrySchema, PropertyDefinition, ResourceAssignment, SourceKind,
};
pub use config::{EngineConfig, MdsalConfig, parse_config_content};
pub use dictionary::{
    DataTypeDefinition, DictionarySet, ResourceDefinition, SourceCatalog, SourceDb, SourceDefault,
    SourceInput, SourceMdsal, parse_dictionary_content,
};
pub use error::ResolutionError;
pub use request::{ResolutionRequest, parse_request_content};
pub use session::{FailureRecord, ResolutionSession};
