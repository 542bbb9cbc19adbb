//! SQL execution port definition.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// One result row: column name to JSON-typed cell value.
pub type Row = BTreeMap<String, Value>;

/// Failure modes of the SQL port.
#[derive(Debug, Error)]
pub enum SqlClientError {
    /// No database is wired into the engine.
    #[error("SQL client is not configured: {0}")]
    NotConfigured(String),

    /// The backing store rejected or failed the query.
    #[error("SQL query failed: {0}")]
    Query(String),
}

/// Port for named-parameter SQL execution.
///
/// The engine only depends on this contract; dialect, connection
/// handling, and pooling live behind the implementation.
pub trait SqlClient {
    /// Execute `sql` with `:name` placeholders bound from `params` and
    /// return all rows.
    fn query(
        &self,
        sql: &str,
        params: &BTreeMap<String, Value>,
    ) -> Result<Vec<Row>, SqlClientError>;
}

/// Placeholder client used when no database is wired; every query fails
/// with `NotConfigured`.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredSqlClient;

impl SqlClient for UnconfiguredSqlClient {
    fn query(
        &self,
        _sql: &str,
        _params: &BTreeMap<String, Value>,
    ) -> Result<Vec<Row>, SqlClientError> {
        Err(SqlClientError::NotConfigured(
            "no SQL client wired; provide fixtures or a SqlClient implementation".into(),
        ))
    }
}
