//! Canned-row SQL client backed by a fixtures file.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::error::ResolutionError;
use crate::ports::{Row, SqlClient, SqlClientError};

/// One canned query result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SqlFixture {
    /// Query text, compared with collapsed whitespace.
    pub query: String,
    /// When present, the bound parameters must match exactly.
    #[serde(default)]
    pub params: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FixtureFile {
    #[serde(default)]
    fixtures: Vec<SqlFixture>,
}

/// SQL port over canned fixtures, for offline runs and tests.
///
/// An unmatched query is a loud error rather than an empty result, so a
/// typo in a dictionary query cannot pass for "zero rows".
#[derive(Debug, Clone, Default)]
pub struct FixtureSqlClient {
    fixtures: Vec<SqlFixture>,
}

impl FixtureSqlClient {
    pub fn new(fixtures: Vec<SqlFixture>) -> Self {
        FixtureSqlClient { fixtures }
    }

    /// Parse a fixtures file (YAML, or JSON as its subset).
    pub fn from_content(content: &str) -> Result<Self, ResolutionError> {
        let file: FixtureFile = serde_yaml::from_str(content)
            .map_err(|e| ResolutionError::parse_error("fixtures file", e.to_string()))?;
        Ok(FixtureSqlClient { fixtures: file.fixtures })
    }
}

fn normalized(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl SqlClient for FixtureSqlClient {
    fn query(
        &self,
        sql: &str,
        params: &BTreeMap<String, Value>,
    ) -> Result<Vec<Row>, SqlClientError> {
        let wanted = normalized(sql);
        for fixture in &self.fixtures {
            if normalized(&fixture.query) != wanted {
                continue;
            }
            if let Some(expected) = &fixture.params {
                if expected != params {
                    continue;
                }
            }
            debug!(rows = fixture.rows.len(), "fixture matched query");
            return Ok(fixture.rows.clone());
        }
        Err(SqlClientError::Query(format!("no fixture matches query '{wanted}'")))
    }
}
