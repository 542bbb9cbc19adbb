use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::app::AppContext;
use crate::app::commands::{OutputFormat, read_file};
use crate::domain::{
    FailureRecord, ResolutionError, ResolutionSession, ResourceAssignment,
    parse_dictionary_content, parse_request_content,
};
use crate::services::{ComponentOutcome, TransactionRecord};

/// Options for the resolve command.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Resolution request file (YAML, or JSON).
    pub request: PathBuf,
    /// Resource dictionary file.
    pub dictionaries: PathBuf,
    /// Engine configuration file (TOML). Defaults apply when absent.
    pub config: Option<PathBuf>,
    /// SQL fixtures file backing the `db` source.
    pub fixtures: Option<PathBuf>,
    /// Extra caller inputs as `key=value`, overriding the request file.
    pub inputs: Vec<String>,
    /// Output rendering.
    pub format: OutputFormat,
}

/// Everything one resolve run produced, for rendering and exit codes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolveOutcome {
    pub outcome: ComponentOutcome,
    /// First assignment failure, as `CODE: message`, when the run failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub assignments: Vec<ResourceAssignment>,
    pub resolved: BTreeMap<String, Value>,
    pub failures: Vec<FailureRecord>,
    pub records: Vec<TransactionRecord>,
}

impl ResolveOutcome {
    /// True when the component finished with a failure outcome.
    pub fn failed(&self) -> bool {
        self.outcome == ComponentOutcome::Failure
    }
}

/// Execute the resolve command.
pub fn execute(
    ctx: AppContext,
    options: &ResolveOptions,
) -> Result<ResolveOutcome, ResolutionError> {
    let mut request = parse_request_content(&read_file(&options.request, "request file")?)?;
    let dictionaries =
        parse_dictionary_content(&read_file(&options.dictionaries, "dictionary file")?)?;

    for raw in &options.inputs {
        let (key, value) = parse_input_override(raw)?;
        request.inputs.insert(key, value);
    }

    let mut session = ResolutionSession::new(request, dictionaries)?;
    let report = ctx.into_component().execute(&mut session)?;

    Ok(ResolveOutcome {
        outcome: report.outcome,
        error: report
            .error
            .map(|error| format!("{}: {}", error.code(), error)),
        assignments: session.assignments().to_vec(),
        resolved: session.resolved_values().clone(),
        failures: session.failures().to_vec(),
        records: report.records,
    })
}

/// Render the outcome in the requested format.
pub fn render(outcome: &ResolveOutcome, format: OutputFormat) -> Result<String, ResolutionError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome)
            .map_err(|e| ResolutionError::parse_error("resolve outcome", e.to_string())),
        OutputFormat::Table => Ok(render_table(outcome)),
    }
}

fn render_table(outcome: &ResolveOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<28} {:<8} {:<8} VALUE", "NAME", "SOURCE", "STATUS");
    for assignment in &outcome.assignments {
        let value = outcome
            .resolved
            .get(&assignment.name)
            .map(render_value)
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<28} {:<8} {:<8} {}",
            assignment.name,
            assignment.dictionary_source.as_str(),
            assignment.status.as_str(),
            value
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Outcome: {}", outcome.outcome.as_str());
    for failure in &outcome.failures {
        let _ = writeln!(out, "  {} [{}]: {}", failure.assignment, failure.code, failure.message);
    }
    out.trim_end().to_string()
}

fn render_value(value: &Value) -> String {
    // Compact JSON; strings keep their quotes.
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

fn parse_input_override(raw: &str) -> Result<(String, String), ResolutionError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ResolutionError::config_error(format!(
            "Invalid input override '{}', expected key=value",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::EngineConfig;
    use crate::ports::{UnconfiguredRestconfClient, UnconfiguredSqlClient};

    const REQUEST: &str = r#"
assignments:
  - name: vnf-id
    dictionary-source: input
    property:
      type: string
  - name: port
    dictionary-source: default
    property:
      type: integer
      default: 8443
inputs:
  vnf-id: vnf001
"#;

    const DICTIONARIES: &str = r#"
dictionaries:
  - name: vnf-id
    property:
      type: string
    sources:
      input: {}
  - name: port
    property:
      type: integer
    sources:
      default: {}
"#;

    fn write_files(dir: &TempDir) -> (PathBuf, PathBuf) {
        let request = dir.path().join("request.yaml");
        let dictionaries = dir.path().join("dictionaries.yaml");
        fs::write(&request, REQUEST).unwrap();
        fs::write(&dictionaries, DICTIONARIES).unwrap();
        (request, dictionaries)
    }

    fn test_context() -> AppContext {
        AppContext::new(
            EngineConfig::default(),
            Box::new(UnconfiguredSqlClient),
            Box::new(UnconfiguredRestconfClient),
        )
    }

    #[test]
    fn execute_resolves_request_from_files() {
        let dir = TempDir::new().unwrap();
        let (request, dictionaries) = write_files(&dir);
        let options = ResolveOptions { request, dictionaries, ..ResolveOptions::default() };

        let outcome = execute(test_context(), &options).unwrap();

        assert_eq!(outcome.outcome, ComponentOutcome::Success);
        assert!(!outcome.failed());
        assert_eq!(outcome.resolved.get("vnf-id"), Some(&Value::from("vnf001")));
        assert_eq!(outcome.resolved.get("port"), Some(&Value::from(8443)));
    }

    #[test]
    fn execute_applies_input_overrides() {
        let dir = TempDir::new().unwrap();
        let (request, dictionaries) = write_files(&dir);
        let options = ResolveOptions {
            request,
            dictionaries,
            inputs: vec!["vnf-id=vnf777".to_string(), "port=9000".to_string()],
            ..ResolveOptions::default()
        };

        let outcome = execute(test_context(), &options).unwrap();

        assert_eq!(outcome.resolved.get("vnf-id"), Some(&Value::from("vnf777")));
        assert_eq!(outcome.resolved.get("port"), Some(&Value::from(9000)));
    }

    #[test]
    fn execute_rejects_malformed_overrides() {
        let dir = TempDir::new().unwrap();
        let (request, dictionaries) = write_files(&dir);
        let options = ResolveOptions {
            request,
            dictionaries,
            inputs: vec!["no-equals-sign".to_string()],
            ..ResolveOptions::default()
        };

        let error = execute(test_context(), &options).unwrap_err();
        assert_eq!(error.code(), "E_CONFIG");
    }

    #[test]
    fn execute_reports_missing_request_file() {
        let dir = TempDir::new().unwrap();
        let (_, dictionaries) = write_files(&dir);
        let options = ResolveOptions {
            request: dir.path().join("absent.yaml"),
            dictionaries,
            ..ResolveOptions::default()
        };

        let error = execute(test_context(), &options).unwrap_err();
        assert_eq!(error.code(), "E_CONFIG");
        assert!(error.to_string().contains("absent.yaml"));
    }

    #[test]
    fn table_rendering_lists_assignments_and_outcome() {
        let dir = TempDir::new().unwrap();
        let (request, dictionaries) = write_files(&dir);
        let options = ResolveOptions { request, dictionaries, ..ResolveOptions::default() };
        let outcome = execute(test_context(), &options).unwrap();

        let table = render(&outcome, OutputFormat::Table).unwrap();
        assert!(table.contains("vnf-id"));
        assert!(table.contains("\"vnf001\""));
        assert!(table.contains("Outcome: success"));
    }

    #[test]
    fn json_rendering_is_machine_readable() {
        let dir = TempDir::new().unwrap();
        let (request, dictionaries) = write_files(&dir);
        let options = ResolveOptions { request, dictionaries, ..ResolveOptions::default() };
        let outcome = execute(test_context(), &options).unwrap();

        let json = render(&outcome, OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["outcome"], "success");
        assert_eq!(parsed["resolved"]["vnf-id"], "vnf001");
    }
}
