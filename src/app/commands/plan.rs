use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::app::commands::{OutputFormat, read_file};
use crate::domain::{ResolutionError, SourceKind, parse_request_content};
use crate::services::Sequencer;

/// Options for the plan command.
#[derive(Debug, Default)]
pub struct PlanOptions {
    /// Resolution request file (YAML, or JSON).
    pub request: PathBuf,
    /// Output rendering.
    pub format: OutputFormat,
}

/// One source-homogeneous batch of the execution plan.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PlanBatch {
    /// 1-based position in execution order.
    pub index: usize,
    pub source: SourceKind,
    pub assignments: Vec<String>,
}

/// The batch plan a request would execute under.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PlanOutcome {
    pub batches: Vec<PlanBatch>,
}

/// Execute the plan command: sequence the request without resolving it.
pub fn execute(options: &PlanOptions) -> Result<PlanOutcome, ResolutionError> {
    let request = parse_request_content(&read_file(&options.request, "request file")?)?;
    let batches = Sequencer::sequence(request.assignments)?;

    let batches = batches
        .into_iter()
        .enumerate()
        .map(|(position, batch)| PlanBatch {
            index: position + 1,
            // Batches are source-homogeneous and never empty.
            source: batch[0].dictionary_source,
            assignments: batch.into_iter().map(|assignment| assignment.name).collect(),
        })
        .collect();

    Ok(PlanOutcome { batches })
}

/// Render the plan in the requested format.
pub fn render(outcome: &PlanOutcome, format: OutputFormat) -> Result<String, ResolutionError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome)
            .map_err(|e| ResolutionError::parse_error("plan outcome", e.to_string())),
        OutputFormat::Table => Ok(render_table(outcome)),
    }
}

fn render_table(outcome: &PlanOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {:<8} ASSIGNMENTS", "BATCH", "SOURCE");
    for batch in &outcome.batches {
        let _ = writeln!(
            out,
            "{:<6} {:<8} {}",
            batch.index,
            batch.source.as_str(),
            batch.assignments.join(", ")
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const REQUEST: &str = r#"
assignments:
  - name: vnf-id
    dictionary-source: input
    property:
      type: string
  - name: service-id
    dictionary-source: input
    property:
      type: string
  - name: vnf-name
    dictionary-source: db
    dependencies: [vnf-id]
    property:
      type: string
"#;

    fn write_request(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("request.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn execute_groups_assignments_into_batches() {
        let dir = TempDir::new().unwrap();
        let options =
            PlanOptions { request: write_request(&dir, REQUEST), ..PlanOptions::default() };

        let outcome = execute(&options).unwrap();

        assert_eq!(
            outcome.batches,
            vec![
                PlanBatch {
                    index: 1,
                    source: SourceKind::Input,
                    assignments: vec!["vnf-id".to_string(), "service-id".to_string()],
                },
                PlanBatch {
                    index: 2,
                    source: SourceKind::Db,
                    assignments: vec!["vnf-name".to_string()],
                },
            ]
        );
    }

    #[test]
    fn execute_surfaces_cycles() {
        let dir = TempDir::new().unwrap();
        let request = r#"
assignments:
  - name: a
    dictionary-source: input
    dependencies: [b]
    property:
      type: string
  - name: b
    dictionary-source: input
    dependencies: [a]
    property:
      type: string
"#;
        let options =
            PlanOptions { request: write_request(&dir, request), ..PlanOptions::default() };

        let error = execute(&options).unwrap_err();
        assert_eq!(error.code(), "E_CYCLE");
    }

    #[test]
    fn table_rendering_lists_batches_in_order() {
        let dir = TempDir::new().unwrap();
        let options =
            PlanOptions { request: write_request(&dir, REQUEST), ..PlanOptions::default() };
        let outcome = execute(&options).unwrap();

        let table = render(&outcome, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("BATCH"));
        assert!(lines[1].contains("vnf-id, service-id"));
        assert!(lines[2].contains("vnf-name"));
    }
}
