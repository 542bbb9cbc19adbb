use std::fmt::Write as _;
use std::path::PathBuf;

use crate::app::commands::read_file;
use crate::domain::{ResolutionError, SourceKind, parse_dictionary_content};

/// Options for the dictionaries command.
#[derive(Debug, Default)]
pub struct DictionariesOptions {
    /// Resource dictionary file.
    pub dictionaries: PathBuf,
    /// Show this entry in full instead of the listing.
    pub name: Option<String>,
}

/// One row of the dictionary listing.
#[derive(Debug)]
pub struct DictionarySummary {
    pub name: String,
    pub type_name: String,
    pub sources: Vec<SourceKind>,
    pub updated_by: Option<String>,
}

/// What the dictionaries command produced.
#[derive(Debug)]
pub enum DictionariesOutcome {
    /// All entries, ordered by name.
    Listing(Vec<DictionarySummary>),
    /// One entry rendered as YAML.
    Detail(String),
}

/// Execute the dictionaries command.
pub fn execute(options: &DictionariesOptions) -> Result<DictionariesOutcome, ResolutionError> {
    let set = parse_dictionary_content(&read_file(&options.dictionaries, "dictionary file")?)?;

    if let Some(name) = &options.name {
        let definition = set.get(name).ok_or_else(|| {
            ResolutionError::config_error(format!(
                "Dictionary entry '{}' not found in '{}'",
                name,
                options.dictionaries.display()
            ))
        })?;
        let rendered = serde_yaml::to_string(definition)
            .map_err(|e| ResolutionError::parse_error("dictionary entry", e.to_string()))?;
        return Ok(DictionariesOutcome::Detail(rendered));
    }

    let summaries = set
        .dictionaries
        .values()
        .map(|definition| DictionarySummary {
            name: definition.name.clone(),
            type_name: definition.property.type_name.clone(),
            sources: definition.sources.declared(),
            updated_by: definition.updated_by.clone(),
        })
        .collect();
    Ok(DictionariesOutcome::Listing(summaries))
}

/// Render the outcome for the terminal.
pub fn render(outcome: &DictionariesOutcome) -> String {
    match outcome {
        DictionariesOutcome::Detail(yaml) => yaml.trim_end().to_string(),
        DictionariesOutcome::Listing(summaries) => {
            let mut out = String::new();
            let _ = writeln!(out, "{:<28} {:<10} {:<24} UPDATED-BY", "NAME", "TYPE", "SOURCES");
            for summary in summaries {
                let sources: Vec<&str> =
                    summary.sources.iter().map(|source| source.as_str()).collect();
                let _ = writeln!(
                    out,
                    "{:<28} {:<10} {:<24} {}",
                    summary.name,
                    summary.type_name,
                    sources.join(", "),
                    summary.updated_by.as_deref().unwrap_or("-")
                );
            }
            out.trim_end().to_string()
        }
    }
}
