//! resolute: Resolve resource assignments from dictionary-defined sources.

pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

use app::{
    AppContext,
    commands::{dictionaries, plan, read_file, resolve},
};
use domain::{EngineConfig, parse_config_content};
use services::FixtureSqlClient;

pub use app::commands::OutputFormat;
pub use app::commands::dictionaries::{DictionariesOptions, DictionariesOutcome};
pub use app::commands::plan::{PlanBatch, PlanOptions, PlanOutcome};
pub use app::commands::resolve::{ResolveOptions, ResolveOutcome};
pub use domain::ResolutionError;

/// Resolve a request file against a dictionary file and print the outcome.
///
/// The returned outcome carries final assignment statuses, the resolved
/// value store, per-assignment failures, and the lifecycle records; the
/// caller decides the exit code from it.
pub fn resolve(options: ResolveOptions) -> Result<ResolveOutcome, ResolutionError> {
    let config = match &options.config {
        Some(path) => parse_config_content(&read_file(path, "config file")?)?,
        None => EngineConfig::default(),
    };
    let fixtures = match &options.fixtures {
        Some(path) => Some(FixtureSqlClient::from_content(&read_file(path, "fixtures file")?)?),
        None => None,
    };
    let ctx = AppContext::with_defaults(config, fixtures)?;

    let outcome = resolve::execute(ctx, &options)?;
    println!("{}", resolve::render(&outcome, options.format)?);
    Ok(outcome)
}

/// Print the batch plan a request would execute under, without resolving.
pub fn plan(options: PlanOptions) -> Result<PlanOutcome, ResolutionError> {
    let outcome = plan::execute(&options)?;
    println!("{}", plan::render(&outcome, options.format)?);
    Ok(outcome)
}

/// List a dictionary file's entries, or show one entry in full.
pub fn dictionaries(options: DictionariesOptions) -> Result<DictionariesOutcome, ResolutionError> {
    let outcome = dictionaries::execute(&options)?;
    println!("{}", dictionaries::render(&outcome));
    Ok(outcome)
}
