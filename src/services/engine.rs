//! Resource-assignment component: the uniform execution lifecycle.
//!
//! One invocation walks `pre_condition` -> `pre_process` -> `process` ->
//! `post_process` over a single session, recording a transaction per
//! phase. Assignment failures are soft within their batch; the first one
//! stops the run before the next batch, because later batches read the
//! values earlier ones wrote.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn};

use crate::domain::assignment::ResourceAssignment;
use crate::domain::error::ResolutionError;
use crate::domain::session::ResolutionSession;
use crate::services::resolvers::{Resolver, ResolverRegistry};
use crate::services::sequencer::Sequencer;

const COMPONENT_NAME: &str = "resource-assignment";

/// Lifecycle phase of one component invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PreCondition,
    PreProcess,
    Process,
    PostProcess,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreCondition => "pre-condition",
            Phase::PreProcess => "pre-process",
            Phase::Process => "process",
            Phase::PostProcess => "post-process",
        }
    }
}

/// Final state of an invocation (or one phase of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentOutcome {
    /// The precondition gate declined the session; nothing ran.
    Skipped,
    Success,
    Failure,
}

impl ComponentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentOutcome::Skipped => "skipped",
            ComponentOutcome::Success => "success",
            ComponentOutcome::Failure => "failure",
        }
    }
}

/// One recorded lifecycle step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionRecord {
    pub component: &'static str,
    pub phase: Phase,
    pub status: ComponentOutcome,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// What one invocation produced, alongside the mutated session.
#[derive(Debug)]
pub struct ComponentReport {
    pub outcome: ComponentOutcome,
    /// First assignment failure of the stopping batch, when `outcome`
    /// is `Failure`.
    pub error: Option<ResolutionError>,
    pub records: Vec<TransactionRecord>,
}

/// Drives resolution of one session through the registered resolvers.
pub struct ResourceAssignmentComponent {
    registry: ResolverRegistry,
}

impl ResourceAssignmentComponent {
    pub fn new(registry: ResolverRegistry) -> Self {
        ResourceAssignmentComponent { registry }
    }

    /// Execute the full lifecycle.
    ///
    /// `Err` is reserved for fatal conditions (sequencing errors, an
    /// unregistered source); per-assignment failures come back as `Ok`
    /// with outcome `Failure` and the first error.
    pub fn execute(
        &self,
        session: &mut ResolutionSession,
    ) -> Result<ComponentReport, ResolutionError> {
        let span = info_span!("component", name = COMPONENT_NAME);
        let _guard = span.enter();
        let mut records: Vec<TransactionRecord> = Vec::new();

        if !self.pre_condition(session, &mut records) {
            return Ok(ComponentReport {
                outcome: ComponentOutcome::Skipped,
                error: None,
                records,
            });
        }

        let batches = self.pre_process(session, &mut records)?;
        let first_failure = self.process(session, batches, &mut records)?;
        let failed = first_failure.is_some();
        self.post_process(session, failed, &mut records);

        let outcome =
            if failed { ComponentOutcome::Failure } else { ComponentOutcome::Success };
        Ok(ComponentReport { outcome, error: first_failure, records })
    }

    /// Gate: a session with no assignments is skipped, not failed.
    fn pre_condition(
        &self,
        session: &ResolutionSession,
        records: &mut Vec<TransactionRecord>,
    ) -> bool {
        let started = Utc::now();
        if session.has_pending() {
            record(records, Phase::PreCondition, ComponentOutcome::Success, "accepted", started);
            true
        } else {
            info!("no assignments to resolve, skipping");
            record(
                records,
                Phase::PreCondition,
                ComponentOutcome::Skipped,
                "no resource assignments in the request",
                started,
            );
            false
        }
    }

    /// Sequence the pending assignments into batches.
    fn pre_process(
        &self,
        session: &mut ResolutionSession,
        records: &mut Vec<TransactionRecord>,
    ) -> Result<Vec<Vec<ResourceAssignment>>, ResolutionError> {
        let started = Utc::now();
        match Sequencer::sequence(session.take_pending()) {
            Ok(batches) => {
                debug!(batches = batches.len(), "sequenced assignments");
                record(
                    records,
                    Phase::PreProcess,
                    ComponentOutcome::Success,
                    format!("sequenced into {} batches", batches.len()),
                    started,
                );
                Ok(batches)
            }
            Err(failure) => {
                error!(%failure, "sequencing failed");
                Err(failure)
            }
        }
    }

    /// Resolve batch by batch. Within a batch every assignment is
    /// attempted; the first failing batch is also the last one.
    fn process(
        &self,
        session: &mut ResolutionSession,
        batches: Vec<Vec<ResourceAssignment>>,
        records: &mut Vec<TransactionRecord>,
    ) -> Result<Option<ResolutionError>, ResolutionError> {
        let started = Utc::now();
        let mut first_failure: Option<ResolutionError> = None;
        let mut attempted = 0usize;

        let mut remaining = batches.into_iter();
        for batch in remaining.by_ref() {
            let source = batch[0].dictionary_source;
            let Some(resolver) = self.registry.for_source(source) else {
                error!(
                    %source,
                    registered = ?self.registry.registered_sources(),
                    "no resolver registered"
                );
                return Err(ResolutionError::NoResolverForSource { kind: source });
            };

            debug!(%source, size = batch.len(), "processing batch");
            for mut assignment in batch {
                attempted += 1;
                match self.resolve_one(resolver, &mut assignment, session) {
                    Ok(()) => {}
                    Err(failure) if failure.is_assignment_scoped() => {
                        warn!(assignment = %assignment.name, %failure, "assignment failed");
                        session.record_failure(&assignment.name, &failure);
                        assignment.mark_failure(failure.to_string());
                        first_failure.get_or_insert(failure);
                    }
                    Err(fatal) => return Err(fatal),
                }
                session.archive(assignment);
            }

            if first_failure.is_some() {
                break;
            }
        }

        // Batches after a failed one are never attempted; archive them
        // still pending so the report shows the full picture.
        let mut untouched = 0usize;
        for batch in remaining {
            for assignment in batch {
                untouched += 1;
                session.archive(assignment);
            }
        }

        let (status, message) = match &first_failure {
            Some(failure) => (
                ComponentOutcome::Failure,
                format!("{attempted} attempted, {untouched} not attempted: {failure}"),
            ),
            None => (ComponentOutcome::Success, format!("{attempted} assignments resolved")),
        };
        record(records, Phase::Process, status, message, started);
        Ok(first_failure)
    }

    fn resolve_one(
        &self,
        resolver: &dyn Resolver,
        assignment: &mut ResourceAssignment,
        session: &mut ResolutionSession,
    ) -> Result<(), ResolutionError> {
        if !resolver.can_handle(assignment) {
            return Err(ResolutionError::SourceMismatch {
                assignment: assignment.name.clone(),
                expected: resolver.source(),
                found: assignment.dictionary_source,
            });
        }
        resolver.resolve(assignment, session)?;

        if session.has_value(&assignment.name) {
            debug!(assignment = %assignment.name, "resolved");
            assignment.mark_success();
            Ok(())
        } else if assignment.is_required() {
            Err(ResolutionError::MandatoryUnresolved {
                assignment: assignment.name.clone(),
                reason: format!(
                    "source '{}' produced no value",
                    assignment.dictionary_source
                ),
            })
        } else {
            debug!(assignment = %assignment.name, "optional assignment left unresolved");
            assignment.mark_success();
            Ok(())
        }
    }

    /// Close the run: the success path sweeps any still-pending status
    /// to success before the final record.
    fn post_process(
        &self,
        session: &mut ResolutionSession,
        failed: bool,
        records: &mut Vec<TransactionRecord>,
    ) {
        let started = Utc::now();
        if !failed {
            session.finish_pending_as_success();
        }
        let resolved = session.resolved_values().len();
        let failures = session.failures().len();
        let status = if failed { ComponentOutcome::Failure } else { ComponentOutcome::Success };
        record(
            records,
            Phase::PostProcess,
            status,
            format!("{resolved} values resolved, {failures} failures"),
            started,
        );
    }
}

fn record(
    records: &mut Vec<TransactionRecord>,
    phase: Phase,
    status: ComponentOutcome,
    message: impl Into<String>,
    started_at: DateTime<Utc>,
) {
    records.push(TransactionRecord {
        component: COMPONENT_NAME,
        phase,
        status,
        message: message.into(),
        started_at,
        finished_at: Utc::now(),
    });
}
