//! Topological sequencing of resource assignments into source batches.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::domain::assignment::ResourceAssignment;
use crate::domain::error::ResolutionError;

/// Orders assignments so every dependency resolves before its dependents,
/// then groups the order into maximal single-source batches.
pub struct Sequencer;

impl Sequencer {
    /// Produce the batch plan for one request.
    ///
    /// Uses Kahn's algorithm with ties broken by input position, so the
    /// result is deterministic and equal-priority assignments keep their
    /// original relative order. Duplicate names, dependencies on unknown
    /// assignments, and cycles are typed fatal errors.
    pub fn sequence(
        assignments: Vec<ResourceAssignment>,
    ) -> Result<Vec<Vec<ResourceAssignment>>, ResolutionError> {
        if assignments.is_empty() {
            return Ok(Vec::new());
        }
        let order = Self::topological_order(assignments)?;
        Ok(Self::batch(order))
    }

    fn topological_order(
        assignments: Vec<ResourceAssignment>,
    ) -> Result<Vec<ResourceAssignment>, ResolutionError> {
        let mut position: BTreeMap<&str, usize> = BTreeMap::new();
        for (idx, assignment) in assignments.iter().enumerate() {
            if position.insert(assignment.name.as_str(), idx).is_some() {
                return Err(ResolutionError::DuplicateAssignment {
                    name: assignment.name.clone(),
                });
            }
        }

        // Edge dependency -> dependent; a dependency listed twice counts once.
        let mut in_degree = vec![0usize; assignments.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); assignments.len()];
        for (idx, assignment) in assignments.iter().enumerate() {
            let mut seen: BTreeSet<usize> = BTreeSet::new();
            for dependency in &assignment.dependencies {
                let Some(&dep_idx) = position.get(dependency.as_str()) else {
                    return Err(ResolutionError::UnknownDependency {
                        assignment: assignment.name.clone(),
                        dependency: dependency.clone(),
                    });
                };
                if seen.insert(dep_idx) {
                    in_degree[idx] += 1;
                    dependents[dep_idx].push(idx);
                }
            }
        }

        // Kahn's algorithm; the ready heap yields the earliest-submitted
        // assignment first.
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut order_indices: Vec<usize> = Vec::with_capacity(assignments.len());
        while let Some(Reverse(idx)) = ready.pop() {
            order_indices.push(idx);
            for &dependent in &dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order_indices.len() != assignments.len() {
            let remaining: Vec<&str> = assignments
                .iter()
                .enumerate()
                .filter(|(idx, _)| in_degree[*idx] > 0)
                .map(|(_, assignment)| assignment.name.as_str())
                .collect();
            return Err(ResolutionError::CyclicDependency { remaining: remaining.join(", ") });
        }

        let mut slots: Vec<Option<ResourceAssignment>> =
            assignments.into_iter().map(Some).collect();
        Ok(order_indices
            .into_iter()
            .map(|idx| slots[idx].take().expect("each index emitted once"))
            .collect())
    }

    /// Greedy left-to-right grouping: an assignment joins the current
    /// batch iff it shares the batch's source and none of its declared
    /// dependencies is already a member.
    fn batch(order: Vec<ResourceAssignment>) -> Vec<Vec<ResourceAssignment>> {
        let mut batches: Vec<Vec<ResourceAssignment>> = Vec::new();
        let mut current: Vec<ResourceAssignment> = Vec::new();
        let mut current_names: BTreeSet<String> = BTreeSet::new();

        for assignment in order {
            let same_source = current
                .last()
                .is_some_and(|previous| previous.dictionary_source == assignment.dictionary_source);
            let conflict =
                assignment.dependencies.iter().any(|dependency| current_names.contains(dependency));

            if !current.is_empty() && (!same_source || conflict) {
                batches.push(std::mem::take(&mut current));
                current_names.clear();
            }

            current_names.insert(assignment.name.clone());
            current.push(assignment);
        }

        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}
