//! Report model and assembly.
//!
//! Builds the symmetric N x N comparison matrix and the repo-level
//! aggregates from already-fetched workflow documents. Everything here is
//! pure and single-threaded; the concurrent fetch lives in
//! [`crate::engine`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::action::Action;
use crate::compare::{
    BUILT_IN_STEP, find_steps_with_different_versions, find_steps_with_similar_config,
};
use crate::workflow::parse_workflow;

/// Drift and similarity findings for one pair of repositories.
///
/// The entry for (A, B) is always identical to the entry for (B, A).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoMeasurements {
    /// Unique reference ids invoked at different versions across the pair.
    pub steps_with_different_versions: Vec<String>,
    /// Number of unique step ids implicated by version drift.
    pub steps_with_different_versions_count: usize,
    /// Unique reference ids with near-duplicate configuration across the
    /// pair.
    pub steps_with_similar_config: Vec<String>,
    /// Number of unique step ids implicated by similar configuration.
    pub steps_with_similar_config_count: usize,
    /// Size of the union of drift-affected and similarity-affected step
    /// ids, i.e. the total steps to touch to reconcile the two
    /// repositories.
    pub duplication_risk_count: usize,
}

/// The full duplication report across all requested repositories.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Total repositories processed.
    pub repo_count: usize,
    /// Symmetric comparison matrix keyed by `owner/name` on both axes.
    /// A repository never appears as a key inside its own row.
    pub comparisons: BTreeMap<String, BTreeMap<String, RepoMeasurements>>,
    /// Committers who touched each repository's workflow files.
    pub contributors: BTreeMap<String, Vec<String>>,
    /// Deduplicated union of all contributor lists.
    pub unique_contributors: Vec<String>,
    /// Owner segments of every reference invoked by each repository's
    /// workflows.
    pub action_authors: BTreeMap<String, Vec<String>>,
    /// Security advisory identifiers associated with each repository.
    pub advisories: BTreeMap<String, Vec<String>>,
    /// Number of repositories with a positive duplication risk against at
    /// least one other repository.
    pub repos_with_duplication_or_drift: usize,
}

/// Assemble a [`Report`] from already-fetched workflow text.
///
/// All three maps are keyed by the normalized `owner/name` repository
/// key. Repositories present in `workflows` with an empty document list
/// still appear in the report; their comparisons simply find nothing.
pub fn generate_report_from_workflows(
    workflows: &BTreeMap<String, Vec<String>>,
    contributors: &BTreeMap<String, Vec<String>>,
    advisories: &BTreeMap<String, Vec<String>>,
) -> Report {
    let repo_actions = convert_workflows_to_actions(workflows);
    let repo_names: Vec<&String> = repo_actions.keys().collect();

    let mut report = Report {
        repo_count: repo_names.len(),
        ..Report::default()
    };

    for (index, &repo1) in repo_names.iter().enumerate() {
        let actions1 = &repo_actions[repo1];

        report.contributors.insert(
            repo1.clone(),
            contributors.get(repo1).cloned().unwrap_or_default(),
        );
        report.advisories.insert(
            repo1.clone(),
            advisories.get(repo1).cloned().unwrap_or_default(),
        );
        report
            .action_authors
            .insert(repo1.clone(), action_authors(actions1));

        for &repo2 in &repo_names[index + 1..] {
            let measurements = compare_repo_actions(actions1, &repo_actions[repo2]);

            // Symmetric relation: compute once, mirror.
            report
                .comparisons
                .entry(repo1.clone())
                .or_default()
                .insert(repo2.clone(), measurements.clone());
            report
                .comparisons
                .entry(repo2.clone())
                .or_default()
                .insert(repo1.clone(), measurements);
        }
    }

    report.repos_with_duplication_or_drift =
        count_repos_with_duplication_or_drift(&report.comparisons);
    report.unique_contributors = unique_values(report.contributors.values());

    report
}

/// Normalize each repository's documents into one flattened step list,
/// assigning globally unique document ids in sorted repository order.
fn convert_workflows_to_actions(
    workflows: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<Action>> {
    let mut repo_actions: BTreeMap<String, Vec<Action>> = BTreeMap::new();
    let mut document_id = 0usize;

    for (repo, documents) in workflows {
        let actions = repo_actions.entry(repo.clone()).or_default();
        for document in documents {
            document_id += 1;
            actions.extend(parse_workflow(document, document_id));
        }
    }

    repo_actions
}

fn compare_repo_actions(actions1: &[Action], actions2: &[Action]) -> RepoMeasurements {
    let (drift_ids, drift_references) = find_steps_with_different_versions(actions1, actions2);
    let (similar_ids, similar_references) = find_steps_with_similar_config(actions1, actions2);

    let risk_ids: BTreeSet<&String> = similar_ids.iter().chain(drift_ids.iter()).collect();

    RepoMeasurements {
        steps_with_different_versions: drift_references,
        steps_with_different_versions_count: drift_ids.len(),
        steps_with_similar_config: similar_references,
        steps_with_similar_config_count: similar_ids.len(),
        duplication_risk_count: risk_ids.len(),
    }
}

/// The first path segment of every reference a repository invokes,
/// deduplicated in first-seen order. Script steps map to the built-in
/// sentinel.
fn action_authors(actions: &[Action]) -> Vec<String> {
    let mut authors = Vec::new();
    for action in actions {
        let author = match action.uses.split('/').next() {
            Some("") | None => BUILT_IN_STEP,
            Some(owner) => owner,
        };
        if !authors.iter().any(|existing| existing == author) {
            authors.push(author.to_string());
        }
    }
    authors
}

fn count_repos_with_duplication_or_drift(
    comparisons: &BTreeMap<String, BTreeMap<String, RepoMeasurements>>,
) -> usize {
    comparisons
        .values()
        .filter(|entries| {
            entries
                .values()
                .any(|measurements| measurements.duplication_risk_count > 0)
        })
        .count()
}

fn unique_values<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    let mut values = Vec::new();
    for value in lists.flatten() {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }
    values
}
