//! Report generation engine.
//!
//! Fans out one fetch task per repository, collects the results through a
//! channel barrier, and hands the gathered documents to the report
//! assembler.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;

use log::warn;

use crate::host::WorkflowHost;
use crate::repo::split_repo_no_err;
use crate::report::{Report, generate_report_from_workflows};

/// Everything fetched for one repository. Produced by exactly one fetch
/// task and consumed once by the collector.
struct RepoFetch {
    repo: String,
    workflows: Vec<String>,
    contributors: Vec<String>,
    advisories: Vec<String>,
}

/// Generate a duplication report for the given repository references.
///
/// Each repository is fetched on its own thread; the call blocks until
/// every fetch has completed. A repository that fails to fetch degrades
/// to empty documents rather than failing the report, so this function
/// always returns a report.
pub fn generate_report<H: WorkflowHost>(host: &H, repos: &[String]) -> Report {
    let mut workflows: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut contributors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut advisories: BTreeMap<String, Vec<String>> = BTreeMap::new();

    thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel();

        for reference in repos {
            let sender = sender.clone();
            scope.spawn(move || {
                let _ = sender.send(fetch_repo(host, reference));
            });
        }
        // The collector loop ends once every task has sent its result.
        drop(sender);

        while let Ok(fetch) = receiver.recv() {
            workflows.insert(fetch.repo.clone(), fetch.workflows);
            contributors.insert(fetch.repo.clone(), fetch.contributors);
            advisories.insert(fetch.repo, fetch.advisories);
        }
    });

    generate_report_from_workflows(&workflows, &contributors, &advisories)
}

/// Fetch one repository's workflow documents, contributors, and
/// advisories. Every fetch failure degrades to an empty result for that
/// piece of data.
fn fetch_repo<H: WorkflowHost + ?Sized>(host: &H, reference: &str) -> RepoFetch {
    let (owner, name) = split_repo_no_err(reference);
    let repo = format!("{owner}/{name}");

    let advisories = host.security_advisories(&owner, &name).unwrap_or_else(|error| {
        warn!("failed to fetch advisories for {repo}: {error}");
        Vec::new()
    });

    let workflow_files = host.find_workflows(&owner, &name).unwrap_or_else(|error| {
        warn!("failed to list workflows for {repo}: {error}");
        Vec::new()
    });

    let workflows = workflow_files
        .iter()
        .filter_map(|path| match host.workflow_content(&owner, &name, path) {
            Ok(content) if !content.is_empty() => Some(content),
            Ok(_) => None,
            Err(error) => {
                warn!("failed to fetch {repo} workflow {path}: {error}");
                None
            }
        })
        .collect();

    let mut contributors = Vec::new();
    for path in &workflow_files {
        let names = host
            .workflow_contributors(&owner, &name, path)
            .unwrap_or_else(|error| {
                warn!("failed to fetch contributors for {repo} workflow {path}: {error}");
                Vec::new()
            });
        for contributor in names {
            if !contributors.contains(&contributor) {
                contributors.push(contributor);
            }
        }
    }

    RepoFetch {
        repo,
        workflows,
        contributors,
        advisories,
    }
}
