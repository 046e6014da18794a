#![deny(missing_docs)]
//! Pipedrift core library.
//!
//! This crate contains the workflow normalization, fingerprinting, and
//! comparison primitives behind the pipedrift duplication report.

pub mod action;
pub mod compare;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod host;
pub mod repo;
pub mod report;
pub mod workflow;

pub use action::{Action, LATEST_VERSION, has_version_drift, split_uses};
pub use compare::{
    BUILT_IN_STEP, HIGH_SIMILARITY, find_steps_with_different_versions,
    find_steps_with_similar_config,
};
pub use engine::generate_report;
pub use error::{PipedriftError, Result};
pub use fingerprint::Fingerprint;
pub use host::WorkflowHost;
pub use repo::{sanitize_repo, split_repo, split_repo_no_err};
pub use report::{Report, RepoMeasurements, generate_report_from_workflows};
pub use workflow::parse_workflow;
