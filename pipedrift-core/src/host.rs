//! Hosting-service collaborator interface.

use crate::error::Result;

/// Read-only operations the report engine needs from a repository hosting
/// service.
///
/// Implementations talk to a real service over the network; the engine
/// treats every failure as an empty result for the affected repository,
/// so implementations should surface errors rather than paper over them.
#[cfg_attr(test, mockall::automock)]
pub trait WorkflowHost: Sync {
    /// List the workflow definition files in the repository's
    /// conventional workflow directory.
    fn find_workflows(&self, owner: &str, repo: &str) -> Result<Vec<String>>;

    /// Fetch the raw text of one workflow file.
    fn workflow_content(&self, owner: &str, repo: &str, path: &str) -> Result<String>;

    /// List the display names of committers who touched one workflow
    /// file. Implementations must exhaust pagination before returning.
    fn workflow_contributors(&self, owner: &str, repo: &str, path: &str) -> Result<Vec<String>>;

    /// List the security advisory identifiers published for the
    /// repository. Implementations must exhaust pagination before
    /// returning.
    fn security_advisories(&self, owner: &str, repo: &str) -> Result<Vec<String>>;
}
