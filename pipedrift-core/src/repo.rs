//! Repository reference parsing.

use crate::error::{PipedriftError, Result};

const HTTPS_PREFIX: &str = "https://github.com/";
const HOST_PREFIX: &str = "github.com/";
const GIT_SUFFIX: &str = ".git";

/// Strip the GitHub URL prefix and `.git` suffix from a repository reference.
///
/// Only the first occurrence of each marker is removed; anything else in the
/// reference is left untouched apart from surrounding whitespace.
pub fn sanitize_repo(repo: &str) -> String {
    let value = repo.replacen(HTTPS_PREFIX, "", 1);
    let value = value.replacen(HOST_PREFIX, "", 1);
    let value = value.replacen(GIT_SUFFIX, "", 1);
    value.trim().to_string()
}

/// Split a repository reference into its owner and name components.
///
/// Accepts `owner/name` or a full GitHub URL; any path segments after the
/// name are ignored. Fails when either component is empty after trimming.
pub fn split_repo(repo: &str) -> Result<(String, String)> {
    let sanitized = sanitize_repo(repo);
    let mut parts = sanitized.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let name = parts.next().unwrap_or("").trim();

    if owner.is_empty() || name.is_empty() {
        return Err(PipedriftError::InvalidRepo(repo.to_string()));
    }

    Ok((owner.to_string(), name.to_string()))
}

/// Variant of [`split_repo`] that yields empty strings instead of an error,
/// for call sites that must never abort on a single malformed reference.
pub fn split_repo_no_err(repo: &str) -> (String, String) {
    split_repo(repo).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{sanitize_repo, split_repo, split_repo_no_err};

    #[test]
    fn splits_plain_owner_name() {
        let (owner, name) = split_repo("owner/repo").expect("split");
        assert_eq!(owner, "owner");
        assert_eq!(name, "repo");
    }

    #[test]
    fn splits_https_url() {
        let (owner, name) = split_repo("https://github.com/owner/repo").expect("split");
        assert_eq!(owner, "owner");
        assert_eq!(name, "repo");
    }

    #[test]
    fn splits_bare_host_url() {
        let (owner, name) = split_repo("github.com/owner/repo").expect("split");
        assert_eq!(owner, "owner");
        assert_eq!(name, "repo");
    }

    #[test]
    fn strips_git_suffix() {
        let (owner, name) = split_repo("https://github.com/owner/repo.git").expect("split");
        assert_eq!(owner, "owner");
        assert_eq!(name, "repo");
    }

    #[test]
    fn ignores_trailing_path_segments() {
        let (owner, name) =
            split_repo("https://github.com/owner/repo/tree/main/src").expect("split");
        assert_eq!(owner, "owner");
        assert_eq!(name, "repo");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let (owner, name) = split_repo("  owner/repo  ").expect("split");
        assert_eq!(owner, "owner");
        assert_eq!(name, "repo");
    }

    #[test]
    fn rejects_missing_name() {
        assert!(split_repo("owner").is_err());
        assert!(split_repo("owner/").is_err());
        assert!(split_repo("/repo").is_err());
        assert!(split_repo("").is_err());
    }

    #[test]
    fn error_carries_original_reference() {
        let error = split_repo("owner").expect_err("should fail");
        assert_eq!(format!("{error}"), "invalid repository format: owner");
    }

    #[test]
    fn no_err_variant_yields_empty_components() {
        assert_eq!(split_repo_no_err("owner"), (String::new(), String::new()));
        assert_eq!(
            split_repo_no_err("owner/repo"),
            ("owner".to_string(), "repo".to_string())
        );
    }

    #[test]
    fn sanitize_removes_only_known_markers() {
        assert_eq!(sanitize_repo("https://github.com/owner/repo"), "owner/repo");
        assert_eq!(sanitize_repo("github.com/owner/repo"), "owner/repo");
        assert_eq!(sanitize_repo("owner/repo.git"), "owner/repo");
        assert_eq!(sanitize_repo("owner/repo"), "owner/repo");
    }
}
