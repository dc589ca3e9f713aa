//! Repository hosting service abstraction layer
//!
//! This module provides a trait-based abstraction over the operations
//! manifest-publish needs from a repository hosting service, allowing for
//! multiple implementations including a real GitHub backend and a mock
//! implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [RepoHost] trait. The concrete
//! implementations include:
//!
//! - [github::GitHubHost]: A real implementation over the GitHub REST API
//! - [mock::MockHost]: A mock implementation for testing
//!
//! Most code should depend on the [RepoHost] trait rather than concrete
//! implementations to enable easy testing and flexibility.

pub mod github;
pub mod mock;

pub use github::GitHubHost;
pub use mock::MockHost;

use crate::error::{ManifestPublishError, Result};

/// A read-once snapshot of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    /// Name of the repository's default branch
    pub default_branch: String,
    /// Whether the acting credential may push directly to this repository
    pub can_push: bool,
}

/// A branch snapshot: name, tip commit and protection state.
///
/// Protected branches reject direct pushes by policy, forcing changes
/// through a reviewed pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub sha: String,
    pub is_protected: bool,
}

/// A created commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub url: String,
}

/// An opened pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub id: u64,
    pub url: String,
}

/// A downloadable artifact attached to a tagged release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub url: String,
    pub download_url: String,
}

/// Splits an `owner/name` repository reference into its two parts.
pub fn split_repo_name(owner_and_name: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = owner_and_name.split('/').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ManifestPublishError::config(format!(
            "invalid repo name '{}'",
            owner_and_name
        )));
    }

    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Common hosting service operation trait for abstraction
///
/// This trait captures the narrow capability set the publication router
/// needs: fetch repository/branch snapshots, commit a file, create a branch,
/// fork, open a pull request and list release assets.
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across
/// threads. Calls are made strictly sequentially; each operation completes
/// before the next begins.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations should map
/// underlying transport failures and non-success responses to
/// [crate::error::ManifestPublishError::Remote] with an operation-specific
/// message; a missing branch, release or repository maps to
/// [crate::error::ManifestPublishError::Lookup].
///
/// ## Implementations
///
/// - [GitHubHost](github::GitHubHost): Real backend over the GitHub REST API
/// - [MockHost](mock::MockHost): Test implementation recording operations
pub trait RepoHost: Send + Sync {
    /// Get a repository snapshot: default branch name and push permission.
    fn get_repository(&self, owner: &str, name: &str) -> Result<Repository>;

    /// Get a branch snapshot: tip commit sha and protection flag.
    fn get_branch(&self, owner: &str, name: &str, branch: &str) -> Result<Branch>;

    /// Create a branch at the given commit and return its snapshot.
    fn create_branch(&self, owner: &str, name: &str, branch: &str, from_sha: &str)
        -> Result<Branch>;

    /// Commit a single file to a branch.
    ///
    /// `existing_blob` carries the blob sha of the current file content when
    /// updating an existing file; pass `None` to create a new file.
    #[allow(clippy::too_many_arguments)]
    fn commit_file(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
        existing_blob: Option<&str>,
    ) -> Result<Commit>;

    /// Fork the repository, optionally into the given owner, and return the
    /// fork's snapshot.
    fn create_fork(&self, owner: &str, name: &str, fork_owner: Option<&str>)
        -> Result<Repository>;

    /// Open a pull request from `head` into `base`.
    ///
    /// A cross-repository head must be qualified as `owner:branch`.
    #[allow(clippy::too_many_arguments)]
    fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest>;

    /// List the assets attached to the release tagged `tag`.
    ///
    /// Implementations accept a fully qualified ref (`refs/tags/v1.0`) as
    /// well as a bare tag name.
    fn list_release_assets(&self, owner: &str, name: &str, tag: &str) -> Result<Vec<ReleaseAsset>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_repo_name() {
        let (owner, name) = split_repo_name("microsoft/winget-pkgs").unwrap();
        assert_eq!(owner, "microsoft");
        assert_eq!(name, "winget-pkgs");
    }

    #[test]
    fn test_split_repo_name_invalid() {
        assert!(split_repo_name("no-slash").is_err());
        assert!(split_repo_name("a/b/c").is_err());
        assert!(split_repo_name("/name").is_err());
        assert!(split_repo_name("owner/").is_err());
    }
}
