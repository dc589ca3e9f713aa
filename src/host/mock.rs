use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{ManifestPublishError, Result};
use crate::host::{Branch, Commit, PullRequest, ReleaseAsset, RepoHost, Repository};

/// A file commit recorded by [MockHost].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub repo: String,
    pub branch: String,
    pub path: String,
    pub content: String,
    pub message: String,
}

/// A pull request recorded by [MockHost].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub repo: String,
    pub base: String,
    pub head: String,
    pub title: String,
    pub body: String,
}

#[derive(Default)]
struct MockState {
    repos: HashMap<String, Repository>,
    branches: HashMap<String, Branch>,
    releases: HashMap<String, Vec<ReleaseAsset>>,
    created_branches: Vec<String>,
    commits: Vec<CommitRecord>,
    forks: Vec<String>,
    pull_requests: Vec<PullRequestRecord>,
    next_number: u64,
}

/// Mock hosting service for testing without network access.
///
/// Seed it with repositories, branches and releases, run the code under
/// test, then assert on the recorded operations.
pub struct MockHost {
    state: Mutex<MockState>,
    fork_login: String,
}

fn repo_key(owner: &str, name: &str) -> String {
    format!("{}/{}", owner, name)
}

fn branch_key(owner: &str, name: &str, branch: &str) -> String {
    format!("{}/{}@{}", owner, name, branch)
}

impl MockHost {
    /// Create a new empty mock host.
    pub fn new() -> Self {
        MockHost {
            state: Mutex::new(MockState::default()),
            fork_login: "fork-user".to_string(),
        }
    }

    /// Override the login forks land under when no fork owner is given.
    pub fn with_fork_login(mut self, login: impl Into<String>) -> Self {
        self.fork_login = login.into();
        self
    }

    /// Seed a repository snapshot.
    pub fn add_repository(&self, owner: &str, name: &str, default_branch: &str, can_push: bool) {
        self.state().repos.insert(
            repo_key(owner, name),
            Repository {
                owner: owner.to_string(),
                name: name.to_string(),
                default_branch: default_branch.to_string(),
                can_push,
            },
        );
    }

    /// Seed a branch snapshot.
    pub fn add_branch(&self, owner: &str, name: &str, branch: &str, sha: &str, is_protected: bool) {
        self.state().branches.insert(
            branch_key(owner, name, branch),
            Branch {
                name: branch.to_string(),
                sha: sha.to_string(),
                is_protected,
            },
        );
    }

    /// Seed a release and its assets under a tag.
    pub fn add_release(&self, owner: &str, name: &str, tag: &str, assets: Vec<ReleaseAsset>) {
        self.state()
            .releases
            .insert(format!("{}@{}", repo_key(owner, name), tag), assets);
    }

    /// Branch names created through the host, in order.
    pub fn created_branches(&self) -> Vec<String> {
        self.state().created_branches.clone()
    }

    /// File commits made through the host, in order.
    pub fn commits(&self) -> Vec<CommitRecord> {
        self.state().commits.clone()
    }

    /// Repositories that were forked, in order.
    pub fn forks(&self) -> Vec<String> {
        self.state().forks.clone()
    }

    /// Pull requests opened through the host, in order.
    pub fn pull_requests(&self) -> Vec<PullRequestRecord> {
        self.state().pull_requests.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panic while holding the lock only poisons test state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RepoHost for MockHost {
    fn get_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        self.state()
            .repos
            .get(&repo_key(owner, name))
            .cloned()
            .ok_or_else(|| {
                ManifestPublishError::lookup(format!("repo '{}/{}' not found", owner, name))
            })
    }

    fn get_branch(&self, owner: &str, name: &str, branch: &str) -> Result<Branch> {
        self.state()
            .branches
            .get(&branch_key(owner, name, branch))
            .cloned()
            .ok_or_else(|| {
                ManifestPublishError::lookup(format!(
                    "branch '{}' not found in '{}/{}'",
                    branch, owner, name
                ))
            })
    }

    fn create_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        from_sha: &str,
    ) -> Result<Branch> {
        let mut state = self.state();
        let key = branch_key(owner, name, branch);
        if state.branches.contains_key(&key) {
            return Err(ManifestPublishError::remote(format!(
                "ref conflict creating branch '{}' in '{}/{}'",
                branch, owner, name
            )));
        }

        let created = Branch {
            name: branch.to_string(),
            sha: from_sha.to_string(),
            is_protected: false,
        };
        state.branches.insert(key, created.clone());
        state.created_branches.push(branch.to_string());
        Ok(created)
    }

    fn commit_file(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
        _existing_blob: Option<&str>,
    ) -> Result<Commit> {
        let mut state = self.state();
        let key = branch_key(owner, name, branch);
        if !state.branches.contains_key(&key) {
            return Err(ManifestPublishError::lookup(format!(
                "branch '{}' not found in '{}/{}'",
                branch, owner, name
            )));
        }

        state.next_number += 1;
        let sha = format!("commit{}", state.next_number);
        if let Some(entry) = state.branches.get_mut(&key) {
            entry.sha = sha.clone();
        }

        state.commits.push(CommitRecord {
            repo: repo_key(owner, name),
            branch: branch.to_string(),
            path: path.to_string(),
            content: content.to_string(),
            message: message.to_string(),
        });

        Ok(Commit {
            url: format!("https://mock.invalid/{}/{}/commit/{}", owner, name, sha),
            sha,
        })
    }

    fn create_fork(
        &self,
        owner: &str,
        name: &str,
        fork_owner: Option<&str>,
    ) -> Result<Repository> {
        let source = self.get_repository(owner, name)?;
        let source_branch = self.get_branch(owner, name, &source.default_branch)?;

        let login = fork_owner.unwrap_or(&self.fork_login).to_string();
        let fork = Repository {
            owner: login.clone(),
            name: name.to_string(),
            default_branch: source.default_branch.clone(),
            can_push: true,
        };

        let mut state = self.state();
        state.repos.insert(repo_key(&login, name), fork.clone());
        state.branches.insert(
            branch_key(&login, name, &source.default_branch),
            Branch {
                name: source.default_branch,
                sha: source_branch.sha,
                is_protected: false,
            },
        );
        state.forks.push(repo_key(&login, name));
        Ok(fork)
    }

    fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let mut state = self.state();
        state.next_number += 1;
        let id = state.next_number;

        state.pull_requests.push(PullRequestRecord {
            repo: repo_key(owner, name),
            base: base.to_string(),
            head: head.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });

        Ok(PullRequest {
            id,
            url: format!("https://mock.invalid/{}/{}/pull/{}", owner, name, id),
        })
    }

    fn list_release_assets(&self, owner: &str, name: &str, tag: &str) -> Result<Vec<ReleaseAsset>> {
        let tag_name = tag.strip_prefix("refs/tags/").unwrap_or(tag);
        self.state()
            .releases
            .get(&format!("{}@{}", repo_key(owner, name), tag_name))
            .cloned()
            .ok_or_else(|| {
                ManifestPublishError::lookup(format!(
                    "failed to locate release with tag '{}' in '{}/{}'",
                    tag_name, owner, name
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_host_repository_lookup() {
        let host = MockHost::new();
        host.add_repository("owner", "repo", "main", true);

        let repo = host.get_repository("owner", "repo").unwrap();
        assert_eq!(repo.default_branch, "main");
        assert!(repo.can_push);
        assert!(host.get_repository("owner", "missing").is_err());
    }

    #[test]
    fn test_mock_host_branch_lifecycle() {
        let host = MockHost::new();
        host.add_repository("owner", "repo", "main", true);
        host.add_branch("owner", "repo", "main", "abc123", false);

        let created = host
            .create_branch("owner", "repo", "update-1", "abc123")
            .unwrap();
        assert_eq!(created.sha, "abc123");
        assert_eq!(host.created_branches(), vec!["update-1".to_string()]);

        // Creating the same branch again is a ref conflict
        let err = host
            .create_branch("owner", "repo", "update-1", "abc123")
            .unwrap_err();
        assert!(matches!(err, ManifestPublishError::Remote(_)));
    }

    #[test]
    fn test_mock_host_commit_advances_branch() {
        let host = MockHost::new();
        host.add_branch("owner", "repo", "main", "abc123", false);

        let commit = host
            .commit_file("owner", "repo", "main", "a/b.yaml", "text", "msg", None)
            .unwrap();
        let branch = host.get_branch("owner", "repo", "main").unwrap();
        assert_eq!(branch.sha, commit.sha);
        assert_eq!(host.commits().len(), 1);
    }

    #[test]
    fn test_mock_host_commit_to_missing_branch() {
        let host = MockHost::new();
        let err = host
            .commit_file("owner", "repo", "gone", "a.yaml", "x", "m", None)
            .unwrap_err();
        assert!(matches!(err, ManifestPublishError::Lookup(_)));
    }

    #[test]
    fn test_mock_host_fork_copies_default_branch() {
        let host = MockHost::new();
        host.add_repository("owner", "repo", "main", false);
        host.add_branch("owner", "repo", "main", "abc123", true);

        let fork = host.create_fork("owner", "repo", None).unwrap();
        assert_eq!(fork.owner, "fork-user");
        assert_eq!(fork.default_branch, "main");

        let fork_branch = host.get_branch("fork-user", "repo", "main").unwrap();
        assert_eq!(fork_branch.sha, "abc123");
        assert!(!fork_branch.is_protected);
    }

    #[test]
    fn test_mock_host_release_assets() {
        let host = MockHost::new();
        host.add_release(
            "owner",
            "repo",
            "v1.0",
            vec![ReleaseAsset {
                name: "tool-1.0.zip".to_string(),
                url: "https://mock.invalid/asset/1".to_string(),
                download_url: "https://mock.invalid/download/tool-1.0.zip".to_string(),
            }],
        );

        let assets = host
            .list_release_assets("owner", "repo", "refs/tags/v1.0")
            .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "tool-1.0.zip");
    }
}
