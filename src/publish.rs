use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::host::{split_repo_name, Branch, Commit, PullRequest, RepoHost};

/// The three ways a manifest change can reach the target repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Commit straight to the target branch
    DirectCommit,
    /// Commit to a fresh branch and open a pull request in the same repo
    SameRepoPullRequest,
    /// Fork the repository, commit there, open a cross-repo pull request
    ForkPullRequest,
}

/// Outcome of a publish attempt: exactly one of a commit or a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationResult {
    Commit(Commit),
    PullRequest(PullRequest),
}

/// Options for a single manifest upload.
#[derive(Debug, Clone)]
pub struct UploadOptions<'a> {
    /// Fully rendered manifest text
    pub manifest: &'a str,
    /// Repository path the manifest lands at
    pub file_path: &'a str,
    /// Commit message; for PR routes the first line becomes the title
    pub message: &'a str,
    /// Use a pull request even when a direct commit would be permitted
    pub force_pull_request: bool,
    /// Owner to fork into when the fork route is taken
    pub fork_owner: Option<&'a str>,
}

/// Picks the publication route from the repository snapshot facts.
///
/// Deterministic priority order: no push permission always forks; push
/// permission with a protected branch or a forced-PR policy goes through a
/// same-repo pull request; otherwise the commit lands directly.
pub fn decide_route(can_push: bool, is_protected: bool, force_pull_request: bool) -> Route {
    if !can_push {
        Route::ForkPullRequest
    } else if is_protected || force_pull_request {
        Route::SameRepoPullRequest
    } else {
        Route::DirectCommit
    }
}

/// Splits a commit message into a pull request title and body.
///
/// A single line is the title with an empty body; otherwise the first line
/// is the title and the remaining lines are the body.
pub fn split_message(message: &str) -> (String, String) {
    match message.split_once('\n') {
        None => (message.to_string(), String::new()),
        Some((title, body)) => (title.to_string(), body.to_string()),
    }
}

fn unique_branch_name() -> String {
    // Time-derived, best effort; a same-millisecond collision surfaces as a
    // ref conflict from the host and aborts the run.
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("update-{}", millis)
}

/// The target manifest repository, snapshotted at open time.
///
/// Holds the branch the manifest is published against and drives the route
/// execution. State is fetched once; the single publish attempt assumes the
/// snapshot stays valid and performs no re-fetching or rollback.
pub struct ManifestRepo<'a> {
    host: &'a dyn RepoHost,
    owner: String,
    name: String,
    branch: Branch,
    can_push: bool,
}

impl std::fmt::Debug for ManifestRepo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestRepo")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("branch", &self.branch)
            .field("can_push", &self.can_push)
            .finish_non_exhaustive()
    }
}

impl<'a> ManifestRepo<'a> {
    /// Opens `owner/name`, targeting the given branch or the repository's
    /// default branch.
    pub fn open(host: &'a dyn RepoHost, repo_name: &str, branch: Option<&str>) -> Result<Self> {
        let (owner, name) = split_repo_name(repo_name)?;
        let repo = host.get_repository(&owner, &name)?;
        let branch_name = branch.unwrap_or(&repo.default_branch);
        let branch = host.get_branch(&owner, &name, branch_name)?;

        Ok(ManifestRepo {
            host,
            owner,
            name,
            branch,
            can_push: repo.can_push,
        })
    }

    /// The branch the manifest will be published against.
    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    /// The route a publish with this policy would take.
    pub fn route_for(&self, force_pull_request: bool) -> Route {
        decide_route(self.can_push, self.branch.is_protected, force_pull_request)
    }

    /// Publishes the manifest via the selected route.
    ///
    /// Host operations run strictly in sequence; the first failure aborts
    /// the attempt without trying another route and without undoing earlier
    /// remote side effects.
    pub fn upload_manifest(&self, options: &UploadOptions<'_>) -> Result<PublicationResult> {
        match self.route_for(options.force_pull_request) {
            Route::DirectCommit => {
                let commit = self.host.commit_file(
                    &self.owner,
                    &self.name,
                    &self.branch.name,
                    options.file_path,
                    options.manifest,
                    options.message,
                    None,
                )?;

                Ok(PublicationResult::Commit(commit))
            }
            Route::SameRepoPullRequest => {
                let work_branch = self.host.create_branch(
                    &self.owner,
                    &self.name,
                    &unique_branch_name(),
                    &self.branch.sha,
                )?;
                self.host.commit_file(
                    &self.owner,
                    &self.name,
                    &work_branch.name,
                    options.file_path,
                    options.manifest,
                    options.message,
                    None,
                )?;

                let (title, body) = split_message(options.message);
                let pull = self.host.create_pull_request(
                    &self.owner,
                    &self.name,
                    &self.branch.name,
                    &work_branch.name,
                    &title,
                    &body,
                )?;

                Ok(PublicationResult::PullRequest(pull))
            }
            Route::ForkPullRequest => {
                let fork = self
                    .host
                    .create_fork(&self.owner, &self.name, options.fork_owner)?;
                self.host.commit_file(
                    &fork.owner,
                    &fork.name,
                    &fork.default_branch,
                    options.file_path,
                    options.manifest,
                    options.message,
                    None,
                )?;

                let head = format!("{}:{}", fork.owner, fork.default_branch);
                let (title, body) = split_message(options.message);
                let pull = self.host.create_pull_request(
                    &self.owner,
                    &self.name,
                    &self.branch.name,
                    &head,
                    &title,
                    &body,
                )?;

                Ok(PublicationResult::PullRequest(pull))
            }
        }
    }
}
