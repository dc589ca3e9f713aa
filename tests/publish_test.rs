// tests/publish_test.rs
use manifest_publish::host::MockHost;
use manifest_publish::publish::{
    decide_route, ManifestRepo, PublicationResult, Route, UploadOptions,
};
use manifest_publish::ManifestPublishError;

fn options<'a>(message: &'a str, force_pull_request: bool) -> UploadOptions<'a> {
    UploadOptions {
        manifest: "Id: My.Package\n",
        file_path: "manifests/m/My/Package/1.0.0/My.Package.yaml",
        message,
        force_pull_request,
        fork_owner: None,
    }
}

#[test]
fn test_route_decision_covers_all_combinations() {
    for force in [false, true] {
        for is_protected in [false, true] {
            // No push permission always forks
            assert_eq!(
                decide_route(false, is_protected, force),
                Route::ForkPullRequest
            );
        }

        // Push permission on a protected branch goes through a same-repo PR
        assert_eq!(decide_route(true, true, force), Route::SameRepoPullRequest);
    }

    assert_eq!(decide_route(true, false, true), Route::SameRepoPullRequest);
    assert_eq!(decide_route(true, false, false), Route::DirectCommit);
}

#[test]
fn test_direct_commit_route() {
    let host = MockHost::new();
    host.add_repository("org", "manifests", "main", true);
    host.add_branch("org", "manifests", "main", "base123", false);

    let repo = ManifestRepo::open(&host, "org/manifests", None).unwrap();
    let result = repo
        .upload_manifest(&options("Update My.Package to version 1.0.0", false))
        .unwrap();

    let commit = match result {
        PublicationResult::Commit(commit) => commit,
        PublicationResult::PullRequest(_) => panic!("expected a direct commit"),
    };
    assert!(!commit.sha.is_empty());
    assert!(!commit.url.is_empty());

    // Direct commits never create a branch or a pull request
    assert!(host.created_branches().is_empty());
    assert!(host.pull_requests().is_empty());
    assert!(host.forks().is_empty());

    let commits = host.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].repo, "org/manifests");
    assert_eq!(commits[0].branch, "main");
    assert_eq!(commits[0].message, "Update My.Package to version 1.0.0");
}

#[test]
fn test_same_repo_pull_request_route_on_protected_branch() {
    let host = MockHost::new();
    host.add_repository("org", "manifests", "main", true);
    host.add_branch("org", "manifests", "main", "base123", true);

    let repo = ManifestRepo::open(&host, "org/manifests", None).unwrap();
    let result = repo
        .upload_manifest(&options("Update My.Package\nDetails line", false))
        .unwrap();

    assert!(matches!(result, PublicationResult::PullRequest(_)));

    let branches = host.created_branches();
    assert_eq!(branches.len(), 1);
    assert!(branches[0].starts_with("update-"));

    let commits = host.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].branch, branches[0]);

    let pulls = host.pull_requests();
    assert_eq!(pulls.len(), 1);
    assert_eq!(pulls[0].repo, "org/manifests");
    assert_eq!(pulls[0].base, "main");
    assert_eq!(pulls[0].head, branches[0]);
    assert_eq!(pulls[0].title, "Update My.Package");
    assert_eq!(pulls[0].body, "Details line");
    assert!(host.forks().is_empty());
}

#[test]
fn test_forced_pull_request_on_unprotected_branch() {
    let host = MockHost::new();
    host.add_repository("org", "manifests", "main", true);
    host.add_branch("org", "manifests", "main", "base123", false);

    let repo = ManifestRepo::open(&host, "org/manifests", None).unwrap();
    let result = repo.upload_manifest(&options("Title only", true)).unwrap();

    assert!(matches!(result, PublicationResult::PullRequest(_)));
    assert_eq!(host.created_branches().len(), 1);

    let pulls = host.pull_requests();
    assert_eq!(pulls.len(), 1);
    assert_eq!(pulls[0].title, "Title only");
    assert_eq!(pulls[0].body, "");
}

#[test]
fn test_fork_pull_request_route() {
    let host = MockHost::new();
    host.add_repository("org", "manifests", "main", false);
    host.add_branch("org", "manifests", "main", "base123", true);

    let repo = ManifestRepo::open(&host, "org/manifests", None).unwrap();
    let result = repo
        .upload_manifest(&options("Update My.Package\nBody", false))
        .unwrap();

    assert!(matches!(result, PublicationResult::PullRequest(_)));

    // Exactly one fork, one commit, one pull request
    assert_eq!(host.forks(), vec!["fork-user/manifests".to_string()]);
    assert!(host.created_branches().is_empty());

    let commits = host.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].repo, "fork-user/manifests");
    assert_eq!(commits[0].branch, "main");

    // Head reference is qualified across owners; the PR targets the
    // original repository
    let pulls = host.pull_requests();
    assert_eq!(pulls.len(), 1);
    assert_eq!(pulls[0].repo, "org/manifests");
    assert_eq!(pulls[0].base, "main");
    assert_eq!(pulls[0].head, "fork-user:main");
}

#[test]
fn test_fork_route_honors_fork_owner_override() {
    let host = MockHost::new();
    host.add_repository("org", "manifests", "main", false);
    host.add_branch("org", "manifests", "main", "base123", false);

    let repo = ManifestRepo::open(&host, "org/manifests", None).unwrap();
    let result = repo
        .upload_manifest(&UploadOptions {
            fork_owner: Some("my-org"),
            ..options("Title", false)
        })
        .unwrap();

    assert!(matches!(result, PublicationResult::PullRequest(_)));
    assert_eq!(host.forks(), vec!["my-org/manifests".to_string()]);
    assert_eq!(host.pull_requests()[0].head, "my-org:main");
}

#[test]
fn test_open_with_explicit_branch() {
    let host = MockHost::new();
    host.add_repository("org", "manifests", "main", true);
    host.add_branch("org", "manifests", "main", "base123", false);
    host.add_branch("org", "manifests", "staging", "stage456", false);

    let repo = ManifestRepo::open(&host, "org/manifests", Some("staging")).unwrap();
    assert_eq!(repo.branch().name, "staging");
    assert_eq!(repo.branch().sha, "stage456");

    repo.upload_manifest(&options("msg", false)).unwrap();
    assert_eq!(host.commits()[0].branch, "staging");
}

#[test]
fn test_open_missing_repository_fails() {
    let host = MockHost::new();
    let err = ManifestRepo::open(&host, "org/missing", None).unwrap_err();
    assert!(matches!(err, ManifestPublishError::Lookup(_)));
}

#[test]
fn test_open_missing_branch_fails() {
    let host = MockHost::new();
    host.add_repository("org", "manifests", "main", true);

    let err = ManifestRepo::open(&host, "org/manifests", Some("gone")).unwrap_err();
    assert!(matches!(err, ManifestPublishError::Lookup(_)));
}

#[test]
fn test_invalid_repo_name_fails() {
    let host = MockHost::new();
    let err = ManifestRepo::open(&host, "not-a-repo-name", None).unwrap_err();
    assert!(matches!(err, ManifestPublishError::Config(_)));
}
