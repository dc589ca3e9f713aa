use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{ManifestPublishError, Result};
use crate::host::{Branch, Commit, PullRequest, ReleaseAsset, RepoHost, Repository};

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// [RepoHost] implementation over the GitHub REST API.
///
/// All calls are blocking and sequential; transport timeouts are left to
/// the client's defaults.
pub struct GitHubHost {
    client: Client,
    api_base: String,
}

#[derive(Deserialize)]
struct RepoResponse {
    default_branch: String,
    #[serde(default)]
    permissions: Option<PermissionsResponse>,
}

#[derive(Deserialize)]
struct PermissionsResponse {
    #[serde(default)]
    push: bool,
}

#[derive(Deserialize)]
struct BranchResponse {
    name: String,
    commit: BranchCommitResponse,
    #[serde(default)]
    protected: bool,
}

#[derive(Deserialize)]
struct BranchCommitResponse {
    sha: String,
}

#[derive(Deserialize)]
struct ContentsResponse {
    commit: CommitResponse,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: String,
}

#[derive(Deserialize)]
struct ForkResponse {
    name: String,
    owner: OwnerResponse,
}

#[derive(Deserialize)]
struct OwnerResponse {
    login: String,
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    #[serde(default)]
    assets: Vec<AssetResponse>,
}

#[derive(Deserialize)]
struct AssetResponse {
    name: String,
    url: String,
    browser_download_url: String,
}

impl GitHubHost {
    /// Build a host client authenticated with the given token.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Build a host client against a non-default API endpoint, e.g. a
    /// GitHub Enterprise installation.
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ManifestPublishError::config("token is not a valid header value"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .user_agent(concat!("manifest-publish/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(GitHubHost {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Maps a non-success response to the error taxonomy: 404 is a lookup
    /// failure, everything else a remote operation failure.
    fn check(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ManifestPublishError::lookup(context.to_string()));
        }
        if !status.is_success() {
            return Err(ManifestPublishError::remote(format!(
                "{} (status {})",
                context, status
            )));
        }

        Ok(response)
    }
}

impl RepoHost for GitHubHost {
    fn get_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        let response = self
            .client
            .get(self.url(&format!("/repos/{}/{}", owner, name)))
            .send()?;
        let data: RepoResponse = Self::check(
            response,
            &format!("failed to get repo '{}/{}'", owner, name),
        )?
        .json()?;

        Ok(Repository {
            owner: owner.to_string(),
            name: name.to_string(),
            default_branch: data.default_branch,
            can_push: data.permissions.map(|p| p.push).unwrap_or(false),
        })
    }

    fn get_branch(&self, owner: &str, name: &str, branch: &str) -> Result<Branch> {
        let response = self
            .client
            .get(self.url(&format!("/repos/{}/{}/branches/{}", owner, name, branch)))
            .send()?;
        let data: BranchResponse = Self::check(
            response,
            &format!(
                "failed to get branch information for '{}' in '{}/{}'",
                branch, owner, name
            ),
        )?
        .json()?;

        Ok(Branch {
            name: data.name,
            sha: data.commit.sha,
            is_protected: data.protected,
        })
    }

    fn create_branch(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        from_sha: &str,
    ) -> Result<Branch> {
        let response = self
            .client
            .post(self.url(&format!("/repos/{}/{}/git/refs", owner, name)))
            .json(&serde_json::json!({
                "ref": format!("refs/heads/{}", branch),
                "sha": from_sha,
            }))
            .send()?;
        Self::check(
            response,
            &format!(
                "failed to create branch '{}' at '{}' in '{}/{}'",
                branch, from_sha, owner, name
            ),
        )?;

        self.get_branch(owner, name, branch)
    }

    fn commit_file(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
        existing_blob: Option<&str>,
    ) -> Result<Commit> {
        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content),
            "branch": branch,
        });
        if let Some(blob) = existing_blob {
            body["sha"] = serde_json::Value::String(blob.to_string());
        }

        let response = self
            .client
            .put(self.url(&format!("/repos/{}/{}/contents/{}", owner, name, path)))
            .json(&body)
            .send()?;
        let data: ContentsResponse = Self::check(
            response,
            &format!(
                "failed to create commit on branch '{}' in '{}/{}'",
                branch, owner, name
            ),
        )?
        .json()?;

        Ok(Commit {
            sha: data.commit.sha,
            url: data.commit.html_url,
        })
    }

    fn create_fork(
        &self,
        owner: &str,
        name: &str,
        fork_owner: Option<&str>,
    ) -> Result<Repository> {
        let mut body = serde_json::json!({});
        if let Some(organization) = fork_owner {
            body["organization"] = serde_json::Value::String(organization.to_string());
        }

        let response = self
            .client
            .post(self.url(&format!("/repos/{}/{}/forks", owner, name)))
            .json(&body)
            .send()?;
        let data: ForkResponse = Self::check(
            response,
            &format!("failed to fork repo '{}/{}'", owner, name),
        )?
        .json()?;

        self.get_repository(&data.owner.login, &data.name)
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
        let response = self
            .client
            .post(self.url(&format!("/repos/{}/{}/pulls", owner, name)))
            .json(&serde_json::json!({
                "title": title,
                "head": head,
                "base": base,
                "body": body,
            }))
            .send()?;
        let data: PullResponse = Self::check(
            response,
            &format!(
                "failed to create pull request from '{}' to '{}' in '{}/{}'",
                head, base, owner, name
            ),
        )?
        .json()?;

        Ok(PullRequest {
            id: data.number,
            url: data.html_url,
        })
    }

    fn list_release_assets(&self, owner: &str, name: &str, tag: &str) -> Result<Vec<ReleaseAsset>> {
        let tag_name = tag.strip_prefix("refs/tags/").unwrap_or(tag);

        let response = self
            .client
            .get(self.url(&format!(
                "/repos/{}/{}/releases/tags/{}",
                owner, name, tag_name
            )))
            .send()?;
        let data: ReleaseResponse = Self::check(
            response,
            &format!(
                "failed to locate release with tag '{}' in '{}/{}'",
                tag_name, owner, name
            ),
        )?
        .json()?;

        Ok(data
            .assets
            .into_iter()
            .map(|asset| ReleaseAsset {
                name: asset.name,
                url: asset.url,
                download_url: asset.browser_download_url,
            })
            .collect())
    }
}
