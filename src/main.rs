use std::env;
use std::fs;

use anyhow::{Context, Result};
use clap::Parser;

use manifest_publish::config;
use manifest_publish::error::ManifestPublishError;
use manifest_publish::host::GitHubHost;
use manifest_publish::publish::{ManifestRepo, PublicationResult, UploadOptions};
use manifest_publish::resolve::{self, ResolveInputs};
use manifest_publish::{manifest, ui};

#[derive(clap::Parser)]
#[command(
    name = "manifest-publish",
    about = "Publish package manifests to a shared manifest repository"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "API token (defaults to the GITHUB_TOKEN environment variable)")]
    token: Option<String>,

    #[arg(short, long, help = "Target manifest repository as owner/name")]
    repo: Option<String>,

    #[arg(short, long, help = "Target branch (repository default when omitted)")]
    branch: Option<String>,

    #[arg(short, long, help = "Package identifier, e.g. My.Package")]
    id: String,

    #[arg(short, long, help = "Path to the manifest template file")]
    manifest: String,

    #[arg(long = "version", value_name = "VERSION", help = "Explicit package version")]
    package_version: Option<String>,

    #[arg(long, help = "Download URL template (derived from the asset when omitted)")]
    url: Option<String>,

    #[arg(long, help = "Explicit SHA-256 checksum (computed from the URL when omitted)")]
    sha256: Option<String>,

    #[arg(long, help = "Commit/pull-request message template")]
    message: Option<String>,

    #[arg(long, help = "Repository holding the release (defaults to GITHUB_REPOSITORY)")]
    release_repo: Option<String>,

    #[arg(long, help = "Release tag or fully qualified ref (defaults to GITHUB_REF)")]
    release_tag: Option<String>,

    #[arg(long, help = "Regex matched against release asset names")]
    release_asset: Option<String>,

    #[arg(long, help = "Owner to fork into when publishing from a fork")]
    fork_owner: Option<String>,

    #[arg(long, help = "Always publish through a pull request")]
    always_use_pull_request: bool,

    #[arg(long, help = "Render the manifest without publishing anything")]
    dry_run: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;

    let repo = args.repo.unwrap_or(config.repo);
    let branch = args.branch.or(config.branch);
    let message_template = args.message.unwrap_or(config.message);
    let force_pull_request = args.always_use_pull_request || config.always_use_pull_request;
    let fork_owner = args.fork_owner.or(config.fork_owner);

    let token = args
        .token
        .or_else(|| env::var("GITHUB_TOKEN").ok())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ManifestPublishError::config("an API token is required (--token or GITHUB_TOKEN)")
        })?;

    if args.package_version.is_some() && args.release_asset.is_some() {
        ui::display_warning(
            "both an explicit version and a release asset pattern were given; using the explicit version only",
        );
    }

    let manifest_template = fs::read_to_string(&args.manifest)
        .with_context(|| format!("cannot read manifest template '{}'", args.manifest))?;
    let release_repo = args
        .release_repo
        .or_else(|| env::var("GITHUB_REPOSITORY").ok());
    let release_tag = args.release_tag.or_else(|| env::var("GITHUB_REF").ok());

    let host = GitHubHost::new(&token)?;

    ui::display_status("Resolving package version, URL and checksum...");
    let resolved = resolve::resolve_package(
        &host,
        &ResolveInputs {
            version: args.package_version.as_deref(),
            url: args.url.as_deref(),
            sha256: args.sha256.as_deref(),
            release_repo: release_repo.as_deref(),
            release_tag: release_tag.as_deref(),
            asset_pattern: args.release_asset.as_deref(),
        },
    )?;
    ui::display_success(&format!("Resolved version {}", resolved.version));

    let manifest_text = manifest::render_manifest(
        &manifest_template,
        &args.id,
        &resolved.version,
        &resolved.url,
        &resolved.sha256,
    )?;
    let file_path = manifest::manifest_file_path(&args.id, &resolved.version, &config.extension)?;
    let message = manifest::format_message(&message_template, &args.id, &file_path, &resolved.version)?;

    if args.dry_run {
        ui::display_dry_run(&file_path, &message, &manifest_text);
        return Ok(());
    }

    ui::display_status(&format!("Publishing manifest to '{}'...", repo));
    let manifest_repo = ManifestRepo::open(&host, &repo, branch.as_deref())?;
    let result = manifest_repo.upload_manifest(&UploadOptions {
        manifest: &manifest_text,
        file_path: &file_path,
        message: &message,
        force_pull_request,
        fork_owner: fork_owner.as_deref(),
    })?;

    match result {
        PublicationResult::Commit(commit) => {
            ui::display_success(&format!("Created commit '{}': {}", commit.sha, commit.url));
        }
        PublicationResult::PullRequest(pull) => {
            ui::display_success(&format!("Created pull request #{}: {}", pull.id, pull.url));
        }
    }

    Ok(())
}
