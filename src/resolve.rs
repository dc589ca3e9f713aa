use regex::Regex;

use crate::error::{ManifestPublishError, Result};
use crate::hash;
use crate::host::{split_repo_name, ReleaseAsset, RepoHost};
use crate::version::Version;

/// Raw inputs the version/URL/checksum resolution works from.
///
/// Explicit values always win; the release asset fills whatever is missing.
#[derive(Debug, Clone, Default)]
pub struct ResolveInputs<'a> {
    pub version: Option<&'a str>,
    pub url: Option<&'a str>,
    pub sha256: Option<&'a str>,
    pub release_repo: Option<&'a str>,
    pub release_tag: Option<&'a str>,
    pub asset_pattern: Option<&'a str>,
}

/// Fully resolved release facts for manifest rendering.
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub version: Version,
    pub url: String,
    pub sha256: String,
}

/// Resolves version, download URL and checksum.
///
/// Mutually required: either an explicit version or an asset-name pattern
/// must be supplied. An asset is located only when the version or the URL
/// has to be derived from it; the checksum, when not given, is computed by
/// streaming the resolved URL.
pub fn resolve_package(host: &dyn RepoHost, inputs: &ResolveInputs<'_>) -> Result<ResolvedPackage> {
    if inputs.version.is_none() && inputs.asset_pattern.is_none() {
        return Err(ManifestPublishError::config(
            "must specify either an explicit version or a release asset pattern",
        ));
    }

    let mut asset: Option<ReleaseAsset> = None;
    if inputs.version.is_none() || inputs.url.is_none() {
        asset = Some(locate_asset(host, inputs)?);
    }

    let version = match inputs.version {
        Some(version) => Version::new(version),
        None => {
            // locate_asset ran above whenever the version is derived
            let asset = asset.as_ref().ok_or_else(|| {
                ManifestPublishError::lookup("missing asset to compute version number from")
            })?;
            let pattern = compile_pattern(inputs.asset_pattern.unwrap_or_default())?;
            version_from_asset(&asset.name, &pattern)?
        }
    };

    let url = match inputs.url {
        Some(url) => version.render(url)?,
        None => {
            let asset = asset
                .as_ref()
                .ok_or_else(|| ManifestPublishError::lookup("missing asset to compute URL from"))?;
            asset.download_url.clone()
        }
    };

    let sha256 = match inputs.sha256 {
        Some(sha256) => sha256.to_string(),
        None => hash::compute_sha256(&url)?,
    };

    Ok(ResolvedPackage {
        version,
        url,
        sha256,
    })
}

fn locate_asset(host: &dyn RepoHost, inputs: &ResolveInputs<'_>) -> Result<ReleaseAsset> {
    let release_repo = inputs.release_repo.ok_or_else(|| {
        ManifestPublishError::config("a release repository is required to locate an asset")
    })?;
    let release_tag = inputs.release_tag.ok_or_else(|| {
        ManifestPublishError::config("a release tag is required to locate an asset")
    })?;
    let pattern_src = inputs.asset_pattern.ok_or_else(|| {
        ManifestPublishError::config("a release asset pattern is required to locate an asset")
    })?;

    let (owner, name) = split_repo_name(release_repo)?;
    let assets = host.list_release_assets(&owner, &name, release_tag)?;
    let pattern = compile_pattern(pattern_src)?;

    find_asset(&assets, &pattern).cloned().ok_or_else(|| {
        ManifestPublishError::lookup(format!(
            "unable to find an asset matching '{}' in repo '{}'",
            pattern_src, release_repo
        ))
    })
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ManifestPublishError::config(format!("invalid release asset pattern '{}': {}", pattern, e))
    })
}

/// First asset whose name matches the pattern, in listing order.
pub fn find_asset<'a>(assets: &'a [ReleaseAsset], pattern: &Regex) -> Option<&'a ReleaseAsset> {
    assets.iter().find(|asset| pattern.is_match(&asset.name))
}

/// Derives the package version from an asset name.
///
/// A capture group named `version` wins; otherwise the first capture group
/// is used. A pattern without a matching capture group is a lookup failure.
pub fn version_from_asset(asset_name: &str, pattern: &Regex) -> Result<Version> {
    let captures = pattern.captures(asset_name).ok_or_else(|| {
        ManifestPublishError::lookup(format!(
            "unable to match at least one capture group in asset name '{}' with pattern '{}'",
            asset_name, pattern
        ))
    })?;

    if let Some(named) = captures.name("version") {
        return Ok(Version::new(named.as_str()));
    }

    match captures.get(1) {
        Some(group) => Ok(Version::new(group.as_str())),
        None => Err(ManifestPublishError::lookup(format!(
            "unable to match at least one capture group in asset name '{}' with pattern '{}'",
            asset_name, pattern
        ))),
    }
}
