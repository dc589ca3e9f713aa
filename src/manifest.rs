use crate::error::{ManifestPublishError, Result};
use crate::version::Version;

/// Computes the repository path a manifest is published under.
///
/// Convention: `manifests/<first letter of id, lowercased>/<id with dots
/// replaced by path separators>/<version>/<id>.<extension>`.
pub fn manifest_file_path(id: &str, version: &Version, extension: &str) -> Result<String> {
    let first = id
        .chars()
        .next()
        .ok_or_else(|| ManifestPublishError::config("package id must not be empty"))?
        .to_lowercase();

    Ok(format!(
        "manifests/{}/{}/{}/{}.{}",
        first,
        id.replace('.', "/"),
        version,
        id,
        extension
    ))
}

/// Fills in the manifest template.
///
/// Replaces all occurrences of `{{id}}`, `{{sha256}}` and `{{url}}`, then
/// resolves the version placeholders via [Version::render].
pub fn render_manifest(
    template: &str,
    id: &str,
    version: &Version,
    url: &str,
    sha256: &str,
) -> Result<String> {
    let text = template
        .replace("{{id}}", id)
        .replace("{{sha256}}", sha256)
        .replace("{{url}}", url);

    version.render(&text)
}

/// Formats the commit/pull-request message from its template.
///
/// Supports the version placeholders plus `{{id}}` and `{{file}}`.
pub fn format_message(
    template: &str,
    id: &str,
    file_path: &str,
    version: &Version,
) -> Result<String> {
    Ok(version
        .render(template)?
        .replace("{{id}}", id)
        .replace("{{file}}", file_path))
}
