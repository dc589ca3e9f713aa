use std::io;

use sha2::{Digest, Sha256};

use crate::error::{ManifestPublishError, Result};

/// Computes the SHA-256 checksum of the content behind a URL.
///
/// The body is streamed through the hasher rather than buffered. Only http
/// and https schemes are accepted.
pub fn compute_sha256(url: &str) -> Result<String> {
    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("https://") && !lower.starts_with("http://") {
        return Err(ManifestPublishError::config(format!(
            "unknown scheme type in URL '{}'",
            url
        )));
    }

    let mut response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        return Err(ManifestPublishError::remote(format!(
            "failed to download '{}' (status {})",
            url,
            response.status()
        )));
    }

    digest_reader(&mut response)
}

fn digest_reader<R: io::Read>(reader: &mut R) -> Result<String> {
    let mut hasher = Sha256::new();
    io::copy(reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
