use regex::Regex;

use crate::error::{ManifestPublishError, Result};

/// An immutable package version.
///
/// Holds the raw version string and its ordered dot-separated components.
/// Parsing never fails: a string without a separator yields a single
/// component equal to the whole string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    raw: String,
    components: Vec<String>,
}

impl Version {
    /// Parses a raw version string by splitting on `.`.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let components = raw.split('.').map(str::to_string).collect();
        Version { raw, components }
    }

    /// The raw version string as supplied.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Joins the first `n` components back together with `.`.
    ///
    /// `None` yields the raw string, `Some(0)` the empty string, and an `n`
    /// beyond the available components yields whatever components exist.
    ///
    /// # Example
    /// ```
    /// use manifest_publish::version::Version;
    ///
    /// let version = Version::new("2.30.0.abc.8.9");
    /// assert_eq!(version.truncate(Some(1)), "2");
    /// assert_eq!(version.truncate(Some(2)), "2.30");
    /// assert_eq!(version.truncate(Some(3)), "2.30.0");
    /// assert_eq!(version.truncate(None), "2.30.0.abc.8.9");
    /// ```
    pub fn truncate(&self, components: Option<usize>) -> String {
        match components {
            None => self.raw.clone(),
            Some(n) => self.components[..n.min(self.components.len())].join("."),
        }
    }

    /// Resolves version placeholders embedded in arbitrary text.
    ///
    /// Two passes, in this order:
    /// 1. Regex rewrite specifiers of the form `{{version:s/SEARCH/REPLACEMENT/}}`.
    ///    Each distinct specifier is applied globally against the raw version
    ///    string, and every literal occurrence of the specifier in the text is
    ///    replaced with the result. A token that does not match the `s/…/…/`
    ///    shape is left untouched; a SEARCH that is not a valid pattern is a
    ///    [ManifestPublishError::Template] error.
    /// 2. The fixed placeholders `{{version}}`, `{{version.major}}`,
    ///    `{{version.major_minor}}` and `{{version.major_minor_patch}}`.
    ///
    /// The specifier pass runs first so the fixed tokens cannot be mistaken
    /// for (or injected into) specifier text. Text without any remaining
    /// placeholders is returned unchanged.
    pub fn render(&self, text: &str) -> Result<String> {
        let rendered = self.apply_specifiers(text)?;
        Ok(rendered
            .replace("{{version}}", &self.raw)
            .replace("{{version.major}}", &self.truncate(Some(1)))
            .replace("{{version.major_minor}}", &self.truncate(Some(2)))
            .replace("{{version.major_minor_patch}}", &self.truncate(Some(3))))
    }

    fn apply_specifiers(&self, text: &str) -> Result<String> {
        let token_re = internal_regex(r"\{\{version:.*?\}\}")?;
        let shape_re = internal_regex(r"^\{\{version:s/(.*)/(.*)/\}\}$")?;

        // Collect distinct specifier tokens up front, in first-seen order,
        // so substitution stays well-defined when a token repeats.
        let mut tokens: Vec<String> = Vec::new();
        for found in token_re.find_iter(text) {
            let token = found.as_str();
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }

        let mut out = text.to_string();
        for token in &tokens {
            let caps = match shape_re.captures(token) {
                Some(caps) => caps,
                // Shape mismatch is not an error; the token stays literal.
                None => continue,
            };

            let search = Regex::new(&caps[1]).map_err(|e| {
                ManifestPublishError::template(format!(
                    "invalid search pattern in specifier '{}': {}",
                    token, e
                ))
            })?;
            let replacement = brace_capture_refs(&caps[2])?;
            let value = search.replace_all(&self.raw, replacement.as_str());
            out = out.replace(token, &value);
        }

        Ok(out)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Rewrites `$1`-style capture references to the braced `${1}` form.
///
/// The regex crate reads `$name` greedily, so a replacement like `$6_$4`
/// would otherwise be taken as a capture named `6_`. An escaped dollar
/// (`$$`) is consumed as a unit and left alone, so `$$1` still renders a
/// literal `$1`.
fn brace_capture_refs(replacement: &str) -> Result<String> {
    let refs = internal_regex(r"\$\$|\$(\d+)")?;
    Ok(refs
        .replace_all(replacement, |caps: &regex::Captures<'_>| {
            match caps.get(1) {
                Some(digits) => format!("${{{}}}", digits.as_str()),
                None => caps[0].to_string(),
            }
        })
        .into_owned())
}

fn internal_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ManifestPublishError::template(format!("bad pattern '{}': {}", pattern, e)))
}
