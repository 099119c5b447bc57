//! Target rewriting per upstream family.
//!
//! # Responsibilities
//! - Turn `/blob/` links into `/raw/` links
//! - Build CDN-mirror URLs when mirror mode is on
//! - Produce the canonical `https://` URL with a normalized path

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::RelaySettings;
use crate::routing::matcher::UpstreamFamily;

/// Same shape as the blob-or-raw family pattern, so the separator found here
/// is the one classification matched on.
static BLOB_OR_RAW_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^((?:https?://)?github\.com/.+?/.+?)/(blob|raw)/")
        .expect("blob pattern is valid")
});

static BLOB_MIRROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?github\.com/([^/]+/[^/]+)/(?:blob|raw)/(.*)$")
        .expect("blob mirror pattern is valid")
});

static RAW_MIRROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?raw\.(?:githubusercontent|github)\.com/([^/]+/[^/]+)/(.+)$")
        .expect("raw mirror pattern is valid")
});

static SLASH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("slash pattern is valid"));

/// What the dispatcher should do with a classified target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Forward to this target (scheme optional, not yet normalized).
    Proxy(String),
    /// Answer with a 302 to this mirror URL.
    Redirect(String),
    /// Not an upstream target; serve this path from the asset origin.
    Asset(String),
}

/// Apply the family-specific rewrite rule to an embedded target.
pub fn rewrite(target: &str, family: UpstreamFamily, settings: &RelaySettings) -> RewriteOutcome {
    match family {
        UpstreamFamily::ReleaseOrArchive
        | UpstreamFamily::GistContent
        | UpstreamFamily::Tags
        | UpstreamFamily::GitSmartHttp => RewriteOutcome::Proxy(target.to_string()),
        UpstreamFamily::BlobOrRaw => {
            if settings.mirror_mode {
                if let Some(url) = mirror_url(&BLOB_MIRROR, target, &settings.mirror_base) {
                    return RewriteOutcome::Redirect(url);
                }
            }
            RewriteOutcome::Proxy(blob_to_raw(target))
        }
        UpstreamFamily::RawMirror => {
            if settings.mirror_mode {
                if let Some(url) = mirror_url(&RAW_MIRROR, target, &settings.mirror_base) {
                    return RewriteOutcome::Redirect(url);
                }
            }
            RewriteOutcome::Proxy(target.to_string())
        }
        UpstreamFamily::Unmatched => RewriteOutcome::Asset(target.to_string()),
    }
}

/// Swap the matched `/blob/` separator for `/raw/`. Raw links pass unchanged.
fn blob_to_raw(target: &str) -> String {
    match BLOB_OR_RAW_SEGMENT.captures(target) {
        Some(c) if c[2].eq_ignore_ascii_case("blob") => {
            let rest = &target[c.get(0).map_or(0, |m| m.end())..];
            format!("{}/raw/{}", &c[1], rest)
        }
        _ => target.to_string(),
    }
}

/// `<base>/owner/repo@ref/path` from a target whose first capture is
/// `owner/repo` and second is `ref/path`.
fn mirror_url(pattern: &Regex, target: &str, base: &str) -> Option<String> {
    let captures = pattern.captures(target)?;
    Some(format!(
        "{}/{}@{}",
        base.trim_end_matches('/'),
        &captures[1],
        &captures[2]
    ))
}

/// Collapse every run of two or more slashes into one.
pub fn normalize_path(path: &str) -> String {
    SLASH_RUN.replace_all(path, "/").into_owned()
}

/// Default the scheme to `https://`, parse, and normalize the path.
///
/// Only the path component is normalized; the query string is left alone.
pub fn canonical_url(target: &str) -> Result<Url, url::ParseError> {
    let absolute = if target.starts_with("https://") || target.starts_with("http://") {
        target.to_string()
    } else {
        format!("https://{target}")
    };

    let mut url = Url::parse(&absolute)?;
    let path = normalize_path(url.path());
    url.set_path(&path);
    Ok(url)
}
