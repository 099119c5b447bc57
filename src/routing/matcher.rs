//! Upstream family classification.
//!
//! # Responsibilities
//! - Decide which upstream family an embedded target belongs to
//! - Tell redirect handling whether a location is worth handing back
//!
//! # Design Decisions
//! - Patterns are anchored at the start of the string and case-insensitive
//! - The scheme is optional (`github.com/...` and `https://github.com/...`)
//! - Ordered table, first match wins

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// The upstream a target URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamFamily {
    /// `github.com/owner/repo/releases/...` or `/archive/...`
    ReleaseOrArchive,
    /// `github.com/owner/repo/blob/...` or `/raw/...`
    BlobOrRaw,
    /// `github.com/owner/repo/info/...` or `/git-...` (smart HTTP)
    GitSmartHttp,
    /// `raw.githubusercontent.com/owner/repo/ref/path`
    RawMirror,
    /// `gist.githubusercontent.com/owner/id/...`
    GistContent,
    /// `github.com/owner/repo/tags...`
    Tags,
    /// Anything else; served from the static-asset origin.
    Unmatched,
}

impl UpstreamFamily {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamFamily::ReleaseOrArchive => "release_or_archive",
            UpstreamFamily::BlobOrRaw => "blob_or_raw",
            UpstreamFamily::GitSmartHttp => "git_smart_http",
            UpstreamFamily::RawMirror => "raw_mirror",
            UpstreamFamily::GistContent => "gist_content",
            UpstreamFamily::Tags => "tags",
            UpstreamFamily::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for UpstreamFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PATTERN_TABLE: &[(&str, UpstreamFamily)] = &[
    (
        r"(?i)^(?:https?://)?github\.com/.+?/.+?/(?:releases|archive)/.*$",
        UpstreamFamily::ReleaseOrArchive,
    ),
    (
        r"(?i)^(?:https?://)?github\.com/.+?/.+?/(?:blob|raw)/.*$",
        UpstreamFamily::BlobOrRaw,
    ),
    (
        r"(?i)^(?:https?://)?github\.com/.+?/.+?/(?:info|git-).*$",
        UpstreamFamily::GitSmartHttp,
    ),
    (
        r"(?i)^(?:https?://)?raw\.(?:githubusercontent|github)\.com/.+?/.+?/.+?/.+$",
        UpstreamFamily::RawMirror,
    ),
    (
        r"(?i)^(?:https?://)?gist\.(?:githubusercontent|github)\.com/.+?/.+?/.+$",
        UpstreamFamily::GistContent,
    ),
    (
        r"(?i)^(?:https?://)?github\.com/.+?/.+?/tags.*$",
        UpstreamFamily::Tags,
    ),
];

static PATTERNS: LazyLock<Vec<(Regex, UpstreamFamily)>> = LazyLock::new(|| {
    PATTERN_TABLE
        .iter()
        .map(|(pattern, family)| {
            let regex = Regex::new(pattern).expect("upstream pattern table is valid");
            (regex, *family)
        })
        .collect()
});

/// Classify a target URL (scheme optional) into its upstream family.
pub fn classify(url: &str) -> UpstreamFamily {
    PATTERNS
        .iter()
        .find(|(regex, _)| regex.is_match(url))
        .map(|(_, family)| *family)
        .unwrap_or(UpstreamFamily::Unmatched)
}

/// Returns true if the URL belongs to any known upstream family.
pub fn is_upstream_like(url: &str) -> bool {
    classify(url) != UpstreamFamily::Unmatched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_family() {
        let cases = [
            (
                "https://github.com/owner/repo/releases/download/v1/a.tar.gz",
                UpstreamFamily::ReleaseOrArchive,
            ),
            (
                "github.com/owner/repo/archive/refs/heads/main.zip",
                UpstreamFamily::ReleaseOrArchive,
            ),
            (
                "https://github.com/owner/repo/blob/main/README.md",
                UpstreamFamily::BlobOrRaw,
            ),
            ("github.com/owner/repo/raw/main/x", UpstreamFamily::BlobOrRaw),
            (
                "https://github.com/owner/repo/info/refs?service=git-upload-pack",
                UpstreamFamily::GitSmartHttp,
            ),
            (
                "https://github.com/owner/repo/git-upload-pack",
                UpstreamFamily::GitSmartHttp,
            ),
            (
                "https://raw.githubusercontent.com/owner/repo/main/src/lib.rs",
                UpstreamFamily::RawMirror,
            ),
            ("raw.github.com/owner/repo/main/x", UpstreamFamily::RawMirror),
            (
                "https://gist.githubusercontent.com/owner/abc123/raw/file.txt",
                UpstreamFamily::GistContent,
            ),
            ("https://github.com/owner/repo/tags", UpstreamFamily::Tags),
        ];

        for (url, expected) in cases {
            assert_eq!(classify(url), expected, "{url}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify("HTTPS://GitHub.COM/Owner/Repo/RELEASES/x"),
            UpstreamFamily::ReleaseOrArchive
        );
    }

    #[test]
    fn test_anchored_at_start() {
        assert_eq!(
            classify("notgithub.com/github.com/a/b/releases/x"),
            UpstreamFamily::Unmatched
        );
        assert_eq!(
            classify("/https://github.com/a/b/releases/x"),
            UpstreamFamily::Unmatched
        );
        assert_eq!(
            classify("example.com/?u=raw.githubusercontent.com/a/b/c/d"),
            UpstreamFamily::Unmatched
        );
    }

    #[test]
    fn test_unmatched() {
        assert_eq!(classify(""), UpstreamFamily::Unmatched);
        assert_eq!(classify("index.html"), UpstreamFamily::Unmatched);
        assert_eq!(classify("https://github.com/owner"), UpstreamFamily::Unmatched);
        assert_eq!(
            classify("https://raw.githubusercontent.com/owner/repo/main"),
            UpstreamFamily::Unmatched
        );
    }

    #[test]
    fn test_table_order_wins() {
        // Matches both the blob and the tags pattern.
        assert_eq!(
            classify("github.com/o/r/blob/main/tags.txt"),
            UpstreamFamily::BlobOrRaw
        );
    }

    #[test]
    fn test_is_upstream_like() {
        assert!(is_upstream_like("https://github.com/owner/repo/archive/x.zip"));
        assert!(!is_upstream_like("https://github.com/owner/repo2"));
        assert!(!is_upstream_like("https://example.com/other"));
    }
}
