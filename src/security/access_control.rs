//! Substring allow-list for embedded targets.

use crate::proxy::error::RelayError;

/// Allow-list applied to the embedded target path.
///
/// An empty list permits everything. Otherwise a path is permitted if it
/// contains at least one entry as a plain, case-sensitive substring.
#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
    allow_list: Vec<String>,
}

impl AccessFilter {
    pub fn new(allow_list: Vec<String>) -> Self {
        Self { allow_list }
    }

    /// Returns true if the path may be relayed.
    pub fn permitted(&self, path: &str) -> bool {
        permitted(path, &self.allow_list)
    }

    /// Like [`permitted`](Self::permitted), but as a terminal error.
    pub fn check(&self, path: &str) -> Result<(), RelayError> {
        if self.permitted(path) {
            Ok(())
        } else {
            Err(RelayError::AccessBlocked)
        }
    }
}

/// Returns true if `allow_list` is empty or any entry occurs in `path`.
pub fn permitted(path: &str, allow_list: &[String]) -> bool {
    allow_list.is_empty() || allow_list.iter().any(|entry| path.contains(entry.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_allows_all() {
        let filter = AccessFilter::default();
        assert!(filter.permitted("github.com/anyone/anything/releases/x"));
        assert!(filter.permitted(""));
    }

    #[test]
    fn test_substring_match() {
        let filter = AccessFilter::new(vec!["foo".to_string()]);
        assert!(filter.permitted("github.com/foo/bar/releases/x"));
        assert!(!filter.permitted("github.com/baz/qux/releases/x"));
    }

    #[test]
    fn test_case_sensitive() {
        let filter = AccessFilter::new(vec!["foo".to_string()]);
        assert!(!filter.permitted("github.com/FOO/bar/releases/x"));
    }

    #[test]
    fn test_check_returns_blocked() {
        let filter = AccessFilter::new(vec!["foo".to_string(), "bar".to_string()]);
        assert!(filter.check("github.com/x/bar/tags").is_ok());
        assert!(matches!(
            filter.check("github.com/x/y/tags"),
            Err(RelayError::AccessBlocked)
        ));
    }
}
