//! Path canonicalization and pattern helpers.
//!
//! # Pattern grammar
//! - `"/tree/"`: rooted subtree, matches itself and every path below it
//! - `"/exact"`: matches only that path
//! - `"host/..."`: same as above, but only for requests addressed to `host`
//!
//! Everything before the first `/` is the host qualifier (possibly empty).

use crate::routing::error::RouteError;

/// Return the canonical form of `path`.
///
/// Lexically removes `.` and `..` segments and duplicate slashes, always
/// yields a leading `/`, and keeps a trailing `/` unless the result is the
/// root.
pub fn canonicalize(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut canonical = String::with_capacity(path.len() + 1);
    for segment in &segments {
        canonical.push('/');
        canonical.push_str(segment);
    }

    if canonical.is_empty() {
        canonical.push('/');
    } else if path.ends_with('/') {
        canonical.push('/');
    }
    canonical
}

/// Does `path` match `pattern`?
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if pattern.ends_with('/') {
        path.starts_with(pattern)
    } else {
        pattern == path
    }
}

/// Check that `pattern` is non-empty and has a path part.
pub fn validate_pattern(pattern: &str) -> Result<(), RouteError> {
    if pattern.is_empty() || !pattern.contains('/') {
        return Err(RouteError::InvalidPattern(pattern.to_string()));
    }
    Ok(())
}

/// For a subtree pattern, the bare pattern without its trailing slash.
///
/// Returns `None` when the pattern is not a subtree or when stripping the
/// slash leaves no path (`"/"`, `"example.com/"`).
pub fn subtree_root(pattern: &str) -> Option<&str> {
    let bare = pattern.strip_suffix('/')?;
    if bare.contains('/') {
        Some(bare)
    } else {
        None
    }
}

/// Split a pattern into its host qualifier and path part.
pub fn split_host(pattern: &str) -> (&str, &str) {
    match pattern.find('/') {
        Some(idx) => pattern.split_at(idx),
        None => (pattern, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_cases() {
        let cases = [
            ("", "/"),
            ("/", "/"),
            ("foo", "/foo"),
            ("foo/", "/foo/"),
            ("/foo/../bar", "/bar"),
            ("/foo/./bar/", "/foo/bar/"),
            ("//foo//bar", "/foo/bar"),
            ("/foo/..", "/"),
            ("/foo/../", "/"),
            ("/../../x", "/x"),
            ("/foo/.", "/foo"),
            ("/a/b/../../c/", "/c/"),
        ];
        for (input, want) in cases {
            assert_eq!(canonicalize(input), want, "canonicalize({:?})", input);
        }
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let inputs = ["", "a/b/../c/", "/x/./y//", "/../", "/.", "/foo/bar/..", "//"];
        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once);
            assert!(once.starts_with('/'));
        }
    }

    #[test]
    fn subtree_pattern_matches_descendants() {
        assert!(pattern_matches("/foo/", "/foo/"));
        assert!(pattern_matches("/foo/", "/foo/bar/baz"));
        assert!(!pattern_matches("/foo/", "/foo"));
        assert!(!pattern_matches("/foo/", "/foobar"));
    }

    #[test]
    fn exact_pattern_matches_only_itself() {
        assert!(pattern_matches("/bar", "/bar"));
        assert!(!pattern_matches("/bar", "/bar/"));
        assert!(!pattern_matches("/bar", "/bar/x"));
        assert!(!pattern_matches("", ""));
    }

    #[test]
    fn pattern_validation() {
        assert!(validate_pattern("/").is_ok());
        assert!(validate_pattern("example.com/api/").is_ok());
        assert_eq!(validate_pattern(""), Err(RouteError::InvalidPattern(String::new())));
        assert!(validate_pattern("example.com").is_err());
    }

    #[test]
    fn subtree_roots() {
        assert_eq!(subtree_root("/foo/"), Some("/foo"));
        assert_eq!(subtree_root("host/foo/"), Some("host/foo"));
        assert_eq!(subtree_root("/"), None);
        assert_eq!(subtree_root("host/"), None);
        assert_eq!(subtree_root("/foo"), None);
    }

    #[test]
    fn host_split() {
        assert_eq!(split_host("/foo"), ("", "/foo"));
        assert_eq!(split_host("example.com/foo/"), ("example.com", "/foo/"));
    }
}
