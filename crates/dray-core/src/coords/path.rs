//! Package path grammar.
//!
//! Matches request pathnames like:
//! - `/react`
//! - `/react@18.2.0`
//! - `/react@18.2.0/umd/react.production.min.js`
//! - `/@scope/name`
//! - `/@scope/name@1.0.0/lib/index.js`

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Captures from a package pathname, percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePath {
    /// Full package name (e.g., "@scope/name" or "name").
    pub package_name: String,
    /// Version token between `@` and the next `/`, if any.
    pub version: Option<String>,
    /// Remaining path including its leading `/`, if any.
    pub filename: Option<String>,
}

/// Matches `pathname` against the grammar
///
/// ```text
/// "/" package-name [ "@" version ] [ "/" filename ]
/// package-name := [ "@" scope "/" ] name
/// ```
///
/// where `scope` and `name` contain no `/` or `@`, and `version` contains no
/// `/` (it may contain `@`, as in `/pkg@1.0@beta`). A pathname outside the
/// grammar yields `None`; no match is an expected condition, not a failure.
#[must_use]
pub fn match_package_path(pathname: &str) -> Option<PackagePath> {
    let rest = pathname.strip_prefix('/')?;
    let (package_name, rest) = scan_package_name(rest)?;
    let (version, rest) = scan_version(rest)?;
    let filename = match rest {
        "" => None,
        rest if rest.starts_with('/') => Some(rest),
        _ => return None,
    };

    Some(PackagePath {
        package_name: decode(package_name)?,
        version: match version {
            Some(raw) => Some(decode(raw)?),
            None => None,
        },
        filename: match filename {
            Some(raw) => Some(decode(raw)?),
            None => None,
        },
    })
}

/// Length of the leading run of characters allowed inside a scope or name
/// segment (everything up to the first `/` or `@`).
fn segment_len(input: &str) -> usize {
    input.find(['/', '@']).unwrap_or(input.len())
}

fn scan_package_name(input: &str) -> Option<(&str, &str)> {
    if let Some(after_at) = input.strip_prefix('@') {
        // Scoped: "@scope/name". The scope must be non-empty and must be
        // followed by a '/' (not an '@' or the end of the path).
        let scope_len = segment_len(after_at);
        if scope_len == 0 || !after_at[scope_len..].starts_with('/') {
            return None;
        }
        let after_scope = &after_at[scope_len + 1..];
        let name_len = segment_len(after_scope);
        if name_len == 0 {
            return None;
        }
        let total = 1 + scope_len + 1 + name_len;
        Some((&input[..total], &input[total..]))
    } else {
        let name_len = segment_len(input);
        if name_len == 0 {
            return None;
        }
        Some((&input[..name_len], &input[name_len..]))
    }
}

fn scan_version(input: &str) -> Option<(Option<&str>, &str)> {
    let Some(after_at) = input.strip_prefix('@') else {
        return Some((None, input));
    };
    let end = after_at.find('/').unwrap_or(after_at.len());
    if end == 0 {
        // A dangling '@' ("/pkg@" or "/pkg@/file") fits nowhere in the
        // grammar, so the whole pathname fails to match.
        return None;
    }
    Some((Some(&after_at[..end]), &after_at[end..]))
}

fn decode(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(package_name: &str, version: Option<&str>, filename: Option<&str>) -> PackagePath {
        PackagePath {
            package_name: package_name.to_string(),
            version: version.map(str::to_string),
            filename: filename.map(str::to_string),
        }
    }

    #[test]
    fn test_match_bare_name() {
        assert_eq!(
            match_package_path("/react"),
            Some(path("react", None, None))
        );
    }

    #[test]
    fn test_match_name_and_version() {
        assert_eq!(
            match_package_path("/react@18.2.0"),
            Some(path("react", Some("18.2.0"), None))
        );
    }

    #[test]
    fn test_match_name_version_filename() {
        assert_eq!(
            match_package_path("/react@18.2.0/umd/react.production.min.js"),
            Some(path(
                "react",
                Some("18.2.0"),
                Some("/umd/react.production.min.js")
            ))
        );
    }

    #[test]
    fn test_match_filename_without_version() {
        assert_eq!(
            match_package_path("/react/umd/react.js"),
            Some(path("react", None, Some("/umd/react.js")))
        );
    }

    #[test]
    fn test_match_scoped() {
        assert_eq!(
            match_package_path("/@scope/name"),
            Some(path("@scope/name", None, None))
        );
    }

    #[test]
    fn test_match_scoped_with_version_and_filename() {
        assert_eq!(
            match_package_path("/@scope/name@1.0.0/lib/index.js"),
            Some(path("@scope/name", Some("1.0.0"), Some("/lib/index.js")))
        );
    }

    #[test]
    fn test_version_may_contain_at() {
        assert_eq!(
            match_package_path("/pkg@1.0@beta"),
            Some(path("pkg", Some("1.0@beta"), None))
        );
    }

    #[test]
    fn test_trailing_slash_is_captured() {
        assert_eq!(match_package_path("/pkg/"), Some(path("pkg", None, Some("/"))));
    }

    #[test]
    fn test_captures_are_decoded() {
        assert_eq!(
            match_package_path("/pkg%201@1.0%2Dbeta/file%20name.js"),
            Some(path("pkg 1", Some("1.0-beta"), Some("/file name.js")))
        );
    }

    #[test]
    fn test_no_leading_slash_fails() {
        assert_eq!(match_package_path(""), None);
        assert_eq!(match_package_path("react"), None);
    }

    #[test]
    fn test_empty_name_fails() {
        assert_eq!(match_package_path("/"), None);
        assert_eq!(match_package_path("//file.js"), None);
    }

    #[test]
    fn test_bad_scope_fails() {
        assert_eq!(match_package_path("/@"), None);
        assert_eq!(match_package_path("/@scope"), None);
        assert_eq!(match_package_path("/@scope/"), None);
        assert_eq!(match_package_path("/@/name"), None);
        assert_eq!(match_package_path("/@scope@1/name"), None);
    }

    #[test]
    fn test_dangling_at_fails() {
        assert_eq!(match_package_path("/pkg@"), None);
        assert_eq!(match_package_path("/pkg@/file.js"), None);
        assert_eq!(match_package_path("/@scope/name@"), None);
    }

    #[test]
    fn test_undecodable_capture_fails() {
        assert_eq!(match_package_path("/pkg%FF"), None);
    }
}
