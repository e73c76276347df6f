//! Translation between resource identifiers and backing paths.
//!
//! This is the security boundary of every store: an identifier outside the
//! store's base is reported as `NotFound`, and a relative path that could
//! escape the storage root is rejected as `BadRequest`.
//!
//! Checks run on the percent-decoded path, so `%2E%2E` is caught the same way
//! as a literal `..`.

use std::path::{Path, PathBuf};

use ldpod_types::{trim_trailing_slashes, ResourceError, ResourceIdentifier, StoreResult};
use tracing::warn;

/// Join a validated relative path onto a backing root. Pure; touches no filesystem.
pub fn absolute_path(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty() && *s != ".") {
        path.push(segment);
    }
    path
}

/// Strip `base` from `identifier` and decode the remainder.
///
/// Trailing slashes on `base` are ignored, so the result of an in-scope
/// identifier starts with `/`.
pub fn relative_path(base: &str, identifier: &ResourceIdentifier) -> StoreResult<String> {
    let base = trim_trailing_slashes(base);
    match identifier.path().strip_prefix(base) {
        Some(rest) => decode_path_components(rest),
        None => {
            warn!(identifier = %identifier, base, "identifier is outside the store scope");
            Err(ResourceError::NotFound(format!(
                "{identifier} is outside the scope of {base}"
            )))
        }
    }
}

/// Reject relative paths that were not derived from a `base/...` identifier,
/// or that contain a parent-directory segment, a `.` segment or an empty
/// segment. Only the trailing slash of a container may end in an empty
/// segment, so every accepted path names exactly one backing location.
pub fn validate_relative_path(path: &str, identifier: &ResourceIdentifier) -> StoreResult<()> {
    if !path.starts_with('/') {
        warn!(identifier = %identifier, "identifier needs a / after the base");
        return Err(ResourceError::BadRequest(format!(
            "{identifier} needs a / after the base"
        )));
    }
    if path.contains("/..") {
        warn!(identifier = %identifier, "disallowed /.. segment");
        return Err(ResourceError::BadRequest(format!(
            "disallowed /.. segment in {identifier}"
        )));
    }
    let segments: Vec<&str> = path[1..].split('/').collect();
    let last = segments.len() - 1;
    let aliased = segments
        .iter()
        .enumerate()
        .any(|(i, segment)| *segment == "." || (segment.is_empty() && i != last));
    if aliased {
        warn!(identifier = %identifier, "empty or . segment");
        return Err(ResourceError::BadRequest(format!(
            "disallowed empty or . segment in {identifier}"
        )));
    }
    Ok(())
}

/// [`relative_path`] followed by [`validate_relative_path`].
pub fn checked_relative_path(base: &str, identifier: &ResourceIdentifier) -> StoreResult<String> {
    let path = relative_path(base, identifier)?;
    validate_relative_path(&path, identifier)?;
    Ok(path)
}

/// Parent container of a relative path: `/a/b/` and `/a/b` both give `/a/`.
/// The root `/` has no parent.
pub fn parent_path(path: &str) -> Option<&str> {
    let trimmed = trim_trailing_slashes(path);
    if trimmed.is_empty() {
        return None;
    }
    trimmed.rfind('/').map(|idx| &trimmed[..=idx])
}

/// Percent-decode every segment of a path.
pub fn decode_path_components(path: &str) -> StoreResult<String> {
    let segments = path
        .split('/')
        .map(percent_decode)
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(segments.join("/"))
}

/// Percent-encode every segment of a path, keeping the separators.
pub fn encode_path_components(path: &str) -> String {
    path.split('/')
        .map(encode_uri_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode everything except the unreserved URI characters.
pub fn encode_uri_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for byte in component.bytes() {
        let unreserved = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')');
        if unreserved {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn percent_decode(segment: &str) -> StoreResult<String> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out)
        .map_err(|_| ResourceError::BadRequest(format!("invalid percent-encoding in {segment}")))
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldpod_types::ErrorKind;
    use proptest::prelude::*;

    const BASE: &str = "http://test.com/";

    fn id(path: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(path)
    }

    // -----------------------------------------------------------------------
    // absolute_path
    // -----------------------------------------------------------------------

    #[test]
    fn absolute_path_joins_segments() {
        let root = Path::new("/data/pods");
        assert_eq!(absolute_path(root, "/alice/card"), PathBuf::from("/data/pods/alice/card"));
        assert_eq!(absolute_path(root, "/alice/"), PathBuf::from("/data/pods/alice"));
        assert_eq!(absolute_path(root, "/"), PathBuf::from("/data/pods"));
        assert_eq!(absolute_path(root, "/./a//b"), PathBuf::from("/data/pods/a/b"));
    }

    // -----------------------------------------------------------------------
    // relative_path
    // -----------------------------------------------------------------------

    #[test]
    fn relative_path_strips_base() {
        assert_eq!(relative_path(BASE, &id("http://test.com/alice/card")).unwrap(), "/alice/card");
        assert_eq!(relative_path(BASE, &id("http://test.com/")).unwrap(), "/");
        assert_eq!(relative_path("http://test.com", &id("http://test.com/a/")).unwrap(), "/a/");
    }

    #[test]
    fn relative_path_decodes() {
        assert_eq!(
            relative_path(BASE, &id("http://test.com/my%20docs/caf%C3%A9")).unwrap(),
            "/my docs/café"
        );
        assert_eq!(relative_path(BASE, &id("http://test.com/100%")).unwrap(), "/100%");
    }

    #[test]
    fn out_of_scope_is_not_found() {
        let err = relative_path(BASE, &id("http://other.com/alice/")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // -----------------------------------------------------------------------
    // validate_relative_path
    // -----------------------------------------------------------------------

    #[test]
    fn missing_leading_slash_is_bad_request() {
        let err = validate_relative_path("alice", &id("http://test.comalice")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn traversal_is_bad_request() {
        let err = validate_relative_path("/alice/../bob", &id("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(validate_relative_path("/alice/card", &id("x")).is_ok());
    }

    #[test]
    fn encoded_traversal_is_caught() {
        let identifier = id("http://test.com/alice/%2E%2E/bob");
        let err = checked_relative_path(BASE, &identifier).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let identifier = id("http://test.com/alice%2F..%2Fbob");
        let err = checked_relative_path(BASE, &identifier).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn aliases_of_a_location_are_bad_request() {
        for path in ["http://test.com/./", "http://test.com//", "http://test.com/%2E/", "http://test.com/a//b", "http://test.com/a/."] {
            let err = checked_relative_path(BASE, &id(path)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{path}");
        }
        assert_eq!(checked_relative_path(BASE, &id("http://test.com/")).unwrap(), "/");
        assert_eq!(checked_relative_path(BASE, &id("http://test.com/a/b/")).unwrap(), "/a/b/");
        assert_eq!(checked_relative_path(BASE, &id("http://test.com/a.b/.c")).unwrap(), "/a.b/.c");
    }

    #[test]
    fn base_without_separator_is_bad_request() {
        let err = checked_relative_path("http://test.com/alice", &id("http://test.com/alicex")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    // -----------------------------------------------------------------------
    // helpers
    // -----------------------------------------------------------------------

    #[test]
    fn parent_paths() {
        assert_eq!(parent_path("/"), None);
        assert_eq!(parent_path("/a"), Some("/"));
        assert_eq!(parent_path("/a/"), Some("/"));
        assert_eq!(parent_path("/a/b/"), Some("/a/"));
        assert_eq!(parent_path("/a/b/c"), Some("/a/b/"));
    }

    #[test]
    fn encode_components() {
        assert_eq!(encode_uri_component("my docs"), "my%20docs");
        assert_eq!(encode_uri_component("a/b"), "a%2Fb");
        assert_eq!(encode_uri_component("café"), "caf%C3%A9");
        assert_eq!(encode_path_components("/my docs/x y/"), "/my%20docs/x%20y/");
    }

    proptest! {
        #[test]
        fn unprefixed_identifiers_are_not_found(path in "[a-z]{1,8}://[a-z]{1,8}/[a-z/]{0,12}") {
            prop_assume!(!path.starts_with("http://test.com"));
            let err = relative_path(BASE, &id(&path)).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::NotFound);
        }

        #[test]
        fn parent_segments_are_rejected(prefix in "[a-z/]{0,8}", suffix in "[a-z./]{0,8}") {
            let path = format!("/{prefix}/..{suffix}");
            let err = validate_relative_path(&path, &id("x")).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::BadRequest);
        }

        #[test]
        fn dot_and_empty_segments_are_rejected(
            prefix in "(/[a-z]{1,4}){0,3}",
            alias in prop_oneof![Just("/."), Just("//"), Just("/%2E"), Just("/%2e")],
            suffix in "(/[a-z]{1,4}){0,2}/?",
        ) {
            let identifier = id(&format!("http://test.com{prefix}{alias}{suffix}"));
            let err = checked_relative_path(BASE, &identifier).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::BadRequest);
        }

        #[test]
        fn paths_without_leading_slash_are_rejected(path in "[a-z][a-z/]{0,12}") {
            let err = validate_relative_path(&path, &id("x")).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::BadRequest);
        }

        #[test]
        fn encoding_is_reversed_by_decoding(segment in "[ -~é]{0,16}") {
            let encoded = encode_uri_component(&segment);
            prop_assert_eq!(decode_path_components(&encoded).unwrap(), segment);
        }
    }
}
