// MinIO Rust Library for Amazon S3 Compatible Cloud Storage
// Copyright 2025 MinIO, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! URI canonicalization and body hashing (§4.2).

use crate::multimap::uri_encode;
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};

/// Options controlling `canonical_uri`. S3 sets both flags `true`:
/// it neither normalizes `.`/`..` segments nor double-encodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct UriOptions {
    pub dont_normalize: bool,
    pub only_encode_once: bool,
}

/// Canonicalizes a URL path per §4.2: percent-decode each segment,
/// optionally fold `.`/`..`, percent-encode with the unreserved set
/// (once or twice), then rejoin with `/`.
pub fn canonical_uri(pathname: &str, options: UriOptions) -> String {
    if pathname.is_empty() {
        return "/".to_string();
    }

    let raw_segments: Vec<&str> = pathname.split('/').collect();

    let decoded: Vec<String> = raw_segments
        .iter()
        .map(|s| {
            percent_decode_str(s)
                .decode_utf8()
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| (*s).to_string())
        })
        .collect();

    let encode_segment = |s: &str| -> String {
        let once = uri_encode(s);
        if options.only_encode_once {
            once
        } else {
            uri_encode(&once)
        }
    };

    if options.dont_normalize {
        // S3 never folds `.`/`..` or collapses repeated slashes: every
        // split segment, including the empty ones a `//` or leading/
        // trailing `/` produces, is encoded and rejoined verbatim.
        return decoded.iter().map(|s| encode_segment(s)).collect::<Vec<_>>().join("/");
    }

    let leading_slash = pathname.starts_with('/');
    let trailing_slash = pathname.ends_with('/') && pathname != "/";
    let mut stack: Vec<String> = Vec::new();
    for seg in decoded {
        match seg.as_str() {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            _ => stack.push(seg),
        }
    }

    let mut out = String::new();
    if leading_slash || stack.is_empty() {
        out.push('/');
    }
    let encoded: Vec<String> = stack.iter().map(|s| encode_segment(s)).collect();
    out.push_str(&encoded.join("/"));
    if trailing_slash && !out.ends_with('/') {
        out.push('/');
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Hex SHA-256 of the empty string: the sentinel used for empty or
/// missing request/chunk bodies.
pub const EMPTY_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Returns hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Body hash forms accepted by a `SignedRequest`.
#[derive(Clone, Debug)]
pub enum BodyHash {
    /// No body, or an empty body: hashes to `EMPTY_SHA256`.
    Empty,
    /// A precomputed hex SHA-256, trusted as-is.
    Precomputed(String),
    /// Raw bytes to be hashed.
    Bytes(Vec<u8>),
}

/// Body hashing (§4.2): returns the hex SHA-256 to place in the
/// canonical request.
pub fn hash_body(body: &BodyHash) -> String {
    match body {
        BodyHash::Empty => EMPTY_SHA256.to_string(),
        BodyHash::Precomputed(hash) => hash.clone(),
        BodyHash::Bytes(bytes) => {
            if bytes.is_empty() {
                EMPTY_SHA256.to_string()
            } else {
                sha256_hex(bytes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize() -> UriOptions {
        UriOptions::default()
    }

    fn s3_opts() -> UriOptions {
        UriOptions {
            dont_normalize: true,
            only_encode_once: true,
        }
    }

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(canonical_uri("", normalize()), "/");
    }

    #[test]
    fn test_dot_dot_folding() {
        assert_eq!(canonical_uri("/a/b/../c/%2E./d", normalize()), "/a/d");
    }

    #[test]
    fn test_double_encode_of_percent() {
        assert_eq!(canonical_uri("//%2f//", normalize()), "/%252F/");
    }

    #[test]
    fn test_unicode_double_encoded() {
        assert_eq!(
            canonical_uri("/test😊", normalize()),
            "/test%25F0%259F%2598%258A"
        );
    }

    #[test]
    fn test_s3_mode_preserves_repeated_slashes_and_encodes_once() {
        // S3 leaves repeated slashes and literal `.`/`..` names alone,
        // encoding each segment exactly once.
        assert_eq!(canonical_uri("/root//folder A", s3_opts()), "/root//folder%20A");
    }

    #[test]
    fn test_s3_mode_does_not_fold_dot_segments() {
        assert_eq!(canonical_uri("/a/./b/../c", s3_opts()), "/a/./b/../c");
    }

    #[test]
    fn test_idempotent_under_stable_options() {
        let once = canonical_uri("/a/b/../c/%2E./d", normalize());
        let twice = canonical_uri(&once, normalize());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_hash_body_empty() {
        assert_eq!(hash_body(&BodyHash::Empty), EMPTY_SHA256);
        assert_eq!(hash_body(&BodyHash::Bytes(vec![])), EMPTY_SHA256);
    }

    #[test]
    fn test_hash_body_precomputed_passthrough() {
        assert_eq!(
            hash_body(&BodyHash::Precomputed("deadbeef".to_string())),
            "deadbeef"
        );
    }
}
