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

//! Ordered multi-valued string map used for headers and query
//! parameters, plus the canonicalization routines that turn one into
//! the bytes SigV4 signs.

use crate::error::Error;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Multimap for string key and string value.
pub type Multimap = multimap::MultiMap<String, String>;

/// Unreserved set per RFC 3986 / SigV4: everything *but*
/// `A-Za-z0-9-._~` gets percent-encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `s` using the SigV4 unreserved set, uppercase hex.
pub fn uri_encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// Collapses runs of ASCII spaces into one, after trimming the ends.
/// Returns `Cow::Borrowed` when nothing needed to change.
#[inline]
fn collapse_spaces(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    if !trimmed.contains("  ") {
        return Cow::Borrowed(trimmed);
    }
    let mut result = String::with_capacity(trimmed.len());
    let mut prev_space = false;
    for c in trimmed.chars() {
        if c == ' ' {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }
    Cow::Owned(result)
}

pub trait MultimapExt {
    /// Adds a key-value pair to the multimap.
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V);

    /// Replaces all existing values for `key` with a single `value`,
    /// unlike `add` which appends to the key's value list.
    fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V);

    /// Merges another multimap's entries into this one.
    fn add_multimap(&mut self, other: Multimap);

    /// Joins this multimap as an (uncanonicalized) HTTP query string.
    fn to_query_string(&self) -> String;

    /// Sorted-by-encoded-key-then-value canonical query string: see
    /// `canonical_query` for the full contract.
    fn get_canonical_query_string(&self) -> String;

    /// Canonical headers block and signed-headers list: see
    /// `canonical_headers` for the full contract.
    fn get_canonical_headers(&self) -> Result<(String, String), Error>;
}

impl MultimapExt for Multimap {
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.insert(key.into(), value.into());
    }

    fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        self.remove(&key);
        self.insert(key, value.into());
    }

    fn add_multimap(&mut self, other: Multimap) {
        for (key, values) in other.into_iter() {
            self.insert_many(key.clone(), values);
        }
    }

    fn to_query_string(&self) -> String {
        let mut query = String::new();
        for (key, values) in self.iter_all() {
            for value in values {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(&uri_encode(key));
                query.push('=');
                query.push_str(&uri_encode(value));
            }
        }
        query
    }

    fn get_canonical_query_string(&self) -> String {
        canonical_query(self)
    }

    fn get_canonical_headers(&self) -> Result<(String, String), Error> {
        canonical_headers(self)
    }
}

/// Query canonicalization (§4.2): parses `params` into `(name, value)`
/// pairs, drops empty names, sorts by encoded name then encoded value,
/// percent-encodes both, and joins as `name=value` pairs separated by
/// `&`. Duplicate names are preserved as repeated pairs.
pub fn canonical_query(params: &Multimap) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, values) in params.iter_all() {
        if key.is_empty() {
            continue;
        }
        let encoded_key = uri_encode(key);
        for value in values {
            pairs.push((encoded_key.clone(), uri_encode(value)));
        }
    }
    pairs.sort();

    let mut query = String::new();
    for (key, value) in pairs {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&key);
        query.push('=');
        query.push_str(&value);
    }
    query
}

/// Header canonicalization (§4.2): lower-cases names, joins
/// array-valued headers with `,` after sorting values, trims and
/// collapses internal whitespace, and rejects a lower-cased name
/// collision as a fatal error. Returns `(canonical_headers_block,
/// signed_headers)`.
pub fn canonical_headers(headers: &Multimap) -> Result<(String, String), Error> {
    let mut sorted: BTreeMap<String, String> = BTreeMap::new();

    for (k, values) in headers.iter_all() {
        let key = k.to_lowercase();

        let mut vs: Vec<&String> = values.iter().collect();
        vs.sort();

        let mut value = String::new();
        for v in vs {
            if !value.is_empty() {
                value.push(',');
            }
            value.push_str(&collapse_spaces(v));
        }

        if sorted.insert(key.clone(), value).is_some() {
            return Err(Error::InvalidInput(format!(
                "duplicate header name after lower-casing: `{key}`"
            )));
        }
    }

    let mut signed_headers = String::new();
    let mut canonical = String::new();
    let mut add_delim = false;
    for (key, value) in &sorted {
        if add_delim {
            signed_headers.push(';');
            canonical.push('\n');
        }
        signed_headers.push_str(key);
        canonical.push_str(key);
        canonical.push(':');
        canonical.push_str(value);
        add_delim = true;
    }

    Ok((canonical, signed_headers))
}

/// Returns the original header key and its joined string value for
/// the first header whose name lower-cases to `lowercase_name`, or
/// `(lowercase_name, None)` if absent. Multiple values join with `,`.
pub fn get_header(headers: &Multimap, lowercase_name: &str) -> (String, Option<String>) {
    for (k, values) in headers.iter_all() {
        if k.to_lowercase() == lowercase_name {
            return (k.clone(), Some(values.join(",")));
        }
    }
    (lowercase_name.to_string(), None)
}
