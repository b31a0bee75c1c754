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

//! URL model (§4.3): either an opaque string parsed on demand, or
//! structured `{host, pathname, searchParams}` fields.

use crate::error::Error;
use crate::multimap::{Multimap, MultimapExt};

/// A request URL, in either representation the caller prefers.
#[derive(Clone, Debug)]
pub enum UrlValue {
    Raw(String),
    Parsed(ParsedUrl),
}

#[derive(Clone, Debug, Default)]
pub struct ParsedUrl {
    pub host: Option<String>,
    pub pathname: Option<String>,
    pub search_params: Multimap,
}

impl UrlValue {
    /// Decomposes into `(host, pathname, searchParams)`, parsing a
    /// raw string form if needed.
    pub fn parts(&self) -> Result<(Option<String>, String, Multimap), Error> {
        match self {
            UrlValue::Parsed(p) => Ok((
                p.host.clone(),
                p.pathname.clone().unwrap_or_else(|| "/".to_string()),
                p.search_params.clone(),
            )),
            UrlValue::Raw(raw) => parse_raw_url(raw),
        }
    }
}

fn parse_raw_url(raw: &str) -> Result<(Option<String>, String, Multimap), Error> {
    let without_scheme = raw
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(raw);

    let (host_port, rest) = match without_scheme.find('/') {
        Some(idx) => (&without_scheme[..idx], &without_scheme[idx..]),
        None => (without_scheme, "/"),
    };

    let host = if host_port.is_empty() {
        None
    } else {
        Some(host_port.to_string())
    };

    let (pathname, query) = match rest.split_once('?') {
        Some((p, q)) => (p, q),
        None => (rest, ""),
    };
    let pathname = if pathname.is_empty() { "/" } else { pathname };

    let mut search_params = Multimap::new();
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        search_params.add(
            percent_encoding::percent_decode_str(k)
                .decode_utf8_lossy()
                .into_owned(),
            percent_encoding::percent_decode_str(v)
                .decode_utf8_lossy()
                .into_owned(),
        );
    }

    Ok((host, pathname.to_string(), search_params))
}

/// Converts a structured URL back into `scheme://host/pathname?query`
/// (§4.3 `to_url`). Scheme defaults to `https`, pathname to `/`. A
/// missing host with a non-root pathname is a fatal input error.
pub fn to_url(value: &UrlValue) -> Result<String, Error> {
    let (host, pathname, search_params) = value.parts()?;
    let host = match host {
        Some(h) => h,
        None if pathname == "/" || pathname.is_empty() => {
            return Err(Error::InvalidInput(
                "cannot render a URL with no host and no path".to_string(),
            ));
        }
        None => {
            return Err(Error::InvalidInput(format!(
                "missing host for non-root pathname `{pathname}`"
            )));
        }
    };

    let pathname = if pathname.is_empty() { "/" } else { &pathname };
    let mut out = format!("https://{host}{pathname}");
    if !search_params.is_empty() {
        out.push('?');
        out.push_str(&search_params.to_query_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_url() {
        let url = UrlValue::Raw(
            "https://examplebucket.s3.amazonaws.com/root//folder A?list-type=2".to_string(),
        );
        let (host, pathname, query) = url.parts().unwrap();
        assert_eq!(host.as_deref(), Some("examplebucket.s3.amazonaws.com"));
        assert_eq!(pathname, "/root//folder A");
        assert_eq!(query.get("list-type").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_raw_url_no_path() {
        let url = UrlValue::Raw("https://example.com".to_string());
        let (host, pathname, _) = url.parts().unwrap();
        assert_eq!(host.as_deref(), Some("example.com"));
        assert_eq!(pathname, "/");
    }

    #[test]
    fn test_to_url_roundtrip() {
        let url = UrlValue::Parsed(ParsedUrl {
            host: Some("example.com".to_string()),
            pathname: Some("/a/b".to_string()),
            search_params: Multimap::new(),
        });
        assert_eq!(to_url(&url).unwrap(), "https://example.com/a/b");
    }

    #[test]
    fn test_to_url_missing_host_nonroot_fails() {
        let url = UrlValue::Parsed(ParsedUrl {
            host: None,
            pathname: Some("/a".to_string()),
            search_params: Multimap::new(),
        });
        assert!(to_url(&url).is_err());
    }
}
