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

//! The concrete `SignedRequest` record (§3, §9 design note: a single
//! concrete record replaces the source's structural typing over
//! request descriptors).

use crate::canonical::BodyHash;
use crate::multimap::Multimap;
use crate::url::UrlValue;
use http::Method;

/// A request description to be signed.
///
/// `unsigned` is meaningful only to the S3 signer (C5): it forces the
/// `UNSIGNED-PAYLOAD` body hash sentinel regardless of signing mode.
#[derive(Clone, Debug)]
pub struct SignedRequest {
    pub method: Method,
    pub url: UrlValue,
    pub headers: Multimap,
    pub body: BodyHash,
    pub unsigned: bool,
}

impl Default for SignedRequest {
    fn default() -> Self {
        SignedRequest {
            method: Method::GET,
            url: UrlValue::Raw(String::new()),
            headers: Multimap::new(),
            body: BodyHash::Empty,
            unsigned: false,
        }
    }
}

impl SignedRequest {
    pub fn new(method: Method, url: UrlValue) -> Self {
        SignedRequest {
            method,
            url,
            ..Default::default()
        }
    }
}

/// The flat `{method, host, path, headers}` form an HTTP client
/// expects (§4.3 `to_request_options`).
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub host: Option<String>,
    pub path: String,
    pub headers: Multimap,
}

pub fn to_request_options(request: &SignedRequest) -> Result<RequestOptions, crate::error::Error> {
    let (host, pathname, _query) = request.url.parts()?;
    Ok(RequestOptions {
        method: request.method.clone(),
        host,
        path: pathname,
        headers: request.headers.clone(),
    })
}
