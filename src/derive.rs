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

//! Key derivation and primitive signing (C1, §4.1).

use crate::header_constants::{ALGORITHM_AWS4_HMAC_SHA256, ALGORITHM_AWS4_HMAC_SHA256_PAYLOAD};
use crate::time::date_stamp_of;
#[cfg(not(feature = "ring"))]
use hmac::{Hmac, Mac};
#[cfg(feature = "ring")]
use ring::hmac;
#[cfg(not(feature = "ring"))]
use sha2::Sha256;
use std::sync::Mutex;

/// Returns the raw HMAC-SHA256 of `data` under `key`.
pub fn sign_string(key: &[u8], data: &[u8]) -> Vec<u8> {
    #[cfg(feature = "ring")]
    {
        let key = hmac::Key::new(hmac::HMAC_SHA256, key);
        hmac::sign(&key, data).as_ref().to_vec()
    }
    #[cfg(not(feature = "ring"))]
    {
        let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts a key of any size");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

fn sign_hex(key: &[u8], data: &[u8]) -> String {
    hex::encode(sign_string(key, data))
}

/// The derived 32-byte signing key plus the scope string it is bound
/// to (§3 `SigningData`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningData {
    pub key: Vec<u8>,
    pub scope: String,
}

/// Derives `SigningData` for `(date_stamp_or_timestamp, region,
/// service, secret_key)`. The first argument is truncated to its
/// first 8 characters so a full timestamp is also accepted.
pub fn derive(date_stamp_or_timestamp: &str, secret_key: &str, region: &str, service: &str) -> SigningData {
    let date_stamp = date_stamp_of(date_stamp_or_timestamp);

    let mut k0 = b"AWS4".to_vec();
    k0.extend(secret_key.as_bytes());
    let k1 = sign_string(&k0, date_stamp.as_bytes());
    let k2 = sign_string(&k1, region.as_bytes());
    let k3 = sign_string(&k2, service.as_bytes());
    let key = sign_string(&k3, b"aws4_request");

    let scope = format!("{date_stamp}/{region}/{service}/aws4_request");
    SigningData { key, scope }
}

/// One-slot memoization of `derive`: not internally synchronized
/// beyond the mutex needed for interior mutability, and intended for
/// single-instance, not necessarily single-thread, reuse (§4.1, §5).
pub struct DerivationCache {
    slot: Mutex<Option<(String, String, String, String, SigningData)>>,
}

impl Default for DerivationCache {
    fn default() -> Self {
        DerivationCache {
            slot: Mutex::new(None),
        }
    }
}

impl DerivationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns cached `SigningData` if the (date, region, service,
    /// secret) key matches the last call; otherwise derives, caches,
    /// and returns the fresh value.
    pub fn derive(&self, date_stamp_or_timestamp: &str, secret_key: &str, region: &str, service: &str) -> SigningData {
        let date_stamp = date_stamp_of(date_stamp_or_timestamp).to_string();
        let mut slot = self.slot.lock().expect("derivation cache mutex poisoned");
        if let Some((d, s, r, svc, data)) = slot.as_ref() {
            if d == &date_stamp && s == secret_key && r == region && svc == service {
                return data.clone();
            }
        }
        let data = derive(&date_stamp, secret_key, region, service);
        *slot = Some((date_stamp, secret_key.to_string(), region.to_string(), service.to_string(), data.clone()));
        data
    }
}

/// `sign_digest(payloadDigestHex, timestamp, signing, algorithm)`:
/// HMACs `algorithm \n timestamp \n scope \n payloadDigestHex` with
/// `signing.key`, returned as lowercase hex.
pub fn sign_digest(payload_digest_hex: &str, timestamp: &str, signing: &SigningData, algorithm: &str) -> String {
    let string_to_sign = format!(
        "{algorithm}\n{timestamp}\n{}\n{payload_digest_hex}",
        signing.scope
    );
    sign_hex(&signing.key, string_to_sign.as_bytes())
}

/// Convenience wrapper over `sign_digest` using the plain
/// `AWS4-HMAC-SHA256` algorithm, used for request/policy signing.
pub fn sign_canonical_request(canonical_request_hash_hex: &str, timestamp: &str, signing: &SigningData) -> String {
    sign_digest(canonical_request_hash_hex, timestamp, signing, ALGORITHM_AWS4_HMAC_SHA256)
}

/// `sign_chunk(lastSigHex, headersDigestHex, payloadDigestHex,
/// timestamp, signing, algorithm)`: sign_digest over `lastSigHex \n
/// headersDigestHex \n payloadDigestHex`, used to chain S3 chunk and
/// event-stream signatures.
pub fn sign_chunk(
    last_sig_hex: &str,
    headers_digest_hex: &str,
    payload_digest_hex: &str,
    timestamp: &str,
    signing: &SigningData,
) -> String {
    let digest = format!("{last_sig_hex}\n{headers_digest_hex}\n{payload_digest_hex}");
    sign_digest(&digest, timestamp, signing, ALGORITHM_AWS4_HMAC_SHA256_PAYLOAD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_scope_format() {
        let data = derive("20130524", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY", "us-east-1", "iam");
        assert_eq!(data.scope, "20130524/us-east-1/iam/aws4_request");
        assert_eq!(data.key.len(), 32);
    }

    #[test]
    fn test_derive_accepts_full_timestamp() {
        let a = derive("20130524", "secret", "us-east-1", "s3");
        let b = derive("20130524T000000Z", "secret", "us-east-1", "s3");
        assert_eq!(a, b);
    }

    #[test]
    fn test_derivation_cache_matches_uncached() {
        let cache = DerivationCache::new();
        let cached = cache.derive("20190901", "secret", "us-east-1", "s3");
        let fresh = derive("20190901", "secret", "us-east-1", "s3");
        assert_eq!(cached, fresh);

        // second call with identical key hits the cached slot
        let cached_again = cache.derive("20190901", "secret", "us-east-1", "s3");
        assert_eq!(cached_again, fresh);

        // different key recomputes correctly
        let other = cache.derive("20190902", "secret", "us-east-1", "s3");
        assert_eq!(other, derive("20190902", "secret", "us-east-1", "s3"));
    }

    #[test]
    fn test_sign_chunk_deterministic() {
        let signing = derive("20130524", "secret", "us-east-1", "s3");
        let a = sign_chunk("seed", "hdr", "body", "20130524T000000Z", &signing);
        let b = sign_chunk("seed", "hdr", "body", "20130524T000000Z", &signing);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_sign_chunk_depends_only_on_its_inputs() {
        let signing = derive("20130524", "secret", "us-east-1", "s3");
        let sig1 = sign_chunk("seedA", "hdr", "body", "20130524T000000Z", &signing);
        let sig2 = sign_chunk("seedB", "hdr", "body", "20130524T000000Z", &signing);
        assert_ne!(sig1, sig2);
    }
}
