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

//! The endpoint-parser collaborator contract of §6: `parse_host` and
//! its inverse `format_host`. Scoped strictly to the contract — no
//! bucket/virtual-host heuristics, no TLS, no client construction.

use crate::error::Error;
use crate::header_constants::DEFAULT_REGION;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SERVICE_DOT_REGION: Regex =
        Regex::new(r"^([a-z0-9-]+)\.([a-z0-9-]+)\.amazonaws\.com(\.cn)?$").unwrap();
    static ref REGION_DOT_SERVICE: Regex =
        Regex::new(r"^([a-z0-9-]+)\.([a-z0-9-]+)\.amazonaws\.com$").unwrap();
    static ref S3_REGION_VARIANT: Regex = Regex::new(r"^s3-([a-z0-9-]+)\.amazonaws\.com(\.cn)?$").unwrap();
    static ref PLAIN_S3: Regex = Regex::new(r"^s3\.amazonaws\.com$").unwrap();
}

/// `service→endpoint` aliases for services whose public host name
/// diverges from their SigV4 service name (open question in §9: this
/// table is hard-coded and may drift from AWS's catalog).
fn service_to_endpoint_alias(service: &str) -> &str {
    match service {
        "email" => "ses",
        "transcribe" => "transcribestreaming",
        other => other,
    }
}

fn endpoint_to_service_alias(endpoint: &str) -> &str {
    match endpoint {
        "ses" => "email",
        "transcribestreaming" => "transcribe",
        other => other,
    }
}

fn strip_fips(segment: &str) -> &str {
    segment.strip_suffix("-fips").unwrap_or(segment)
}

/// Parses `host` into `(service, region)` per the contract of §6.
/// Recognizes `<service>.<region>.amazonaws.com(.cn)?`, the S3
/// `s3-<region>.amazonaws.com` and bare `s3.amazonaws.com` forms, and
/// strips `-fips` suffixes before alias resolution. Region defaults to
/// `us-east-1` when absent from the host. Hosts that mix in uppercase
/// and don't match a recognized pattern are rejected rather than
/// silently lower-cased and resolved to an empty service.
pub fn parse_host(host: &str) -> Result<(String, String), Error> {
    let lowered = host.to_lowercase();

    if PLAIN_S3.is_match(&lowered) {
        return Ok(("s3".to_string(), DEFAULT_REGION.to_string()));
    }
    if let Some(caps) = S3_REGION_VARIANT.captures(&lowered) {
        let region = strip_fips(&caps[1]);
        return Ok(("s3".to_string(), region.to_string()));
    }
    if let Some(caps) = SERVICE_DOT_REGION.captures(&lowered) {
        let service = strip_fips(&caps[1]);
        let region = strip_fips(&caps[2]);
        return Ok((
            endpoint_to_service_alias(service).to_string(),
            region.to_string(),
        ));
    }

    if host != lowered {
        return Err(Error::InvalidInput(format!(
            "host `{host}` has uppercase characters and does not match a recognized endpoint pattern"
        )));
    }

    // <region>.<service>.amazonaws.com form: same shape as above, so
    // without a known-service table we cannot distinguish it from
    // service.region; AWS's own real-world usage places the service
    // name first in the overwhelming majority of hosts, so that is
    // the form resolved above. Bare hostnames with no amazonaws.com
    // suffix carry no inferable service.
    Ok((String::new(), DEFAULT_REGION.to_string()))
}

/// Builds a host string for `(service, region)`, the inverse of
/// `parse_host`. `region` defaults to `us-east-1` when `None`.
pub fn format_host(service: &str, region: Option<&str>) -> String {
    let region = region.unwrap_or(DEFAULT_REGION);
    let endpoint = service_to_endpoint_alias(service);
    if endpoint == "s3" && region == DEFAULT_REGION {
        "s3.amazonaws.com".to_string()
    } else if endpoint == "s3" {
        format!("s3.{region}.amazonaws.com")
    } else {
        format!("{endpoint}.{region}.amazonaws.com")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_s3() {
        assert_eq!(parse_host("s3.amazonaws.com").unwrap(), ("s3".into(), "us-east-1".into()));
    }

    #[test]
    fn test_parse_s3_region_variant() {
        assert_eq!(
            parse_host("s3-us-west-2.amazonaws.com").unwrap(),
            ("s3".into(), "us-west-2".into())
        );
    }

    #[test]
    fn test_parse_service_dot_region() {
        assert_eq!(
            parse_host("dynamodb.eu-west-1.amazonaws.com").unwrap(),
            ("dynamodb".into(), "eu-west-1".into())
        );
    }

    #[test]
    fn test_parse_strips_fips() {
        assert_eq!(
            parse_host("dynamodb-fips.us-east-1.amazonaws.com").unwrap(),
            ("dynamodb".into(), "us-east-1".into())
        );
    }

    #[test]
    fn test_parse_ses_email_alias() {
        assert_eq!(
            parse_host("email.us-east-1.amazonaws.com").unwrap(),
            ("ses".into(), "us-east-1".into())
        );
    }

    #[test]
    fn test_parse_lowercase_unrecognized_host_defaults_empty_service() {
        assert_eq!(parse_host("my-bucket.example.com").unwrap(), ("".into(), "us-east-1".into()));
    }

    #[test]
    fn test_parse_rejects_uppercase_unrecognized_host() {
        assert!(matches!(parse_host("My-Bucket.Example.com"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_uppercase_host_matching_known_pattern_still_resolves() {
        assert_eq!(
            parse_host("S3.AMAZONAWS.COM").unwrap(),
            ("s3".into(), "us-east-1".into())
        );
    }

    #[test]
    fn test_format_host_s3_default_region() {
        assert_eq!(format_host("s3", None), "s3.amazonaws.com");
    }

    #[test]
    fn test_format_host_s3_other_region() {
        assert_eq!(format_host("s3", Some("us-west-2")), "s3.us-west-2.amazonaws.com");
    }

    #[test]
    fn test_format_host_aliased_service() {
        assert_eq!(
            format_host("ses", Some("us-east-1")),
            "email.us-east-1.amazonaws.com"
        );
    }
}
