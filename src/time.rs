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

//! Timestamp and date-stamp formatting for SigV4 signing.

use crate::error::Error;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// UTC instant used throughout the signing API.
pub type UtcTime = DateTime<Utc>;

lazy_static! {
    static ref TIMESTAMP_REGEX: Regex = Regex::new(r"^\d{8}T\d{6}Z$").unwrap();
}

/// Returns the current instant, truncated to whole seconds (SigV4
/// timestamps carry no sub-second precision).
pub fn now() -> UtcTime {
    Utc::now()
}

/// Formats `time` as the 8-character date stamp `YYYYMMDD`.
pub fn format_date(time: UtcTime) -> String {
    time.format("%Y%m%d").to_string()
}

/// Formats `time` as the 16-character basic ISO 8601 timestamp
/// `YYYYMMDDTHHMMSSZ`.
pub fn format_timestamp(time: UtcTime) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Validates that `timestamp` matches the 16-character
/// `YYYYMMDDTHHMMSSZ` form required everywhere a signing timestamp is
/// accepted from a caller.
pub fn validate_timestamp(timestamp: &str) -> Result<(), Error> {
    if TIMESTAMP_REGEX.is_match(timestamp) {
        Ok(())
    } else {
        Err(Error::InvalidFormat(format!(
            "timestamp `{timestamp}` does not match YYYYMMDDTHHMMSSZ"
        )))
    }
}

/// Returns the date-stamp portion (first 8 characters) of a full
/// timestamp or of a date-stamp itself: `derive()` accepts either.
pub fn date_stamp_of(timestamp_or_date: &str) -> &str {
    if timestamp_or_date.len() >= 8 {
        &timestamp_or_date[..8]
    } else {
        timestamp_or_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date_and_timestamp() {
        let t = Utc.with_ymd_and_hms(2019, 9, 1, 8, 47, 43).unwrap();
        assert_eq!(format_date(t), "20190901");
        assert_eq!(format_timestamp(t), "20190901T084743Z");
    }

    #[test]
    fn test_validate_timestamp() {
        assert!(validate_timestamp("20190901T084743Z").is_ok());
        assert!(validate_timestamp("2019-09-01T08:47:43Z").is_err());
        assert!(validate_timestamp("20190901T084743").is_err());
    }

    #[test]
    fn test_date_stamp_of() {
        assert_eq!(date_stamp_of("20190901T084743Z"), "20190901");
        assert_eq!(date_stamp_of("20190901"), "20190901");
    }
}
