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

//! Error kinds produced by the signing pipeline.

use thiserror::Error;

/// All errors this crate can return.
///
/// Every variant maps to one of the four kinds of the signing model:
/// malformed caller input, a value that fails a strict wire-format
/// check, a state machine used out of order, or missing configuration
/// needed to complete a signature.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed URL, duplicate headers, invalid chunk/body length,
    /// a policy missing required fields, or a signature that isn't
    /// lowercase hex.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A timestamp, event frame, or header value that doesn't satisfy
    /// its strict wire-format contract (regex, CRC, length limit).
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A chunked signer or event-stream signer used out of its
    /// expected sequence.
    #[error("state violation: {0}")]
    StateViolation(String),

    /// Neither a URL host nor `credentials.service` was supplied, so
    /// the signer has nothing to derive a scope from.
    #[error("missing configuration: {0}")]
    MissingConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
