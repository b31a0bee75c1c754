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

//! AWS Signature Version 4 signing: header and query-string request
//! signing for any service, plus S3's chunked-upload and event-stream
//! extensions.
//!
//! The generic signer lives at the crate root (`signer`, `derive`,
//! `canonical`, `endpoint`, ...); S3-specific behavior lives under
//! [`s3`], and the binary event-stream codec plus its per-event signer
//! live under [`event_stream`].

pub mod canonical;
pub mod creds;
pub mod derive;
pub mod endpoint;
pub mod error;
pub mod event_stream;
pub mod header_constants;
pub mod multimap;
pub mod request;
pub mod s3;
pub mod signer;
pub mod time;
pub mod url;

pub use creds::{Credentials, Provider, StaticProvider};
pub use error::{Error, Result};
pub use request::SignedRequest;
