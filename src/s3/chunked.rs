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

//! S3 chunked upload signer (C6, §4.6): a pull-style state machine
//! signing a payload of known length in equal-size chunks, chained to
//! a seed signature, plus a `Stream` adapter over arbitrary input.
//!
//! This protocol has no trailer, unlike the checksum-trailer variant
//! of chunked upload; the `Poll`-driven buffering idiom below follows
//! that related encoder's shape regardless.

use crate::canonical::{sha256_hex, EMPTY_SHA256};
use crate::creds::Credentials;
use crate::derive::{sign_chunk, SigningData};
use crate::error::Error;
use crate::header_constants::*;
use crate::multimap::MultimapExt;
use crate::request::SignedRequest;
use bytes::{Bytes, BytesMut};
use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

const CHUNK_SIGNATURE_PREFIX_LEN: usize = ";chunk-signature=".len();
const SIGNATURE_HEX_LEN: usize = 64;
const CRLF_PAIR_LEN: usize = 4; // one \r\n after the header, one after the data

fn chunk_overhead(len: usize) -> usize {
    format!("{len:x}").len() + CHUNK_SIGNATURE_PREFIX_LEN + SIGNATURE_HEX_LEN + CRLF_PAIR_LEN
}

/// The ordered list of non-terminal chunk lengths for a body of
/// `body_length` bytes split into `chunk_size`-byte pieces (the last
/// one short if it doesn't divide evenly).
fn chunk_plan(body_length: u64, chunk_size: usize) -> Vec<usize> {
    if body_length == 0 {
        return Vec::new();
    }
    let chunk_size = chunk_size as u64;
    let full = body_length / chunk_size;
    let remainder = body_length % chunk_size;
    let mut plan: Vec<usize> = std::iter::repeat(chunk_size as usize).take(full as usize).collect();
    if remainder > 0 {
        plan.push(remainder as usize);
    }
    plan
}

/// `content-length` including chunk framing overhead (§4.6).
pub fn chunked_content_length(body_length: u64, chunk_size: usize) -> u64 {
    let plan = chunk_plan(body_length, chunk_size);
    let overhead: usize = plan.iter().copied().chain(std::iter::once(0usize)).map(chunk_overhead).sum();
    body_length + overhead as u64
}

/// Validates and applies the header effects of §4.6 before the outer
/// request is signed: `x-amz-content-sha256`,
/// `x-amz-decoded-content-length`, `content-length`, and an
/// `aws-chunked` prefix on `content-encoding`.
pub fn prepare_streaming_headers(request: &mut SignedRequest, body_length: u64, chunk_size: usize) -> Result<(), Error> {
    if chunk_size < MIN_CHUNK_SIZE {
        return Err(Error::InvalidInput(format!(
            "chunk size {chunk_size} is below the minimum of {MIN_CHUNK_SIZE}"
        )));
    }

    request.headers.set(X_AMZ_CONTENT_SHA256, STREAMING_AWS4_HMAC_SHA256_PAYLOAD);
    request.headers.set(X_AMZ_DECODED_CONTENT_LENGTH, body_length.to_string());
    request
        .headers
        .set(CONTENT_LENGTH, chunked_content_length(body_length, chunk_size).to_string());

    match request.headers.get(CONTENT_ENCODING).cloned() {
        Some(existing) if existing.trim().to_lowercase().starts_with("aws-chunked") => {}
        Some(existing) => {
            request.headers.set(CONTENT_ENCODING, format!("aws-chunked,{existing}"));
        }
        None => {
            request.headers.set(CONTENT_ENCODING, "aws-chunked");
        }
    }

    Ok(())
}

/// Signs the outer request for streaming upload (§4.6 "signing
/// protocol"): forces the `STREAMING-AWS4-HMAC-SHA256-PAYLOAD` body
/// hash sentinel and returns its signature, to be used as the seed for
/// the first chunk.
pub fn sign_streaming_request(credentials: &Credentials, request: &mut SignedRequest, body_length: u64, chunk_size: usize) -> Result<String, Error> {
    prepare_streaming_headers(request, body_length, chunk_size)?;
    request.body = crate::canonical::BodyHash::Precomputed(STREAMING_AWS4_HMAC_SHA256_PAYLOAD.to_string());
    request.unsigned = false;

    let authorization = super::sign_request(credentials, request)?;
    let plan_len = chunk_plan(body_length, chunk_size).len();
    log::debug!("s3::chunked::sign_streaming_request: seeded a {plan_len}-chunk upload of {body_length} bytes");
    crate::signer::parse_authorization(&authorization).map(|p| p.signature)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Streaming(usize),
    Terminal,
    Done,
}

/// Pull-style state machine: `signer(chunk)` validates `chunk`'s
/// length against the expected position in the plan, computes its
/// chained signature, and returns the wire framing string.
pub struct ChunkedSigner {
    plan: Vec<usize>,
    idx: usize,
    stage: Stage,
    last_signature: String,
    timestamp: String,
    signing: SigningData,
}

impl ChunkedSigner {
    pub fn new(body_length: u64, chunk_size: usize, seed_signature: String, timestamp: String, signing: SigningData) -> Self {
        let plan = chunk_plan(body_length, chunk_size);
        let stage = if plan.is_empty() { Stage::Terminal } else { Stage::Streaming(0) };
        ChunkedSigner {
            plan,
            idx: 0,
            stage,
            last_signature: seed_signature,
            timestamp,
            signing,
        }
    }

    /// Returns the expected length of the next non-terminal chunk, if
    /// any remain.
    pub fn next_expected_len(&self) -> Option<usize> {
        match self.stage {
            Stage::Streaming(_) => self.plan.get(self.idx).copied(),
            Stage::Terminal | Stage::Done => None,
        }
    }

    /// Signs `chunk` and returns the framing string: for a full or
    /// partial chunk, the `<hexlen>;chunk-signature=<sig>\r\n` prefix
    /// to concatenate with the chunk bytes (the caller appends a
    /// trailing `\r\n` as the separator before the next chunk); for
    /// the terminal (empty) chunk, the complete
    /// `0;chunk-signature=<sig>\r\n\r\n` frame, emitted alone.
    pub fn sign(&mut self, chunk: &[u8]) -> Result<String, Error> {
        match self.stage {
            Stage::Done => Err(Error::StateViolation(
                "chunked signer already completed; no further calls allowed".to_string(),
            )),
            Stage::Streaming(_) => {
                let expected = self.plan[self.idx];
                if chunk.len() != expected {
                    return Err(Error::StateViolation(format!(
                        "expected chunk of length {expected}, got {}",
                        chunk.len()
                    )));
                }
                let payload_hash = sha256_hex(chunk);
                let signature = sign_chunk(&self.last_signature, EMPTY_SHA256, &payload_hash, &self.timestamp, &self.signing);
                self.last_signature = signature.clone();
                self.idx += 1;
                self.stage = if self.idx < self.plan.len() {
                    Stage::Streaming(self.idx)
                } else {
                    Stage::Terminal
                };
                Ok(format!("{:x};chunk-signature={signature}\r\n", chunk.len()))
            }
            Stage::Terminal => {
                if !chunk.is_empty() {
                    return Err(Error::StateViolation(format!(
                        "expected the empty terminal chunk, got {} bytes",
                        chunk.len()
                    )));
                }
                let signature = sign_chunk(&self.last_signature, EMPTY_SHA256, EMPTY_SHA256, &self.timestamp, &self.signing);
                self.last_signature = signature.clone();
                self.stage = Stage::Done;
                Ok(format!("0;chunk-signature={signature}\r\n\r\n"))
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }
}

/// `Stream` adapter (§4.6 "stream adapter"): buffers arbitrary-sized
/// input into exact `chunk_size` pieces, signs each as it fills, and
/// on input exhaustion flushes the partial and terminal chunks. Fails
/// if the total consumed byte count doesn't equal `body_length`.
pub struct StreamingChunkEncoder<S> {
    inner: S,
    signer: ChunkedSigner,
    chunk_size: usize,
    body_length: u64,
    consumed: u64,
    buffer: BytesMut,
    inner_done: bool,
}

impl<S> StreamingChunkEncoder<S> {
    pub fn new(inner: S, signer: ChunkedSigner, chunk_size: usize, body_length: u64) -> Self {
        StreamingChunkEncoder {
            inner,
            signer,
            chunk_size,
            body_length,
            consumed: 0,
            buffer: BytesMut::new(),
            inner_done: false,
        }
    }

    fn flush_full_chunks(&mut self) -> Result<Option<Bytes>, Error> {
        if self.buffer.len() >= self.chunk_size {
            let chunk = self.buffer.split_to(self.chunk_size);
            let framing = self.signer.sign(&chunk)?;
            let mut out = BytesMut::with_capacity(framing.len() + chunk.len() + 2);
            out.extend_from_slice(framing.as_bytes());
            out.extend_from_slice(&chunk);
            out.extend_from_slice(b"\r\n");
            return Ok(Some(out.freeze()));
        }
        Ok(None)
    }

    fn flush_tail(&mut self) -> Result<Option<Bytes>, Error> {
        if !self.buffer.is_empty() {
            let chunk = self.buffer.split();
            let framing = self.signer.sign(&chunk)?;
            let mut out = BytesMut::with_capacity(framing.len() + chunk.len() + 2);
            out.extend_from_slice(framing.as_bytes());
            out.extend_from_slice(&chunk);
            out.extend_from_slice(b"\r\n");
            return Ok(Some(out.freeze()));
        }
        if !self.signer.is_done() {
            let framing = self.signer.sign(&[])?;
            return Ok(Some(Bytes::from(framing.into_bytes())));
        }
        Ok(None)
    }
}

impl<S, E> Stream for StreamingChunkEncoder<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    Error: From<E>,
{
    type Item = Result<Bytes, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(chunk) = this.flush_full_chunks().transpose() {
            return Poll::Ready(Some(chunk));
        }

        loop {
            if this.inner_done {
                return Poll::Ready(this.flush_tail().transpose());
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    this.inner_done = true;
                    if this.consumed != this.body_length {
                        return Poll::Ready(Some(Err(Error::StateViolation(format!(
                            "consumed {} bytes but body_length was {}",
                            this.consumed, this.body_length
                        )))));
                    }
                    return Poll::Ready(this.flush_tail().transpose());
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(Error::from(e)))),
                Poll::Ready(Some(Ok(bytes))) => {
                    this.consumed += bytes.len() as u64;
                    this.buffer.extend_from_slice(&bytes);
                    if let Some(chunk) = this.flush_full_chunks().transpose() {
                        return Poll::Ready(Some(chunk));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;

    fn test_signing() -> SigningData {
        derive("20190901", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY", "us-east-1", "s3")
    }

    #[test]
    fn test_chunk_plan_exact_division() {
        assert_eq!(chunk_plan(131072, 65536), vec![65536, 65536]);
    }

    #[test]
    fn test_chunk_plan_with_remainder() {
        assert_eq!(chunk_plan(66560, 65536), vec![65536, 1024]);
    }

    #[test]
    fn test_chunk_plan_empty_body() {
        assert_eq!(chunk_plan(0, 8192), Vec::<usize>::new());
    }

    #[test]
    fn test_s3_chunked_content_length_literal_vector() {
        assert_eq!(chunked_content_length(66560, 65536), 66824);
    }

    #[test]
    fn test_zero_body_yields_one_terminal_chunk() {
        let signing = test_signing();
        let mut signer = ChunkedSigner::new(0, 8192, "seed".to_string(), "20190901T084743Z".to_string(), signing);
        assert!(signer.next_expected_len().is_none());
        let frame = signer.sign(&[]).unwrap();
        assert!(frame.starts_with("0;chunk-signature="));
        assert!(signer.is_done());
        assert!(signer.sign(&[]).is_err());
    }

    #[test]
    fn test_chunk_length_mismatch_is_state_violation() {
        let signing = test_signing();
        let mut signer = ChunkedSigner::new(100, 50, "seed".to_string(), "20190901T084743Z".to_string(), signing);
        assert!(signer.sign(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_chunk_signature_chains() {
        let signing = test_signing();
        let mut signer = ChunkedSigner::new(100, 50, "seed".to_string(), "20190901T084743Z".to_string(), signing);
        let chunk1 = vec![b'a'; 50];
        let chunk2 = vec![b'b'; 50];
        let frame1 = signer.sign(&chunk1).unwrap();
        let frame2 = signer.sign(&chunk2).unwrap();
        assert!(frame1.starts_with("32;chunk-signature="));
        assert!(frame2.starts_with("32;chunk-signature="));
        assert_ne!(frame1, frame2);
        let terminal = signer.sign(&[]).unwrap();
        assert!(terminal.starts_with("0;chunk-signature="));
        assert!(signer.is_done());
    }

    #[test]
    fn test_sum_of_emitted_lengths_equals_content_length() {
        let body_length: u64 = 66560;
        let chunk_size = 65536;
        let signing = test_signing();
        let mut signer = ChunkedSigner::new(body_length, chunk_size, "seed".to_string(), "20190901T084743Z".to_string(), signing);

        let mut total = 0u64;
        let chunk1 = vec![b'a'; 65536];
        let frame1 = signer.sign(&chunk1).unwrap();
        total += frame1.len() as u64 + chunk1.len() as u64 + 2; // + trailing CRLF separator

        let chunk2 = vec![b'b'; 1024];
        let frame2 = signer.sign(&chunk2).unwrap();
        total += frame2.len() as u64 + chunk2.len() as u64 + 2;

        let terminal = signer.sign(&[]).unwrap();
        total += terminal.len() as u64;

        assert_eq!(total, chunked_content_length(body_length, chunk_size));
    }
}
