//! Blocking HTTP GET run inside an effect worker.
//!
//! Any HTTP status is a response (status, headers, body). Only transport
//! and read problems are failures. The body is read in chunks so a cancelled
//! effect stops reading at the next chunk boundary.

use std::io::Read;
use std::time::Duration;

use thiserror::Error;

use crate::effect::EffectHandle;

/// Upper bound on a fetched body.
pub const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

const CHUNK_BYTES: usize = 16 * 1024;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone()).map_err(|_| FetchError::Decode)
    }
}

/// Why a fetch produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("error reading response body: {0}")]
    Read(String),
    #[error("response body exceeds {} bytes", MAX_BODY_BYTES)]
    TooLarge,
    #[error("response body is not valid UTF-8")]
    Decode,
    #[error("request cancelled")]
    Cancelled,
}

/// Perform a GET, polling `checkpoint` for cancellation between chunks.
pub fn fetch(url: &str, checkpoint: &EffectHandle) -> Result<HttpResponse, FetchError> {
    tracing::info!(%url, "fetching");
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(30))
        .build();

    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            tracing::warn!(%url, error = %transport, "fetch failed");
            return Err(FetchError::Network(transport.to_string()));
        }
    };

    let status = response.status();
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();

    let body = read_body(response.into_reader(), checkpoint)?;
    tracing::info!(%url, status, bytes = body.len(), "fetch complete");
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn read_body(reader: impl Read, checkpoint: &EffectHandle) -> Result<Vec<u8>, FetchError> {
    let mut reader = reader.take(MAX_BODY_BYTES + 1);
    let mut body = Vec::new();
    let mut chunk = vec![0u8; CHUNK_BYTES];
    loop {
        if checkpoint.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let n = reader
            .read(&mut chunk)
            .map_err(|e| FetchError::Read(e.to_string()))?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
        if body.len() as u64 > MAX_BODY_BYTES {
            return Err(FetchError::TooLarge);
        }
    }
    Ok(body)
}

// ============================================================================
// TESTS
// ============================================================================
