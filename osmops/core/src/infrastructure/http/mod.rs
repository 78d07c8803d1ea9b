// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP Request/Response Builder
//!
//! Composable construction of outbound requests and validation of the
//! responses they get back, decoupled from the transport that moves bytes.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Every NBI call is an [`Exchange`]: an ordered list of
//!   request builders, a [`Transport`] to send the built request through and
//!   an ordered list of response handlers.
//!
//! # Usage
//!
//! ```ignore
//! let mut views: Vec<NsInstanceView> = Vec::new();
//! request(vec![get(), at(&url), accept(&[MediaType::Json])])
//!     .handle_with(expect_success())
//!     .handle_with(read_json_response(&mut views))
//!     .run_with(transport)?;
//! ```

mod exchange;
mod request;
mod response;
mod transport;

pub use exchange::{request, Exchange, Reply};
pub use request::{
    accept, at, authorization, bearer_token, body, build, content, get, header, json_body,
    post, put, MediaType, Request, RequestBuilder,
};
pub use response::{
    expect_status_code_one_of, expect_success, read_json_response, ExpectStatus, ReadJson,
    Response, ResponseHandler, StatusExpectation,
};
pub use transport::{BoxError, ReqwestTransport, Transport, TransportError};

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The exchange failed in transit. `reply` holds the status line and
    /// headers of the response, if the transport got one.
    #[error("transport failure: {source}")]
    Transport {
        reply: Option<Reply>,
        source: BoxError,
    },

    #[error("unexpected response status: {status}")]
    UnexpectedStatus { status: StatusCode },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to read response body: {0}")]
    ReadBody(#[from] std::io::Error),
}

impl HttpError {
    /// Status of the response behind the error, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Transport { reply, .. } => reply.as_ref().map(|r| r.status),
            HttpError::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }
}
