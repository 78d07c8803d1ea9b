// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_LENGTH, HOST};

use super::{HttpError, Request, Response};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to complete an exchange. Carries the response too if the
/// transport got one, so callers can inspect it.
pub struct TransportError {
    source: BoxError,
    response: Option<Response>,
}

impl TransportError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
            response: None,
        }
    }

    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn into_parts(self) -> (BoxError, Option<Response>) {
        (self.source, self.response)
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportError")
            .field("source", &self.source)
            .field("response", &self.response)
            .finish()
    }
}

/// Sends a request and hands back the response. The real implementation is
/// [`ReqwestTransport`]; tests substitute their own.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> Result<Response, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(Request) -> Result<Response, TransportError> + Send + Sync,
{
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        self(request)
    }
}

/// Blocking reqwest client with an overall per-request timeout.
///
/// Server certificates aren't verified, same as the OSM client does. This
/// leaves the connection open to man-in-the-middle attacks.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| HttpError::Transport {
                reply: None,
                source: e.into(),
            })?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        let (method, url, mut headers, body) = request.into_parts();
        let url = url.ok_or_else(|| TransportError::new("request has no target URL"))?;

        // reqwest derives these from the URL and body
        headers.remove(HOST);
        headers.remove(CONTENT_LENGTH);

        let mut builder = self.client.request(method, url).headers(headers);
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(TransportError::new)?;
        let status = response.status();
        let headers = response.headers().clone();
        Ok(Response::new(status, headers, response))
    }
}
