// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;
use std::io::{self, Cursor, Read};

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::HttpError;

/// Response received from a transport. Dropping it closes the body.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Box<dyn Read + Send>,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    /// Response with no headers and an empty body.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), io::empty())
    }

    pub fn with_body(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, HeaderMap::new(), Cursor::new(body.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_mut(&mut self) -> &mut (dyn Read + Send) {
        self.body.as_mut()
    }

    pub fn read_body(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn close(self) {
        drop(self.body);
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Validates or consumes a response. Handlers run in registration order and
/// the first failure stops the chain.
pub trait ResponseHandler {
    fn handle(&mut self, response: &mut Response) -> Result<(), HttpError>;
}

impl<F> ResponseHandler for F
where
    F: FnMut(&mut Response) -> Result<(), HttpError>,
{
    fn handle(&mut self, response: &mut Response) -> Result<(), HttpError> {
        self(response)
    }
}

/// Which status codes a handler accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusExpectation {
    /// Any 2xx.
    Success,
    OneOf(Vec<StatusCode>),
}

impl StatusExpectation {
    pub fn one_of(codes: &[u16]) -> Self {
        StatusExpectation::OneOf(
            codes
                .iter()
                .filter_map(|code| StatusCode::from_u16(*code).ok())
                .collect(),
        )
    }

    pub fn accepts(&self, status: StatusCode) -> bool {
        match self {
            StatusExpectation::Success => status.is_success(),
            StatusExpectation::OneOf(codes) => codes.contains(&status),
        }
    }

    fn check(&self, status: StatusCode) -> Result<(), HttpError> {
        if self.accepts(status) {
            Ok(())
        } else {
            Err(HttpError::UnexpectedStatus { status })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpectStatus {
    expected: StatusExpectation,
}

impl ResponseHandler for ExpectStatus {
    fn handle(&mut self, response: &mut Response) -> Result<(), HttpError> {
        self.expected.check(response.status())
    }
}

/// Fail unless the response status is 2xx.
pub fn expect_success() -> ExpectStatus {
    ExpectStatus {
        expected: StatusExpectation::Success,
    }
}

/// Fail unless the response status is one of the given codes, e.g. 201 or
/// 409 for a create that may hit an existing resource.
pub fn expect_status_code_one_of(codes: &[u16]) -> ExpectStatus {
    ExpectStatus {
        expected: StatusExpectation::one_of(codes),
    }
}

/// Deserialize a JSON response body into a target.
pub struct ReadJson<'a, T> {
    target: &'a mut T,
    expected: StatusExpectation,
}

/// Read the JSON body into `target`, requiring a 200 unless told otherwise
/// through [`ReadJson::expecting`].
pub fn read_json_response<T>(target: &mut T) -> ReadJson<'_, T>
where
    T: DeserializeOwned,
{
    ReadJson {
        target,
        expected: StatusExpectation::OneOf(vec![StatusCode::OK]),
    }
}

impl<'a, T> ReadJson<'a, T> {
    pub fn expecting(mut self, expected: StatusExpectation) -> Self {
        self.expected = expected;
        self
    }
}

impl<T> ResponseHandler for ReadJson<'_, T>
where
    T: DeserializeOwned,
{
    fn handle(&mut self, response: &mut Response) -> Result<(), HttpError> {
        self.expected.check(response.status())?;
        let data = response.read_body()?;
        *self.target = serde_json::from_slice(&data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Payload {
        id: String,
    }

    #[test]
    fn test_expect_success() {
        let mut ok = Response::from_status(StatusCode::ACCEPTED);
        assert!(expect_success().handle(&mut ok).is_ok());

        let mut bad = Response::from_status(StatusCode::NOT_FOUND);
        let err = expect_success().handle(&mut bad).unwrap_err();
        assert!(matches!(
            err,
            HttpError::UnexpectedStatus { status } if status == StatusCode::NOT_FOUND
        ));
    }

    #[test]
    fn test_expect_status_code_one_of() {
        let mut handler = expect_status_code_one_of(&[201, 409]);
        assert!(handler.handle(&mut Response::from_status(StatusCode::CREATED)).is_ok());
        assert!(handler.handle(&mut Response::from_status(StatusCode::CONFLICT)).is_ok());
        assert!(handler.handle(&mut Response::from_status(StatusCode::OK)).is_err());
    }

    #[test]
    fn test_read_json_response() {
        let mut target = Payload::default();
        let mut res = Response::with_body(StatusCode::OK, r#"{"id": "x", "other": 1}"#);
        read_json_response(&mut target).handle(&mut res).unwrap();
        assert_eq!(target.id, "x");
    }

    #[test]
    fn test_read_json_response_rejects_unexpected_status() {
        let mut target = Payload::default();
        let mut res = Response::with_body(StatusCode::CREATED, r#"{"id": "x"}"#);
        let result = read_json_response(&mut target).handle(&mut res);
        assert!(matches!(result, Err(HttpError::UnexpectedStatus { .. })));
        assert_eq!(target.id, "");
    }

    #[test]
    fn test_read_json_response_custom_status() {
        let mut target = Payload::default();
        let mut res = Response::with_body(StatusCode::CREATED, r#"{"id": "x"}"#);
        read_json_response(&mut target)
            .expecting(StatusExpectation::one_of(&[200, 201]))
            .handle(&mut res)
            .unwrap();
        assert_eq!(target.id, "x");
    }

    #[test]
    fn test_read_json_response_decode_error() {
        let mut target = Payload::default();
        let mut res = Response::with_body(StatusCode::OK, "{ not json");
        let result = read_json_response(&mut target).handle(&mut res);
        assert!(matches!(result, Err(HttpError::Decode(_))));
    }

    #[test]
    fn test_closure_handler() {
        let mut seen = None;
        let mut handler = |res: &mut Response| -> Result<(), HttpError> {
            seen = Some(res.status());
            Ok(())
        };
        handler.handle(&mut Response::from_status(StatusCode::IM_A_TEAPOT)).unwrap();
        assert_eq!(seen, Some(StatusCode::IM_A_TEAPOT));
    }
}
