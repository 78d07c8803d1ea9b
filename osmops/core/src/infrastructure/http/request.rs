// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST,
};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use super::HttpError;

/// Outbound request as assembled by [`RequestBuilder`]s.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Option<Url>,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// A fresh handle on the body, so the same content can be sent again,
    /// e.g. when a transport follows a 307/308 redirect.
    pub fn replay_body(&self) -> Bytes {
        self.body.clone()
    }

    pub fn into_parts(self) -> (Method, Option<Url>, HeaderMap, Bytes) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// One independent concern of a request: method, target, headers, body...
pub type RequestBuilder<'a> = Box<dyn FnOnce(&mut Request) -> Result<(), HttpError> + 'a>;

/// Apply the builders in order to a fresh request. The first failing builder
/// aborts the build; a request without a target URL is never returned.
pub fn build<'a>(
    builders: impl IntoIterator<Item = RequestBuilder<'a>>,
) -> Result<Request, HttpError> {
    let mut request = Request::default();
    for builder in builders {
        builder(&mut request)?;
    }
    if request.url.is_none() {
        return Err(HttpError::InvalidRequest("no target URL".to_string()));
    }
    Ok(request)
}

/// Media types the NBI client sends or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Json,
    Yaml,
    Gzip,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::Yaml => "application/yaml",
            MediaType::Gzip => "application/gzip",
        }
    }
}

fn method<'a>(method: Method) -> RequestBuilder<'a> {
    Box::new(move |request: &mut Request| {
        request.method = method;
        Ok(())
    })
}

pub fn get<'a>() -> RequestBuilder<'a> {
    method(Method::GET)
}

pub fn post<'a>() -> RequestBuilder<'a> {
    method(Method::POST)
}

pub fn put<'a>() -> RequestBuilder<'a> {
    method(Method::PUT)
}

/// Target the given URL and set the `Host` header to match.
pub fn at(url: &Url) -> RequestBuilder<'_> {
    Box::new(move |request: &mut Request| {
        let host = url
            .host_str()
            .ok_or_else(|| HttpError::InvalidRequest(format!("URL has no host: {url}")))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        request.headers.insert(HOST, header_value(&authority)?);
        request.url = Some(url.clone());
        Ok(())
    })
}

pub fn content<'a>(media_type: MediaType) -> RequestBuilder<'a> {
    Box::new(move |request: &mut Request| {
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(media_type.as_str()));
        Ok(())
    })
}

/// Set `Accept` to the given media types; no header if the list is empty.
pub fn accept(media_types: &[MediaType]) -> RequestBuilder<'_> {
    Box::new(move |request: &mut Request| {
        if media_types.is_empty() {
            return Ok(());
        }
        let value = media_types
            .iter()
            .map(MediaType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        request.headers.insert(ACCEPT, header_value(&value)?);
        Ok(())
    })
}

/// Set an arbitrary header, e.g. `Content-Filename`. The name must be a
/// lowercase header name.
pub fn header<'a>(name: &'static str, value: impl Into<String>) -> RequestBuilder<'a> {
    let value = value.into();
    Box::new(move |request: &mut Request| {
        let name = HeaderName::from_static(name);
        request.headers.insert(name, header_value(&value)?);
        Ok(())
    })
}

pub fn authorization<'a>(value: impl Into<String>) -> RequestBuilder<'a> {
    let value = value.into();
    Box::new(move |request: &mut Request| {
        request.headers.insert(AUTHORIZATION, header_value(&value)?);
        Ok(())
    })
}

/// Set a bearer `Authorization` header with a token acquired at build time.
/// A provider failure fails the build.
pub fn bearer_token<'a, F>(acquire_token: F) -> RequestBuilder<'a>
where
    F: FnOnce() -> Result<String, HttpError> + 'a,
{
    Box::new(move |request: &mut Request| {
        let token = acquire_token()?;
        authorization(format!("Bearer {token}"))(request)
    })
}

/// Use the given bytes as body and set `Content-Length` accordingly.
pub fn body<'a>(content: impl Into<Bytes>) -> RequestBuilder<'a> {
    let content = content.into();
    Box::new(move |request: &mut Request| {
        request
            .headers
            .insert(CONTENT_LENGTH, HeaderValue::from(content.len()));
        request.body = content;
        Ok(())
    })
}

/// Serialize the given data to JSON and use it as body.
pub fn json_body<T>(data: &T) -> RequestBuilder<'_>
where
    T: Serialize + ?Sized,
{
    Box::new(move |request: &mut Request| {
        let content = serde_json::to_vec(data).map_err(HttpError::Encode)?;
        body(content)(request)
    })
}

fn header_value(value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value)
        .map_err(|_| HttpError::InvalidRequest(format!("invalid header value: {value}")))
}
