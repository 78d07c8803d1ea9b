// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::request::{build, RequestBuilder};
use super::response::{Response, ResponseHandler};
use super::{HttpError, Transport};

/// Status line and headers of a response. The body has been consumed by the
/// handlers or discarded.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl From<&Response> for Reply {
    fn from(response: &Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
        }
    }
}

/// A request waiting to be built and sent, plus the handlers that will
/// process its response.
pub struct Exchange<'a> {
    builders: Vec<RequestBuilder<'a>>,
    handlers: Vec<Box<dyn ResponseHandler + 'a>>,
}

/// Start an exchange from the given request builders.
pub fn request<'a>(builders: impl IntoIterator<Item = RequestBuilder<'a>>) -> Exchange<'a> {
    Exchange {
        builders: builders.into_iter().collect(),
        handlers: Vec::new(),
    }
}

impl<'a> Exchange<'a> {
    /// Append a request builder, run after the ones given at creation.
    pub fn with_builder(mut self, builder: RequestBuilder<'a>) -> Self {
        self.builders.push(builder);
        self
    }

    pub fn handle_with(mut self, handler: impl ResponseHandler + 'a) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Build the request, send it and run the response handlers in order.
    ///
    /// Nothing is sent if the build fails. A transport failure is returned
    /// with the status and headers of the response the transport got, if
    /// any. The first
    /// failing handler aborts the chain. The response body is closed on
    /// every path.
    pub fn run_with(self, transport: &dyn Transport) -> Result<Reply, HttpError> {
        let Exchange {
            builders,
            mut handlers,
        } = self;

        let request = build(builders)?;
        let mut response = transport.send(request).map_err(|e| {
            let (source, response) = e.into_parts();
            let reply = response.map(|response| {
                let reply = Reply::from(&response);
                response.close();
                reply
            });
            HttpError::Transport { reply, source }
        })?;

        let outcome = handlers
            .iter_mut()
            .try_for_each(|handler| handler.handle(&mut response));

        let reply = Reply::from(&response);
        response.close();

        outcome.map(|_| reply)
    }
}
