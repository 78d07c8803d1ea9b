// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Authorization Manager
//!
//! Hands out NBI bearer tokens, requesting a new one from the token endpoint
//! only when there is no cached token or the cached one has expired.
//!
//! # Architecture
//!
//! - **Layer:** Application
//! - **Collaborators:** Domain `Token`, `UserCredentials`, `Connection`;
//!   Infrastructure `Transport`

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::connection::Connection;
use crate::domain::credentials::UserCredentials;
use crate::domain::token::Token;
use crate::infrastructure::http::{
    accept, at, content, expect_success, json_body, post, read_json_response, request,
    HttpError, MediaType, StatusExpectation, Transport,
};

pub struct AuthorizationManager {
    connection: Connection,
    credentials: UserCredentials,
    transport: Arc<dyn Transport>,
    token: Option<Token>,
}

impl AuthorizationManager {
    pub fn new(
        connection: Connection,
        credentials: UserCredentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            connection,
            credentials,
            transport,
            token: None,
        }
    }

    /// Return the cached token if still valid, otherwise request a new one.
    ///
    /// Failures aren't retried and leave the cached token untouched.
    pub fn access_token(&mut self) -> Result<Token, HttpError> {
        match &self.token {
            Some(token) if !token.has_expired() => Ok(token.clone()),
            _ => {
                let token = self.request_token()?;
                self.token = Some(token.clone());
                Ok(token)
            }
        }
    }

    fn request_token(&self) -> Result<Token, HttpError> {
        let url = self.connection.tokens();
        let mut payload = Value::Null;

        // YAML content type with a JSON body, same as the OSM client
        request(vec![
            post(),
            at(&url),
            content(MediaType::Yaml),
            accept(&[MediaType::Json]),
            json_body(&self.credentials),
        ])
        .handle_with(expect_success())
        .handle_with(read_json_response(&mut payload).expecting(StatusExpectation::Success))
        .run_with(self.transport.as_ref())?;

        let token = Token::from_nbi_value(payload)?;
        debug!(
            username = %self.credentials.username,
            expires_at = token.expires_at(),
            "Obtained NBI access token"
        );
        Ok(token)
    }
}

impl fmt::Debug for AuthorizationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationManager")
            .field("connection", &self.connection)
            .field("credentials", &self.credentials)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
