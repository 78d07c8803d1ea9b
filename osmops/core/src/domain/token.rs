// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! NBI Bearer Token
//!
//! Opaque credential issued by the NBI token endpoint together with the Unix
//! time (in seconds, fractional) at which it stops being valid.

use std::fmt;

use chrono::Utc;
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, PartialEq)]
pub struct Token {
    id: String,
    expires_at: f64,
}

/// The only fields of the token payload the client cares about.
#[derive(Deserialize, Default)]
#[serde(default)]
struct NbiTokenPayloadView {
    id: String,
    expires: f64,
}

impl Token {
    pub fn new(id: impl Into<String>, expires_at: f64) -> Self {
        Self {
            id: id.into(),
            expires_at,
        }
    }

    /// Build a token out of the JSON body returned by the NBI token endpoint.
    ///
    /// Missing `id` or `expires` fields yield a token that is always expired;
    /// a body that isn't a JSON object is a decode error.
    pub fn from_nbi_payload(data: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(data)?;
        Self::from_nbi_value(value)
    }

    pub fn from_nbi_value(value: Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(serde_json::Error::custom(format!(
                "token payload must be a JSON object, got: {value}"
            )));
        }
        let payload: NbiTokenPayloadView = serde_json::from_value(value)?;
        Ok(Self::new(payload.id, payload.expires))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Expiry as Unix seconds.
    pub fn expires_at(&self) -> f64 {
        self.expires_at
    }

    pub fn has_expired(&self) -> bool {
        let now = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        self.has_expired_at(now)
    }

    /// Same as [`Token::has_expired`] but against the given Unix time.
    pub fn has_expired_at(&self, unix_seconds: f64) -> bool {
        self.id.is_empty() || self.expires_at <= unix_seconds
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
