// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory stand-in for the OSM NBI, recording every request it gets.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use osmops_core::infrastructure::http::{Request, Response, Transport, TransportError};
use osmops_core::{Connection, HostAndPort, Session, UserCredentials};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

pub const TOKEN_ID: &str = "TuD41hLjDvjlR2cPcAFvWcr6FGvRhIk2";
pub const OPENLDAP_NSD_ID: &str = "aba58e40-d65f-4f4e-be0a-e248c14d3e03";
pub const MYLOCATION_VIM_ID: &str = "4a4425f7-3e72-4d45-a4ec-4241186f3547";
pub const LDAP_NS_INSTANCE_ID: &str = "0335c32c-d28c-4d79-9b94-0ffa36326932";

pub fn valid_token_payload() -> String {
    json!({
        "issued_at": 1631127131.1251214,
        "expires": 2631127131.1251214,
        "_id": TOKEN_ID,
        "id": TOKEN_ID,
        "project_id": "fada443a-905c-4241-8a33-4dcdbdac55e7",
        "project_name": "admin",
        "username": "admin",
    })
    .to_string()
}

pub fn expired_token_payload() -> String {
    json!({
        "issued_at": 1631123531.1251214,
        "expires": 1631127131.1251214,
        "id": TOKEN_ID,
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub struct RecordedExchange {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub status: StatusCode,
}

impl RecordedExchange {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub struct MockNbi {
    token_payload: String,
    ns_descriptors: Value,
    vim_accounts: Value,
    ns_instances: Value,
    existing_packages: Vec<String>,
    exchanges: Mutex<Vec<RecordedExchange>>,
}

impl MockNbi {
    pub fn new() -> Self {
        Self {
            token_payload: valid_token_payload(),
            ns_descriptors: json!([
                {"_id": OPENLDAP_NSD_ID, "id": "openldap_ns", "name": "openldap"},
                {"_id": "a6f1bb2b-c2d7-4bc8-8b3e-a2e3d0b1b6a1", "id": "squid_ns", "name": "squid"},
            ]),
            vim_accounts: json!([
                {"_id": MYLOCATION_VIM_ID, "name": "mylocation1", "vim_type": "dummy"},
            ]),
            ns_instances: json!([
                {"_id": LDAP_NS_INSTANCE_ID, "name": "ldap", "nsd-ref": "openldap_ns"},
                {"_id": "136fe5a2-1ea4-4ff1-a3e4-7d7d8c64e6a1", "name": "dup"},
                {"_id": "2b1d6e4f-7f2c-4d4a-b9b3-0d4c5e6f7a8b", "name": "dup"},
            ]),
            existing_packages: vec!["openldap_knf".to_string(), "openldap_ns".to_string()],
            exchanges: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token_payload(mut self, payload: impl Into<String>) -> Self {
        self.token_payload = payload.into();
        self
    }

    pub fn with_ns_instances(mut self, instances: Value) -> Self {
        self.ns_instances = instances;
        self
    }

    pub fn into_session(self) -> (Session, Arc<MockNbi>) {
        let nbi = Arc::new(self);
        let session = Session::with_transport(connection(), credentials(), nbi.clone());
        (session, nbi)
    }

    pub fn exchanges(&self) -> Vec<RecordedExchange> {
        self.exchanges.lock().clone()
    }

    /// `METHOD path` of every request received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.exchanges
            .lock()
            .iter()
            .map(|e| format!("{} {}", e.method, e.path))
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.exchanges
            .lock()
            .iter()
            .filter(|e| e.method == method && e.path == path)
            .count()
    }

    fn route(&self, request: &Request, path: &str) -> (StatusCode, String) {
        let method = request.method().clone();
        if method == Method::POST && path == "/osm/admin/v1/tokens" {
            return self.issue_token(request);
        }
        let expected_auth = format!("Bearer {TOKEN_ID}");
        if request.header("authorization") != Some(expected_auth.as_str()) {
            return (StatusCode::UNAUTHORIZED, String::new());
        }

        match (method, path) {
            (Method::GET, "/osm/nsd/v1/ns_descriptors") => {
                (StatusCode::OK, self.ns_descriptors.to_string())
            }
            (Method::GET, "/osm/admin/v1/vim_accounts") => {
                (StatusCode::OK, self.vim_accounts.to_string())
            }
            (Method::GET, "/osm/nslcm/v1/ns_instances_content") => {
                (StatusCode::OK, self.ns_instances.to_string())
            }
            (Method::POST, "/osm/nslcm/v1/ns_instances_content") => (
                StatusCode::CREATED,
                r#"{"id": "794ef9a2-8bbb-42c1-869a-bab6422982ec"}"#.to_string(),
            ),
            (Method::POST, p)
                if p.starts_with("/osm/nslcm/v1/ns_instances/") && p.ends_with("/action") =>
            {
                (StatusCode::ACCEPTED, r#"{"id": "a1b2"}"#.to_string())
            }
            (Method::POST, "/osm/vnfpkgm/v1/vnf_packages_content")
            | (Method::POST, "/osm/nsd/v1/ns_descriptors_content") => {
                self.create_package(request)
            }
            (Method::PUT, p) => self.update_package(p),
            _ => (StatusCode::NOT_FOUND, String::new()),
        }
    }

    fn issue_token(&self, request: &Request) -> (StatusCode, String) {
        let creds: Value = serde_json::from_slice(request.body()).unwrap_or(Value::Null);
        if creds["username"] == "admin" && creds["password"] == "admin" {
            (StatusCode::OK, self.token_payload.clone())
        } else {
            (StatusCode::UNAUTHORIZED, String::new())
        }
    }

    fn create_package(&self, request: &Request) -> (StatusCode, String) {
        let name = request
            .header("content-filename")
            .and_then(|f| f.strip_suffix(".tar.gz"))
            .unwrap_or_default();
        if self.existing_packages.iter().any(|p| p == name) {
            (StatusCode::CONFLICT, String::new())
        } else {
            (StatusCode::CREATED, format!(r#"{{"id": "{name}"}}"#))
        }
    }

    fn update_package(&self, path: &str) -> (StatusCode, String) {
        let id = ["/osm/vnfpkgm/v1/vnf_packages_content/", "/osm/nsd/v1/ns_descriptors_content/"]
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix));
        match id {
            Some(id) if self.existing_packages.iter().any(|p| p == id) => {
                (StatusCode::OK, String::new())
            }
            _ => (StatusCode::NOT_FOUND, String::new()),
        }
    }
}

impl Transport for MockNbi {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        let path = request
            .url()
            .map(|url| url.path().to_string())
            .unwrap_or_default();
        let (status, body) = self.route(&request, &path);

        self.exchanges.lock().push(RecordedExchange {
            method: request.method().clone(),
            path,
            headers: request.headers().clone(),
            body: request.replay_body(),
            status,
        });
        Ok(Response::with_body(status, body))
    }
}

pub fn connection() -> Connection {
    Connection::new(HostAndPort::parse("localhost:8008").unwrap(), false)
}

pub fn credentials() -> UserCredentials {
    UserCredentials::new("admin", "admin", "admin")
}
