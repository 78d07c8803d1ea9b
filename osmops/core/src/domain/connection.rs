// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! NBI Connection
//!
//! Network address of the OSM north-bound interface and the fully-qualified
//! endpoint URLs the client talks to.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Validate `host:port` addresses once, then assemble endpoint
//!   URLs from compile-time path constants without any fallible step.

use std::fmt;
use std::net::IpAddr;
use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use thiserror::Error;
use url::Url;

pub const TOKENS_PATH: &str = "/osm/admin/v1/tokens";
pub const NS_DESCRIPTORS_PATH: &str = "/osm/nsd/v1/ns_descriptors";
pub const VIM_ACCOUNTS_PATH: &str = "/osm/admin/v1/vim_accounts";
pub const NS_INSTANCES_CONTENT_PATH: &str = "/osm/nslcm/v1/ns_instances_content";
pub const NS_INSTANCES_PATH: &str = "/osm/nslcm/v1/ns_instances";
pub const VNF_PACKAGES_CONTENT_PATH: &str = "/osm/vnfpkgm/v1/vnf_packages_content";
pub const NS_PACKAGES_CONTENT_PATH: &str = "/osm/nsd/v1/ns_descriptors_content";

// Characters escaped when an ID becomes a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static HOSTNAME_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([a-zA-Z0-9_-]){1,63}\.)*([a-zA-Z0-9_-]){1,63}$")
        .expect("hostname pattern is a valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing port in address: {0}")]
    MissingPort(String),

    #[error("invalid hostname: {0}")]
    InvalidHostname(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),
}

/// A validated `host:port` pair.
///
/// IPv6 hosts must be enclosed in square brackets, e.g. `[::1]:80`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAndPort {
    host: String,
    port: u16,
    http_base: Url,
    https_base: Url,
}

impl HostAndPort {
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let address = address.trim();
        let (host, port) = split_host_port(address)?;
        validate_hostname(host)?;
        let port = parse_port(port)?;

        let authority = format_authority(host, port);
        let http_base = Url::parse(&format!("http://{authority}/"))
            .map_err(|_| AddressError::InvalidHostname(host.to_string()))?;
        let https_base = Url::parse(&format!("https://{authority}/"))
            .map_err(|_| AddressError::InvalidHostname(host.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            port,
            http_base,
            https_base,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn base_url(&self, secure: bool) -> &Url {
        if secure {
            &self.https_base
        } else {
            &self.http_base
        }
    }
}

impl fmt::Display for HostAndPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_authority(&self.host, self.port))
    }
}

fn format_authority(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

fn split_host_port(address: &str) -> Result<(&str, &str), AddressError> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| AddressError::InvalidHostname(address.to_string()))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| AddressError::MissingPort(address.to_string()))?;
        return Ok((host, port));
    }

    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| AddressError::MissingPort(address.to_string()))?;
    if host.contains(':') {
        // unbracketed IPv6 literal, e.g. "::1:80"
        return Err(AddressError::InvalidHostname(address.to_string()));
    }
    Ok((host, port))
}

fn validate_hostname(host: &str) -> Result<(), AddressError> {
    let well_formed = host.parse::<IpAddr>().is_ok() || HOSTNAME_RX.is_match(host);
    if !host.is_empty() && host.len() < 254 && well_formed {
        return Ok(());
    }
    Err(AddressError::InvalidHostname(host.to_string()))
}

fn parse_port(port: &str) -> Result<u16, AddressError> {
    port.trim()
        .parse::<u16>()
        .map_err(|_| AddressError::InvalidPort(port.to_string()))
}

/// Where the NBI lives and whether to reach it over TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    address: HostAndPort,
    secure: bool,
}

impl Connection {
    pub fn new(address: HostAndPort, secure: bool) -> Self {
        Self { address, secure }
    }

    pub fn address(&self) -> &HostAndPort {
        &self.address
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.address.base_url(self.secure).clone();
        url.set_path(path);
        url
    }

    fn entity_endpoint(&self, collection: &str, id: &str) -> Url {
        let segment = utf8_percent_encode(id, PATH_SEGMENT);
        self.endpoint(&format!("{collection}/{segment}"))
    }

    /// Token issuance endpoint.
    pub fn tokens(&self) -> Url {
        self.endpoint(TOKENS_PATH)
    }

    pub fn ns_descriptors(&self) -> Url {
        self.endpoint(NS_DESCRIPTORS_PATH)
    }

    pub fn vim_accounts(&self) -> Url {
        self.endpoint(VIM_ACCOUNTS_PATH)
    }

    pub fn ns_instances_content(&self) -> Url {
        self.endpoint(NS_INSTANCES_CONTENT_PATH)
    }

    /// Action endpoint of the NS instance with the given ID.
    pub fn ns_instance_action(&self, ns_instance_id: &str) -> Url {
        let segment = utf8_percent_encode(ns_instance_id, PATH_SEGMENT);
        self.endpoint(&format!("{NS_INSTANCES_PATH}/{segment}/action"))
    }

    /// VNF package collection; POST here creates a package.
    pub fn vnf_packages_content(&self) -> Url {
        self.endpoint(VNF_PACKAGES_CONTENT_PATH)
    }

    /// VNF package by ID; PUT here replaces its content.
    pub fn vnf_package_content(&self, package_id: &str) -> Url {
        self.entity_endpoint(VNF_PACKAGES_CONTENT_PATH, package_id)
    }

    /// NS package collection; POST here creates a package.
    pub fn ns_packages_content(&self) -> Url {
        self.endpoint(NS_PACKAGES_CONTENT_PATH)
    }

    /// NS package by ID; PUT here replaces its content.
    pub fn ns_package_content(&self, package_id: &str) -> Url {
        self.entity_endpoint(NS_PACKAGES_CONTENT_PATH, package_id)
    }
}
