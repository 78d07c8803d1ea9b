// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod config;
pub mod connection;
pub mod credentials;
pub mod ns_instance;
pub mod package;
pub mod token;

pub use config::{ConfigError, OsmConnectionConfig};
pub use connection::{AddressError, Connection, HostAndPort};
pub use credentials::UserCredentials;
pub use ns_instance::NsInstanceContent;
pub use package::{ChecksumManifest, Package, PackageKind, CHECKSUM_FILE_NAME};
pub use token::Token;
