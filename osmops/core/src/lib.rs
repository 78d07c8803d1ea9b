// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! OSM Ops Core
//!
//! Client side of the OSM north-bound interface (NBI) used by OSM Ops to
//! reconcile declared deployment artifacts with a running OSM instance.
//!
//! # Architecture
//!
//! - **Domain:** connection, credentials, tokens, packages, NS payloads
//! - **Infrastructure:** HTTP request/response builder, transport, tgz archives
//! - **Application:** authorization manager, session lookups, upload protocol
//!
//! A [`Session`] drives one sequential reconciliation pass and is not meant
//! to be shared across threads.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::authz::AuthorizationManager;
pub use application::ns_instances::NsInstanceUpdate;
pub use application::packages::PackageUpload;
pub use application::session::Session;
pub use domain::*;
pub use error::{EntityKind, NbiError};
