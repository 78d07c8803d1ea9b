// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application Layer
//!
//! Use cases OSM Ops runs against the NBI during a reconciliation pass.

pub mod authz;
pub mod lookup_cache;
pub mod ns_instances;
pub mod package_builder;
pub mod packages;
pub mod session;
