// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Error taxonomy for NBI client operations.
//!
//! Transport, status and decode failures arrive wrapped in [`HttpError`];
//! lookup misses and ambiguous names are domain errors a caller may choose to
//! skip; unsupported package names are rejected before any network call.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::config::ConfigError;
use crate::infrastructure::archive::ArchiveError;
use crate::infrastructure::http::HttpError;

/// Kind of orchestrator entity resolved by the session lookup caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    NsDescriptor,
    VimAccount,
    NsInstance,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::NsDescriptor => "NS descriptor",
            EntityKind::VimAccount => "VIM account",
            EntityKind::NsInstance => "NS instance",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum NbiError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("no {kind} found for name: {name}")]
    NotFound { kind: EntityKind, name: String },

    #[error("NS instance name not bound to a single ID: {name} -> {ids:?}")]
    Ambiguous { name: String, ids: Vec<String> },

    #[error("unsupported package type: {}", .0.display())]
    UnsupportedPackageType(PathBuf),

    #[error("package archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl NbiError {
    /// True for name lookup misses and ambiguous names, as opposed to
    /// transport, protocol or local failures.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, NbiError::NotFound { .. } | NbiError::Ambiguous { .. })
    }
}
