// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tarball Archives
//!
//! Gzip-compressed PAX tar streams: writing directory trees into them under
//! a base directory name, iterating their entries and extracting them back
//! onto the file system.

mod reader;
mod writer;

pub use reader::{extract, extract_tarball, for_each_entry};
pub use writer::{TarballWriter, Visit};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("neither a regular file nor a directory: {}", .0.display())]
    UnsupportedEntry(PathBuf),
}
