// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Package Builder
//!
//! Packs an OSM package source directory into a gzipped tar stream ready to
//! upload. Archive entries live under a directory named after the source
//! directory, and the archive ends with a `checksums.txt` manifest holding
//! the MD5 of every file, sorted by path.

use std::path::Path;

use bytes::Bytes;
use flate2::Compression;
use md5::{Digest, Md5};
use tracing::debug;

use crate::domain::package::{ChecksumManifest, Package, CHECKSUM_FILE_NAME};
use crate::infrastructure::archive::{ArchiveError, TarballWriter, Visit};

/// Pack the directory at `source` into a [`Package`].
///
/// The first I/O error aborts the build and no package is returned.
pub fn pack(source: &Path) -> Result<Package, ArchiveError> {
    let source = std::path::absolute(source)?;
    if !source.is_dir() {
        return Err(ArchiveError::NotADirectory(source));
    }
    let name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ArchiveError::InvalidPath(source.clone()))?
        .to_string();

    let mut manifest = ChecksumManifest::new();
    let mut writer = TarballWriter::new(name.as_str(), Vec::new(), Compression::best());
    writer.add_tree(&source, |relative_path, visit| {
        if let Visit::File { content } = visit {
            manifest.record(relative_path, md5_hex(content));
        }
        Ok(())
    })?;
    writer.add_entry(CHECKSUM_FILE_NAME, manifest.render(&name).as_bytes())?;
    let data = writer.finish()?;

    let hash = md5_hex(&data);
    debug!(
        package = %name,
        files = manifest.len(),
        size = data.len(),
        md5 = %hash,
        "Packed OSM package"
    );
    Ok(Package::new(name, source, Bytes::from(data), hash, manifest))
}

pub(crate) fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}
