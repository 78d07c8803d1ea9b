// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! OSM Packages
//!
//! A package is a directory of descriptor files archived as a gzipped tar
//! stream. OSM Ops relies on two naming conventions to keep things simple:
//!
//! - the package name is the base name of the source directory and doubles
//!   as the package ID on the OSM side;
//! - a name ending in `_knf` denotes a VNF package, one ending in `_ns` an
//!   NS package.
//!
//! Neither needs to hold for OSM in general.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use bytes::Bytes;

/// Name of the manifest entry appended to every package archive.
pub const CHECKSUM_FILE_NAME: &str = "checksums.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Vnf,
    Ns,
}

impl PackageKind {
    /// Infer the package kind from its name, `None` if the name follows
    /// neither convention.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with("_knf") {
            Some(PackageKind::Vnf)
        } else if name.ends_with("_ns") {
            Some(PackageKind::Ns)
        } else {
            None
        }
    }
}

/// Map from archive-relative file path to the MD5 of the file content.
///
/// Iteration is always path-sorted so the rendered manifest is the same
/// for any two builds of the same tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    hashes: BTreeMap<String, String>,
}

impl ChecksumManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, relative_path: impl Into<String>, md5_hex: impl Into<String>) {
        self.hashes.insert(relative_path.into(), md5_hex.into());
    }

    pub fn file_hash(&self, relative_path: &str) -> Option<&str> {
        self.hashes.get(relative_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn sorted_paths(&self) -> impl Iterator<Item = &str> {
        self.hashes.keys().map(String::as_str)
    }

    /// Render the manifest file content: one `<md5>\t<base>/<path>` line per
    /// recorded file.
    pub fn render(&self, archive_base_name: &str) -> String {
        let mut content = String::new();
        for (path, hash) in &self.hashes {
            let _ = writeln!(content, "{hash}\t{}", join_archive_path(archive_base_name, path));
        }
        content
    }
}

/// Join an archive base directory name and a relative path with `/`.
pub fn join_archive_path(base: &str, relative_path: &str) -> String {
    let relative_path = relative_path.trim_start_matches('/');
    match (base.is_empty(), relative_path.is_empty()) {
        (true, _) => relative_path.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{relative_path}"),
    }
}

/// A packed source directory ready to upload.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    source: PathBuf,
    data: Bytes,
    hash: String,
    manifest: ChecksumManifest,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        data: Bytes,
        hash: impl Into<String>,
        manifest: ChecksumManifest,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            data,
            hash: hash.into(),
            manifest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package ID on the OSM side, which by convention is the name.
    pub fn id(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<PackageKind> {
        PackageKind::from_name(&self.name)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The gzipped tar stream.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.data.clone())
    }

    /// Hex MD5 of the whole archive.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn manifest(&self) -> &ChecksumManifest {
        &self.manifest
    }

    /// Value of the `Content-Filename` upload header.
    pub fn archive_file_name(&self) -> String {
        format!("{}.tar.gz", self.name)
    }
}
