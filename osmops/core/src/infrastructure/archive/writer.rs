// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fs::{self, Metadata};
use std::io::Write;
use std::path::{Component, Path};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header, HeaderMode};
use walkdir::WalkDir;

use super::ArchiveError;
use crate::domain::package::join_archive_path;

/// What the tree walk found at a path, as seen by a [`TarballWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// Regular file, archived with this content.
    File { content: Vec<u8> },
    /// Directory, only traversed.
    Directory,
}

/// Writes files into a gzipped PAX tar stream.
///
/// Archive paths are prefixed with the base directory name, so with a base
/// of `my-root` the file `d1/f1` lands at `my-root/d1/f1`. An empty base
/// keeps paths as given.
pub struct TarballWriter<W: Write> {
    base_dir_name: String,
    tar: Builder<GzEncoder<W>>,
}

impl<W: Write> TarballWriter<W> {
    pub fn new(base_dir_name: impl Into<String>, sink: W, compression: Compression) -> Self {
        Self {
            base_dir_name: base_dir_name.into(),
            tar: Builder::new(GzEncoder::new(sink, compression)),
        }
    }

    pub fn base_dir_name(&self) -> &str {
        &self.base_dir_name
    }

    /// Write `content` at the given path, relative to the base directory.
    pub fn add_entry(&mut self, archive_path: &str, content: &[u8]) -> Result<(), ArchiveError> {
        let mut header = Header::new_ustar();
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o644);
        header.set_mtime(0);
        self.append(archive_path, &mut header, content)
    }

    /// Archive a file from disk under `archive_path`, with its mode and
    /// timestamps. Returns the content written so callers can hash it
    /// without reading the file twice.
    pub fn add_file(
        &mut self,
        archive_path: &str,
        file_path: &Path,
        metadata: &Metadata,
    ) -> Result<Vec<u8>, ArchiveError> {
        if !metadata.is_file() {
            return Err(ArchiveError::UnsupportedEntry(file_path.to_path_buf()));
        }
        let content = fs::read(file_path)?;

        let mut header = Header::new_ustar();
        header.set_metadata_in_mode(metadata, HeaderMode::Complete);
        header.set_entry_type(EntryType::Regular);
        self.append(archive_path, &mut header, &content)?;

        Ok(content)
    }

    /// Walk `source_dir` in file-name order and archive every regular file.
    /// The callback sees each visited node; its first error stops the walk.
    ///
    /// Anything that is neither a regular file nor a directory, symlinks
    /// included, aborts the walk.
    pub fn add_tree<F>(&mut self, source_dir: &Path, mut on_visit: F) -> Result<(), ArchiveError>
    where
        F: FnMut(&str, &Visit) -> Result<(), ArchiveError>,
    {
        let walker = WalkDir::new(source_dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let relative_path = relative_archive_path(source_dir, entry.path())?;
            let file_type = entry.file_type();

            let visit = if file_type.is_dir() {
                Visit::Directory
            } else if file_type.is_file() {
                let metadata = entry.metadata()?;
                let content = self.add_file(&relative_path, entry.path(), &metadata)?;
                Visit::File { content }
            } else {
                tracing::warn!(
                    path = %entry.path().display(),
                    "Refusing to archive entry that is neither a file nor a directory"
                );
                return Err(ArchiveError::UnsupportedEntry(entry.path().to_path_buf()));
            };

            on_visit(&relative_path, &visit)?;
        }
        Ok(())
    }

    /// Write the tar footer, flush compression and hand back the sink.
    pub fn finish(self) -> Result<W, ArchiveError> {
        let encoder = self.tar.into_inner()?;
        Ok(encoder.finish()?)
    }

    /// Every entry gets a PAX `path` record, so the ustar name field only
    /// holds a placeholder: the path cut to fit. `Builder::append` writes the
    /// header as is, without the GNU long-name entries `append_data` would
    /// add for long paths.
    fn append(
        &mut self,
        archive_path: &str,
        header: &mut Header,
        content: &[u8],
    ) -> Result<(), ArchiveError> {
        let path = join_archive_path(&self.base_dir_name, archive_path);
        self.tar
            .append_pax_extensions([("path", path.as_bytes())])?;

        let name = ustar_name_placeholder(&path);
        let name_field = &mut header.as_old_mut().name;
        name_field.fill(0);
        name_field[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(content.len() as u64);
        header.set_cksum();

        self.tar.append(header, content)?;
        Ok(())
    }
}

/// Longest prefix of `path` that fits the 100-byte ustar name field without
/// splitting a character.
fn ustar_name_placeholder(path: &str) -> &str {
    const NAME_FIELD_LEN: usize = 100;
    if path.len() <= NAME_FIELD_LEN {
        return path;
    }
    let mut end = NAME_FIELD_LEN;
    while !path.is_char_boundary(end) {
        end -= 1;
    }
    &path[..end]
}

/// `path` relative to `root`, with `/` separators.
fn relative_archive_path(root: &Path, path: &Path) -> Result<String, ArchiveError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ArchiveError::InvalidPath(path.to_path_buf()))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| ArchiveError::InvalidPath(path.to_path_buf()))?;
                parts.push(part);
            }
            _ => return Err(ArchiveError::InvalidPath(path.to_path_buf())),
        }
    }
    Ok(parts.join("/"))
}
