// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

use super::ArchiveError;

/// Call `f` with the path and content of every regular file in a gzipped
/// tar stream, in archive order. The first error returned by `f` stops the
/// iteration.
pub fn for_each_entry<R, F>(reader: R, mut f: F) -> Result<(), ArchiveError>
where
    R: Read,
    F: FnMut(&str, &mut dyn Read) -> Result<(), ArchiveError>,
{
    let mut archive = Archive::new(GzDecoder::new(reader));
    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }
        let path = entry.path()?.to_string_lossy().into_owned();
        f(&path, &mut entry)?;
    }
    Ok(())
}

/// Extract the tarball at `tarball_path` into `dest_dir`.
/// See [`extract`].
pub fn extract_tarball(tarball_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    let file = File::open(tarball_path)?;
    extract(BufReader::new(file), dest_dir)
}

/// Recreate the files of a gzipped tar stream under `dest_dir`, creating
/// intermediate directories as needed.
///
/// An empty `dest_dir` keeps archive paths exactly as stored, absolute ones
/// included. Otherwise every archive path is taken relative to `dest_dir`
/// and paths that would climb out of it are rejected.
pub fn extract<R: Read>(reader: R, dest_dir: &Path) -> Result<(), ArchiveError> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let archive_path = entry.path()?.into_owned();
        let target = target_path(dest_dir, &archive_path)?;

        match entry.header().entry_type() {
            EntryType::Directory => fs::create_dir_all(&target)?,
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                let mut file = File::create(&target)?;
                io::copy(&mut entry, &mut file)?;
                set_mode(&target, entry.header().mode()?)?;
            }
            other => {
                tracing::warn!(
                    path = %archive_path.display(),
                    entry_type = ?other,
                    "Skipping archive entry that is neither a file nor a directory"
                );
            }
        }
    }
    Ok(())
}

fn target_path(dest_dir: &Path, archive_path: &Path) -> Result<PathBuf, ArchiveError> {
    if dest_dir.as_os_str().is_empty() {
        return Ok(archive_path.to_path_buf());
    }

    let mut relative = PathBuf::new();
    for component in archive_path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => {
                tracing::warn!(
                    path = %archive_path.display(),
                    "Archive path traversal attempt detected: contains '..' component"
                );
                return Err(ArchiveError::InvalidPath(archive_path.to_path_buf()));
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(ArchiveError::InvalidPath(archive_path.to_path_buf()));
    }
    Ok(dest_dir.join(relative))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
