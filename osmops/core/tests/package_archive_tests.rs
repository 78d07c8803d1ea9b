// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Package archives: layout, checksum manifest and round trip through
//! extraction.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};
use osmops_core::application::package_builder::pack;
use osmops_core::infrastructure::archive::{extract, extract_tarball, for_each_entry};
use osmops_core::CHECKSUM_FILE_NAME;
use tempfile::TempDir;
use walkdir::WalkDir;

fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Source tree with nested directories, an empty directory and an empty file.
fn source_tree(root: &Path) -> std::path::PathBuf {
    let source = root.join("openldap_knf");
    fs::create_dir_all(source.join("charts/openldap/templates")).unwrap();
    fs::create_dir_all(source.join("empty")).unwrap();
    fs::write(source.join("openldap_vnfd.yaml"), "vnfd:\n  id: openldap_knf\n").unwrap();
    fs::write(source.join("charts/openldap/Chart.yaml"), "name: openldap\n").unwrap();
    fs::write(
        source.join("charts/openldap/templates/deployment.yaml"),
        "kind: Deployment\n",
    )
    .unwrap();
    fs::write(source.join("README"), "").unwrap();
    source
}

fn archive_entries(data: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut entries = BTreeMap::new();
    for_each_entry(data, |path, content| {
        let mut buf = Vec::new();
        content.read_to_end(&mut buf)?;
        entries.insert(path.to_string(), buf);
        Ok(())
    })
    .unwrap();
    entries
}

/// Relative path to content of every file under `dir`.
fn tree_files(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_entries_live_under_base_dir() {
    let root = TempDir::new().unwrap();
    let package = pack(&source_tree(root.path())).unwrap();

    let paths: Vec<String> = archive_entries(package.data()).into_keys().collect();

    assert_eq!(
        paths,
        vec![
            "openldap_knf/README",
            "openldap_knf/charts/openldap/Chart.yaml",
            "openldap_knf/charts/openldap/templates/deployment.yaml",
            "openldap_knf/checksums.txt",
            "openldap_knf/openldap_vnfd.yaml",
        ]
    );
}

#[test]
fn test_manifest_is_the_last_entry() {
    let root = TempDir::new().unwrap();
    let package = pack(&source_tree(root.path())).unwrap();

    let mut last = None;
    for_each_entry(package.reader(), |path, _| {
        last = Some(path.to_string());
        Ok(())
    })
    .unwrap();

    assert_eq!(last.as_deref(), Some("openldap_knf/checksums.txt"));
}

#[test]
fn test_manifest_lists_file_hashes_sorted_by_path() {
    let root = TempDir::new().unwrap();
    let package = pack(&source_tree(root.path())).unwrap();

    let entries = archive_entries(package.data());
    let manifest = String::from_utf8(entries["openldap_knf/checksums.txt"].clone()).unwrap();

    let expected = [
        ("README", ""),
        ("charts/openldap/Chart.yaml", "name: openldap\n"),
        ("charts/openldap/templates/deployment.yaml", "kind: Deployment\n"),
        ("openldap_vnfd.yaml", "vnfd:\n  id: openldap_knf\n"),
    ]
    .iter()
    .map(|(path, content)| format!("{}\topenldap_knf/{path}\n", md5_hex(content.as_bytes())))
    .collect::<String>();
    assert_eq!(manifest, expected);
}

#[test]
fn test_manifest_hash_matches_file_content() {
    let root = TempDir::new().unwrap();
    let package = pack(&source_tree(root.path())).unwrap();

    let entries = archive_entries(package.data());
    for path in package.manifest().sorted_paths() {
        let content = &entries[&format!("openldap_knf/{path}")];
        assert_eq!(package.manifest().file_hash(path), Some(md5_hex(content).as_str()));
    }
    assert_eq!(package.manifest().len(), 4);
}

#[test]
fn test_manifest_is_deterministic() {
    let root = TempDir::new().unwrap();
    let source = source_tree(root.path());

    let first = pack(&source).unwrap();
    let second = pack(&source).unwrap();

    let first_manifest = archive_entries(first.data())["openldap_knf/checksums.txt"].clone();
    let second_manifest = archive_entries(second.data())["openldap_knf/checksums.txt"].clone();
    assert_eq!(first_manifest, second_manifest);
    assert_eq!(first.manifest(), second.manifest());
}

#[test]
fn test_package_hash_is_archive_md5() {
    let root = TempDir::new().unwrap();
    let package = pack(&source_tree(root.path())).unwrap();

    assert_eq!(package.hash(), md5_hex(package.data()));
    assert_eq!(package.archive_file_name(), "openldap_knf.tar.gz");
}

#[test]
fn test_extraction_round_trip() -> anyhow::Result<()> {
    let root = TempDir::new()?;
    let source = source_tree(root.path());
    let package = pack(&source)?;
    let dest = TempDir::new()?;

    extract(package.reader(), dest.path())?;

    let mut extracted = tree_files(&dest.path().join("openldap_knf"));
    let manifest = extracted.remove(CHECKSUM_FILE_NAME);
    assert!(manifest.is_some());
    assert_eq!(extracted, tree_files(&source));
    Ok(())
}

#[test]
fn test_extract_tarball_written_to_disk() -> anyhow::Result<()> {
    let root = TempDir::new()?;
    let package = pack(&source_tree(root.path()))?;
    let tarball = root.path().join(package.archive_file_name());
    fs::write(&tarball, package.data())?;
    let dest = root.path().join("unpacked");

    extract_tarball(&tarball, &dest)?;

    assert_eq!(
        fs::read_to_string(dest.join("openldap_knf/charts/openldap/Chart.yaml"))?,
        "name: openldap\n"
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinks_abort_the_build() {
    let root = TempDir::new().unwrap();
    let source = source_tree(root.path());
    std::os::unix::fs::symlink(source.join("README"), source.join("link")).unwrap();

    let err = pack(&source).unwrap_err();
    assert!(matches!(
        err,
        osmops_core::infrastructure::archive::ArchiveError::UnsupportedEntry(_)
    ));
}
