// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Package Create-or-Update
//!
//! OSM package create isn't idempotent: posting a package that already
//! exists yields a 409. Uploads therefore POST to the collection endpoint
//! first and, on conflict, PUT the same archive to the package's by-ID
//! endpoint.
//!
//! OSM Ops relies on naming conventions here. The package ID is the package
//! name, a name ending in `_knf` is a VNF package and one ending in `_ns` is
//! an NS package. OSM itself requires none of this.

use std::path::Path;

use reqwest::StatusCode;
use tracing::info;
use url::Url;

use super::package_builder::pack;
use super::session::Session;
use crate::domain::package::{Package, PackageKind};
use crate::error::NbiError;
use crate::infrastructure::archive::ArchiveError;
use crate::infrastructure::http::{
    accept, at, body, content, expect_status_code_one_of, expect_success, header, post, put,
    request, MediaType, RequestBuilder,
};

/// Which branch of the upload protocol ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageUpload {
    /// The create call succeeded.
    Created,
    /// The package existed already and got replaced.
    Updated,
}

impl Session {
    /// Pack the directory at `source` and upload it to OSM, creating the
    /// package or updating it if it exists already.
    ///
    /// Directories not following the `_knf`/`_ns` naming convention are
    /// rejected before anything is packed or sent.
    pub fn create_or_update_package(&mut self, source: &Path) -> Result<PackageUpload, NbiError> {
        let source = std::path::absolute(source).map_err(ArchiveError::from)?;
        let is_supported = source
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(PackageKind::from_name)
            .is_some();
        if !is_supported {
            return Err(NbiError::UnsupportedPackageType(source));
        }

        let package = pack(&source)?;
        self.upload_package(&package)
    }

    /// Upload an already packed package. See [`Session::create_or_update_package`].
    pub fn upload_package(&mut self, package: &Package) -> Result<PackageUpload, NbiError> {
        let kind = package
            .kind()
            .ok_or_else(|| NbiError::UnsupportedPackageType(package.source().to_path_buf()))?;
        let connection = self.connection();
        let (create_url, update_url) = match kind {
            PackageKind::Vnf => (
                connection.vnf_packages_content(),
                connection.vnf_package_content(package.id()),
            ),
            PackageKind::Ns => (
                connection.ns_packages_content(),
                connection.ns_package_content(package.id()),
            ),
        };

        let exchange = request(upload_request(post(), &create_url, package))
            .handle_with(expect_status_code_one_of(&[201, 409]));
        let reply = self.client.send(exchange)?;
        if reply.status != StatusCode::CONFLICT {
            info!(package = %package.name(), kind = ?kind, "Created OSM package");
            return Ok(PackageUpload::Created);
        }

        info!(
            package = %package.name(),
            kind = ?kind,
            "OSM package exists already, updating it"
        );
        let exchange = request(upload_request(put(), &update_url, package))
            .handle_with(expect_success());
        self.client.send(exchange)?;
        Ok(PackageUpload::Updated)
    }
}

/// Headers as the OSM client sends them.
fn upload_request<'a>(
    method: RequestBuilder<'a>,
    url: &'a Url,
    package: &Package,
) -> Vec<RequestBuilder<'a>> {
    vec![
        method,
        at(url),
        accept(&[MediaType::Json]),
        content(MediaType::Gzip),
        header("content-filename", package.archive_file_name()),
        header("content-file-md5", package.hash()),
        body(package.data().clone()),
    ]
}
