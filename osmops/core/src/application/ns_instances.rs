// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! NS Instance Create-or-Upgrade
//!
//! Brings a KDU inside an NS instance to the declared state. If no instance
//! goes by the declared name, a new one is created from the named NS
//! descriptor on the named VIM account. Otherwise the KDU of the existing
//! instance is upgraded with the declared parameters.

use tracing::info;

use super::session::Session;
use crate::domain::ns_instance::{
    NsInstanceActionRequest, NsInstanceContent, NsInstanceCreateRequest,
};
use crate::error::NbiError;

/// Which branch of the NS instance workflow ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsInstanceUpdate {
    Created,
    /// Upgrade requested on the instance with this ID.
    Upgraded { ns_instance_id: String },
}

impl Session {
    /// Create the NS instance, or upgrade its KDU if an instance with that
    /// name exists already. Nothing is sent if the name is bound to more
    /// than one instance.
    pub fn create_or_update_ns_instance(
        &mut self,
        content: &NsInstanceContent,
    ) -> Result<NsInstanceUpdate, NbiError> {
        match self.lookup_ns_instance_id(&content.name) {
            Ok(ns_instance_id) => {
                self.upgrade_kdu(&ns_instance_id, content)?;
                Ok(NsInstanceUpdate::Upgraded { ns_instance_id })
            }
            Err(NbiError::NotFound { .. }) => {
                self.create_ns_instance(content)?;
                Ok(NsInstanceUpdate::Created)
            }
            Err(e) => Err(e),
        }
    }

    fn create_ns_instance(&mut self, content: &NsInstanceContent) -> Result<(), NbiError> {
        let nsd_id = self.lookup_ns_descriptor_id(&content.nsd_name)?;
        let vim_account_id = self.lookup_vim_account_id(&content.vim_account_name)?;

        let url = self.connection().ns_instances_content();
        let payload = NsInstanceCreateRequest::new(content, &nsd_id, &vim_account_id);
        self.client.post_json(&url, &payload)?;

        info!(
            ns_instance = %content.name,
            nsd = %content.nsd_name,
            vim_account = %content.vim_account_name,
            "Created NS instance"
        );
        Ok(())
    }

    fn upgrade_kdu(
        &mut self,
        ns_instance_id: &str,
        content: &NsInstanceContent,
    ) -> Result<(), NbiError> {
        let url = self.connection().ns_instance_action(ns_instance_id);
        let payload = NsInstanceActionRequest::upgrade(content);
        self.client.post_json(&url, &payload)?;

        info!(
            ns_instance = %content.name,
            ns_instance_id = %ns_instance_id,
            kdu = %content.kdu_name,
            "Requested KDU upgrade"
        );
        Ok(())
    }
}
