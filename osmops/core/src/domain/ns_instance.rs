// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! NS Instance Payloads
//!
//! The declarative KDU instance data the reconcile loop hands over, the
//! slices of NBI collection responses the lookup caches need, and the
//! request bodies sent to the NS instance endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Desired state of a KDU running inside an NS instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsInstanceContent {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nsd_name: String,
    pub vnf_name: String,
    pub vim_account_name: String,
    pub kdu_name: String,
    /// Opaque KDU parameters, forwarded to OSM as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdu_params: Option<Value>,
}

/// NS descriptor fields used for name lookups. OSM keeps the descriptor
/// name in the `id` field.
///
/// The lookup views tolerate missing fields, which read as empty strings,
/// so one incomplete item doesn't spoil the whole collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NsDescriptorView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "id")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VimAccountView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NsInstanceView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KduParams<'a> {
    pub kdu_name: &'a str,
    #[serde(rename = "additionalParams")]
    pub additional_params: &'a Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct VnfParams<'a> {
    #[serde(rename = "member-vnf-index")]
    pub member_vnf_index: &'a str,
    #[serde(rename = "additionalParamsForKdu")]
    pub additional_params_for_kdu: Vec<KduParams<'a>>,
}

/// Body of `POST ns_instances_content`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NsInstanceCreateRequest<'a> {
    pub nsd_id: &'a str,
    pub ns_name: &'a str,
    pub ns_description: &'a str,
    pub vim_account_id: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_params_for_vnf: Vec<VnfParams<'a>>,
}

impl<'a> NsInstanceCreateRequest<'a> {
    pub fn new(content: &'a NsInstanceContent, nsd_id: &'a str, vim_account_id: &'a str) -> Self {
        let additional_params_for_vnf = content
            .kdu_params
            .as_ref()
            .map(|params| {
                vec![VnfParams {
                    member_vnf_index: &content.vnf_name,
                    additional_params_for_kdu: vec![KduParams {
                        kdu_name: &content.kdu_name,
                        additional_params: params,
                    }],
                }]
            })
            .unwrap_or_default();

        Self {
            nsd_id,
            ns_name: &content.name,
            ns_description: &content.description,
            vim_account_id,
            additional_params_for_vnf,
        }
    }
}

/// Body of `POST ns_instances/{id}/action` for a KDU upgrade.
#[derive(Debug, Clone, Serialize)]
pub struct NsInstanceActionRequest<'a> {
    pub member_vnf_index: &'a str,
    pub kdu_name: &'a str,
    pub primitive: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitive_params: Option<&'a Value>,
}

impl<'a> NsInstanceActionRequest<'a> {
    pub fn upgrade(content: &'a NsInstanceContent) -> Self {
        Self {
            member_vnf_index: &content.vnf_name,
            kdu_name: &content.kdu_name,
            primitive: "upgrade",
            primitive_params: content.kdu_params.as_ref(),
        }
    }
}
