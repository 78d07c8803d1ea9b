// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! NBI Session
//!
//! One connection to OSM for the duration of a reconciliation pass: bearer
//! authentication through the [`AuthorizationManager`] and name to ID
//! lookups backed by per-session caches.
//!
//! # Architecture
//!
//! - **Layer:** Application
//! - **Purpose:** Each lookup cache is filled by one GET of the whole
//!   collection the first time a name of that kind is looked up. OSM doesn't
//!   enforce unique NS instance names, so instance names map to a list of IDs
//!   and a name bound to more than one ID is reported as ambiguous.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::authz::AuthorizationManager;
use super::lookup_cache::LookupCache;
use crate::domain::config::{OsmConnectionConfig, DEFAULT_REQUEST_TIMEOUT};
use crate::domain::connection::Connection;
use crate::domain::credentials::UserCredentials;
use crate::domain::ns_instance::{NsDescriptorView, NsInstanceView, VimAccountView};
use crate::domain::token::Token;
use crate::error::{EntityKind, NbiError};
use crate::infrastructure::http::{
    accept, at, bearer_token, content, expect_success, get, json_body, post,
    read_json_response, request, Exchange, HttpError, MediaType, Reply, ReqwestTransport,
    RequestBuilder, Transport,
};

/// Authenticated access to the NBI, shared by the session use cases.
pub(crate) struct NbiClient {
    connection: Connection,
    authz: AuthorizationManager,
    transport: Arc<dyn Transport>,
}

impl NbiClient {
    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Run the exchange with a bearer token acquired just before sending.
    pub(crate) fn send<'a>(&'a mut self, exchange: Exchange<'a>) -> Result<Reply, HttpError> {
        let transport = self.transport.as_ref();
        exchange
            .with_builder(nbi_access_token(&mut self.authz))
            .run_with(transport)
    }

    pub(crate) fn get_json<T>(&mut self, url: &Url) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Default,
    {
        let mut data = T::default();
        let exchange = request(vec![get(), at(url), accept(&[MediaType::Json])])
            .handle_with(expect_success())
            .handle_with(read_json_response(&mut data));
        self.send(exchange)?;
        Ok(data)
    }

    /// POST a JSON body with a YAML content type, as the OSM client does.
    pub(crate) fn post_json<T>(&mut self, url: &Url, data: &T) -> Result<Reply, HttpError>
    where
        T: Serialize + ?Sized,
    {
        let exchange = request(vec![
            post(),
            at(url),
            accept(&[MediaType::Json]),
            content(MediaType::Yaml),
            json_body(data),
        ])
        .handle_with(expect_success());
        self.send(exchange)
    }
}

fn nbi_access_token(authz: &mut AuthorizationManager) -> RequestBuilder<'_> {
    bearer_token(move || authz.access_token().map(|token| token.id().to_string()))
}

pub struct Session {
    pub(super) client: NbiClient,
    ns_descriptors: LookupCache<String>,
    vim_accounts: LookupCache<String>,
    ns_instances: LookupCache<Vec<String>>,
}

impl Session {
    /// Session over a reqwest transport with the default request timeout.
    pub fn new(connection: Connection, credentials: UserCredentials) -> Result<Self, NbiError> {
        let transport = ReqwestTransport::new(DEFAULT_REQUEST_TIMEOUT)?;
        Ok(Self::with_transport(connection, credentials, Arc::new(transport)))
    }

    pub fn with_transport(
        connection: Connection,
        credentials: UserCredentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let authz = AuthorizationManager::new(connection.clone(), credentials, transport.clone());
        Self {
            client: NbiClient {
                connection,
                authz,
                transport,
            },
            ns_descriptors: LookupCache::default(),
            vim_accounts: LookupCache::default(),
            ns_instances: LookupCache::default(),
        }
    }

    pub fn from_config(config: &OsmConnectionConfig) -> Result<Self, NbiError> {
        let connection = config.connection()?;
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(
            connection,
            config.credentials(),
            Arc::new(transport),
        ))
    }

    pub fn connection(&self) -> &Connection {
        self.client.connection()
    }

    /// Current NBI bearer token, renewed if expired.
    pub fn access_token(&mut self) -> Result<Token, NbiError> {
        Ok(self.client.authz.access_token()?)
    }

    pub fn lookup_ns_descriptor_id(&mut self, name: &str) -> Result<String, NbiError> {
        let client = &mut self.client;
        let descriptors = self.ns_descriptors.get_or_populate(|| {
            let url = client.connection().ns_descriptors();
            let views: Vec<NsDescriptorView> = client.get_json(&url)?;
            debug!(count = views.len(), "Populated NS descriptor lookup cache");
            Ok::<_, HttpError>(views.into_iter().map(|v| (v.name, v.id)).collect())
        })?;

        descriptors.get(name).cloned().ok_or_else(|| NbiError::NotFound {
            kind: EntityKind::NsDescriptor,
            name: name.to_string(),
        })
    }

    pub fn lookup_vim_account_id(&mut self, name: &str) -> Result<String, NbiError> {
        let client = &mut self.client;
        let accounts = self.vim_accounts.get_or_populate(|| {
            let url = client.connection().vim_accounts();
            let views: Vec<VimAccountView> = client.get_json(&url)?;
            debug!(count = views.len(), "Populated VIM account lookup cache");
            Ok::<_, HttpError>(views.into_iter().map(|v| (v.name, v.id)).collect())
        })?;

        accounts.get(name).cloned().ok_or_else(|| NbiError::NotFound {
            kind: EntityKind::VimAccount,
            name: name.to_string(),
        })
    }

    /// Resolve an NS instance name to the ID of the one instance with that
    /// name. Fails if there's no such instance or more than one.
    pub fn lookup_ns_instance_id(&mut self, name: &str) -> Result<String, NbiError> {
        let client = &mut self.client;
        let instances = self.ns_instances.get_or_populate(|| {
            let url = client.connection().ns_instances_content();
            let views: Vec<NsInstanceView> = client.get_json(&url)?;
            debug!(count = views.len(), "Populated NS instance lookup cache");
            Ok::<_, HttpError>(group_ids_by_name(views))
        })?;

        match instances.get(name).map(Vec::as_slice) {
            None | Some([]) => Err(NbiError::NotFound {
                kind: EntityKind::NsInstance,
                name: name.to_string(),
            }),
            Some([id]) => Ok(id.clone()),
            Some(ids) => Err(NbiError::Ambiguous {
                name: name.to_string(),
                ids: ids.to_vec(),
            }),
        }
    }
}

fn group_ids_by_name(views: Vec<NsInstanceView>) -> HashMap<String, Vec<String>> {
    let mut ids_by_name: HashMap<String, Vec<String>> = HashMap::new();
    for view in views {
        ids_by_name.entry(view.name).or_default().push(view.id);
    }
    ids_by_name
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connection", &self.client.connection)
            .field("authz", &self.client.authz)
            .field("ns_descriptors", &self.ns_descriptors)
            .field("vim_accounts", &self.vim_accounts)
            .field("ns_instances", &self.ns_instances)
            .finish_non_exhaustive()
    }
}
