// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashMap;

/// Name to value map filled from the NBI on first use and then kept for the
/// rest of the session. Never refreshed.
///
/// Not synchronized: a session runs one sequential reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCache<V> {
    Unpopulated,
    Populated(HashMap<String, V>),
}

impl<V> Default for LookupCache<V> {
    fn default() -> Self {
        LookupCache::Unpopulated
    }
}

impl<V> LookupCache<V> {
    pub fn is_populated(&self) -> bool {
        matches!(self, LookupCache::Populated(_))
    }

    /// Return the map, calling `populate` to build it if this is the first
    /// access. A failed population leaves the cache unpopulated.
    pub fn get_or_populate<E, F>(&mut self, mut populate: F) -> Result<&HashMap<String, V>, E>
    where
        F: FnMut() -> Result<HashMap<String, V>, E>,
    {
        loop {
            match self {
                LookupCache::Populated(entries) => return Ok(entries),
                LookupCache::Unpopulated => *self = LookupCache::Populated(populate()?),
            }
        }
    }
}
