/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Method-tag registry and the per-socket filter table built from it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::filter::{ExactFilter, GenericFilter, PrefixFilter, SubscriptionFilter};
use crate::observability::events;
use crate::pipe::PeerId;
use crate::subscription_codec::FilterMethod;

const COMPONENT: &str = "filter_table";

/// Builds an empty engine for one method tag.
pub type FilterConstructor = fn(FilterMethod) -> Box<dyn SubscriptionFilter>;

fn prefix_filter(_: FilterMethod) -> Box<dyn SubscriptionFilter> {
    Box::new(PrefixFilter::new())
}

fn exact_filter(_: FilterMethod) -> Box<dyn SubscriptionFilter> {
    Box::new(ExactFilter::new())
}

fn generic_filter(method: FilterMethod) -> Box<dyn SubscriptionFilter> {
    Box::new(GenericFilter::new(method))
}

/// Maps method tags to engine constructors.
///
/// Tags without a registered constructor get the generic fallback engine.
#[derive(Clone, Debug)]
pub struct FilterRegistry {
    constructors: HashMap<FilterMethod, FilterConstructor>,
    fallback: FilterConstructor,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
            fallback: generic_filter,
        };
        registry.register(FilterMethod::PREFIX, prefix_filter);
        registry.register(FilterMethod::EXACT, exact_filter);
        registry
    }
}

impl FilterRegistry {
    /// Installs a constructor for `method`, returning the one it replaces.
    pub fn register(
        &mut self,
        method: FilterMethod,
        constructor: FilterConstructor,
    ) -> Option<FilterConstructor> {
        self.constructors.insert(method, constructor)
    }

    /// Returns `true` when `method` has a dedicated engine.
    pub fn is_registered(&self, method: FilterMethod) -> bool {
        self.constructors.contains_key(&method)
    }

    pub fn create(&self, method: FilterMethod) -> Box<dyn SubscriptionFilter> {
        let constructor = self
            .constructors
            .get(&method)
            .copied()
            .unwrap_or(self.fallback);
        constructor(method)
    }
}

/// Filter engines owned by one socket, created lazily per method tag and kept for
/// the socket's lifetime.
pub struct FilterTable {
    registry: Arc<FilterRegistry>,
    filters: BTreeMap<FilterMethod, Box<dyn SubscriptionFilter>>,
}

impl Default for FilterTable {
    fn default() -> Self {
        Self::new(Arc::new(FilterRegistry::default()))
    }
}

impl FilterTable {
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self {
            registry,
            filters: BTreeMap::new(),
        }
    }

    /// Returns the engine for `method`, creating it on first use.
    pub fn filter_mut(&mut self, method: FilterMethod) -> &mut dyn SubscriptionFilter {
        let registry = &self.registry;
        let filter = self.filters.entry(method).or_insert_with(|| {
            debug!(
                event = events::FILTER_CREATED,
                component = COMPONENT,
                method = %method,
                structural = registry.is_registered(method),
                "creating filter engine"
            );
            registry.create(method)
        });
        &mut **filter
    }

    pub fn filter(&self, method: FilterMethod) -> Option<&dyn SubscriptionFilter> {
        self.filters.get(&method).map(|filter| &**filter)
    }

    /// Removes every rule of `peer` from every engine.
    pub fn remove_peer(&mut self, peer: PeerId, on_removed: &mut dyn FnMut(&[u8], FilterMethod)) {
        for filter in self.filters.values_mut() {
            filter.remove_peer(peer, on_removed);
        }
    }

    /// Reports the peers every engine considers interested in `topic`.
    pub fn match_peers(&self, topic: &[u8], on_match: &mut dyn FnMut(PeerId)) {
        for filter in self.filters.values() {
            filter.match_peers(topic, on_match);
        }
    }

    /// `true` when any engine matches `topic`.
    pub fn matches(&self, topic: &[u8]) -> bool {
        self.filters.values().any(|filter| filter.matches(topic))
    }

    /// Visits every live rule of every engine.
    pub fn for_each_rule(&self, visit: &mut dyn FnMut(&[u8], FilterMethod)) {
        for filter in self.filters.values() {
            filter.for_each_rule(visit);
        }
    }

    pub fn rule_count(&self) -> usize {
        self.filters.values().map(|filter| filter.rule_count()).sum()
    }

    /// Number of engines created so far.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for FilterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterTable")
            .field("methods", &self.filters.keys().collect::<Vec<_>>())
            .field("rules", &self.rule_count())
            .finish_non_exhaustive()
    }
}
