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

//! Socket configuration, loadable from JSON5.
//!
//! ```
//! use pubsub_filter::config::{SocketConfig, SubFilterMethod};
//!
//! let config = SocketConfig::from_json5_str(
//!     r#"{
//!         high_water_mark: 64,
//!         sub: { filter_method: "exact" },
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.high_water_mark, 64);
//! assert_eq!(config.sub.filter_method, SubFilterMethod::Exact);
//! assert!(config.xpub.surface_events);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PubSubError, Result};
use crate::subscription_codec::FilterMethod;

pub const DEFAULT_HIGH_WATER_MARK: usize = 1000;

fn default_high_water_mark() -> usize {
    DEFAULT_HIGH_WATER_MARK
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SocketConfig {
    /// Per-direction frame capacity of pipes created from this configuration.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: usize,
    #[serde(default)]
    pub sub: SubConfig,
    #[serde(default)]
    pub xsub: XSubConfig,
    #[serde(default)]
    pub xpub: XPubConfig,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            sub: SubConfig::default(),
            xsub: XSubConfig::default(),
            xpub: XPubConfig::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SubConfig {
    #[serde(default)]
    pub filter_method: SubFilterMethod,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct XSubConfig {
    /// Whether inbound messages are matched against local rules.
    #[serde(default)]
    pub filter: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct XPubConfig {
    /// Whether unique (un)subscriptions are queued for the owner to receive.
    #[serde(default = "default_true")]
    pub surface_events: bool,
}

impl Default for XPubConfig {
    fn default() -> Self {
        Self {
            surface_events: true,
        }
    }
}

/// Filter methods a SUB socket may be switched to.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubFilterMethod {
    #[default]
    Prefix,
    Exact,
}

impl From<SubFilterMethod> for FilterMethod {
    fn from(method: SubFilterMethod) -> Self {
        match method {
            SubFilterMethod::Prefix => FilterMethod::PREFIX,
            SubFilterMethod::Exact => FilterMethod::EXACT,
        }
    }
}

impl SocketConfig {
    pub fn from_json5_str(contents: &str) -> Result<Self> {
        json5::from_str(contents).map_err(|err| PubSubError::Config(err.to_string()))
    }

    pub fn from_json5_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            PubSubError::Config(format!("unable to read {}: {err}", path.display()))
        })?;
        Self::from_json5_str(&contents)
    }
}
