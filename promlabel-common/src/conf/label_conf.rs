// Copyright 2025 OPPO.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{LabelError, LabelResult};
use orpc::common::DurationUnit;
use orpc::io::net::InetAddr;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prometheus label table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConf {
    // Authority (controller) replica addresses, tried in order.
    pub authority_addrs: Vec<String>,
    pub port: u16,

    // Bound of a single attempt against one replica, connect included.
    #[serde(skip)]
    pub rpc_timeout: Duration,
    #[serde(alias = "rpc_timeout")]
    pub rpc_timeout_str: String,

    pub rpc_max_msg_size: usize,

    // Entries older than this are reported as misses.
    #[serde(skip)]
    pub cache_expiration: Duration,
    #[serde(alias = "cache_expiration")]
    pub cache_expiration_str: String,

    // Precision of the coarse clock used for entry timestamps.
    #[serde(skip)]
    pub clock_tick: Duration,
    #[serde(alias = "clock_tick")]
    pub clock_tick_str: String,

    // 0 disables the periodic full refresh.
    #[serde(skip)]
    pub full_refresh_interval: Duration,
    #[serde(alias = "full_refresh_interval")]
    pub full_refresh_interval_str: String,

    pub max_org_count: usize,
}

impl LabelConf {
    pub const DEFAULT_PORT: u16 = 20035;
    pub const DEFAULT_MAX_ORG_COUNT: usize = 1025;

    pub fn init(&mut self) -> LabelResult<()> {
        self.rpc_timeout = DurationUnit::from_str(&self.rpc_timeout_str)?.as_duration();
        self.cache_expiration = DurationUnit::from_str(&self.cache_expiration_str)?.as_duration();
        self.clock_tick = DurationUnit::from_str(&self.clock_tick_str)?.as_duration();
        self.full_refresh_interval =
            DurationUnit::from_str(&self.full_refresh_interval_str)?.as_duration();

        self.check()
    }

    fn check(&self) -> LabelResult<()> {
        if self.authority_addrs.is_empty() {
            return Err(LabelError::Config(
                "authority_addrs cannot be empty".to_string(),
            ));
        }
        if self.cache_expiration.as_secs() == 0 {
            return Err(LabelError::Config(format!(
                "cache_expiration must be at least 1s, got {}",
                self.cache_expiration_str
            )));
        }
        if self.rpc_timeout.is_zero() {
            return Err(LabelError::Config("rpc_timeout cannot be 0".to_string()));
        }
        if self.clock_tick.is_zero() {
            return Err(LabelError::Config("clock_tick cannot be 0".to_string()));
        }
        if self.max_org_count == 0 {
            return Err(LabelError::Config("max_org_count cannot be 0".to_string()));
        }
        Ok(())
    }

    pub fn cache_expiration_secs(&self) -> u64 {
        self.cache_expiration.as_secs()
    }

    pub fn authority_nodes(&self) -> Vec<InetAddr> {
        self.authority_addrs
            .iter()
            .map(|host| InetAddr::new(host.trim(), self.port))
            .collect()
    }
}

impl Default for LabelConf {
    fn default() -> Self {
        let mut conf = Self {
            authority_addrs: vec!["127.0.0.1".to_string()],
            port: Self::DEFAULT_PORT,

            rpc_timeout: Default::default(),
            rpc_timeout_str: "1s".to_string(),

            rpc_max_msg_size: 100 * 1024 * 1024,

            cache_expiration: Default::default(),
            cache_expiration_str: "24h".to_string(),

            clock_tick: Default::default(),
            clock_tick_str: "10s".to_string(),

            full_refresh_interval: Default::default(),
            full_refresh_interval_str: "10m".to_string(),

            max_org_count: Self::DEFAULT_MAX_ORG_COUNT,
        };

        // The defaults above always parse.
        conf.rpc_timeout = Duration::from_secs(1);
        conf.cache_expiration = Duration::from_secs(24 * 3600);
        conf.clock_tick = Duration::from_secs(10);
        conf.full_refresh_interval = Duration::from_secs(600);
        conf
    }
}
