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

use crate::{err_msg, CommonResult};
use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConf {
    // Default filter directive, RUST_LOG takes precedence when set.
    pub level: String,
    pub display_target: bool,
    pub ansi: bool,
}

impl Default for LogConf {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            display_target: false,
            ansi: false,
        }
    }
}

pub struct Logger;

static LOG_INIT: Once = Once::new();

impl Logger {
    /// Install the global subscriber and bridge `log` records into tracing.
    /// Calling it more than once is a no-op.
    pub fn init(conf: &LogConf) -> CommonResult<()> {
        let mut res = Ok(());
        LOG_INIT.call_once(|| {
            res = Self::init0(conf);
        });
        res
    }

    fn init0(conf: &LogConf) -> CommonResult<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(v) => v,
            Err(_) => EnvFilter::try_new(&conf.level)
                .map_err(|e| err_msg!("invalid log level {}: {}", conf.level, e))?,
        };

        // Another logger may already be installed by the host process.
        let _ = tracing_log::LogTracer::init();

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(conf.display_target)
            .with_ansi(conf.ansi)
            .try_init();

        tracing::debug!(level = %conf.level, ansi = conf.ansi, "logger initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_ok() {
        let conf = LogConf::default();
        Logger::init(&conf).unwrap();
        Logger::init(&conf).unwrap();
        log::info!("logger initialized");
    }
}
