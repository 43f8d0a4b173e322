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

use crate::conf::{LabelConf, LogConf};
use crate::LabelResult;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConf {
    pub label: LabelConf,
    pub log: LogConf,
}

impl ClusterConf {
    pub const ENV_CONF_FILE: &'static str = "PROMLABEL_CONF_FILE";

    pub fn from_file(path: impl AsRef<Path>) -> LabelResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let conf = Self::from_str(&content)?;
        info!("load conf from {}", path.display());
        Ok(conf)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> LabelResult<Self> {
        let mut conf: ClusterConf = toml::from_str(content)?;
        conf.init()?;
        Ok(conf)
    }

    pub fn init(&mut self) -> LabelResult<()> {
        self.label.init()
    }
}
