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

use orpc::CommonError;

#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid org id {0}")]
    InvalidOrg(u32),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl LabelError {
    /// All authority replicas were tried and none answered.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LabelError::Common(e) if e.is_unreachable())
    }
}

impl From<std::io::Error> for LabelError {
    fn from(value: std::io::Error) -> Self {
        LabelError::Common(CommonError::from(value))
    }
}
