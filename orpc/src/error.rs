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

use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum CommonError {
    #[error("{0}")]
    Common(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("No reachable server among {replicas} replicas, last error: {last}")]
    NoReachableServer { replicas: usize, last: String },

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Prometheus(#[from] prometheus::Error),
}

impl CommonError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommonError::Timeout(_))
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, CommonError::NoReachableServer { .. })
    }
}

impl From<String> for CommonError {
    fn from(value: String) -> Self {
        CommonError::Common(value)
    }
}

impl From<&str> for CommonError {
    fn from(value: &str) -> Self {
        CommonError::Common(value.to_string())
    }
}
