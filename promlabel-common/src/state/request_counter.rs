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

use serde::{Deserialize, Serialize};

/// Counters accumulated since the previous telemetry read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounter {
    pub request_count: u64,
    pub request_total_delay_ns: u64,
    pub response_failed: u64,
    pub request_labels_count: u64,
    pub response_labels_count: u64,
    pub metric_unknown: u64,
    pub label_name_unknown: u64,
    pub label_value_unknown: u64,
    pub cache_expiration: u64,
    pub invalid_org: u64,
}
