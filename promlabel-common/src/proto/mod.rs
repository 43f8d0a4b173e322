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

//! Messages exchanged with the label authority.
//! The table only relies on the fields below, the encoding on the wire is up to the transport.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequestPair {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricLabelRequest {
    pub metric_name: String,
    pub pod_cluster_id: u32,
    pub epc_id: u32,
    pub labels: Vec<LabelRequestPair>,
}

impl MetricLabelRequest {
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            ..Default::default()
        }
    }

    pub fn add_label(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.labels.push(LabelRequestPair {
            name: name.into(),
            value: value.into(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequest {
    pub pod_cluster_id: u32,
    pub epc_id: u32,
    pub org_id: u32,
}

/// An empty request asks the authority for the whole universe of labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequest {
    pub request_labels: Vec<MetricLabelRequest>,
    pub request_targets: Vec<TargetRequest>,
}

impl LabelRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_full(&self) -> bool {
        self.request_labels.is_empty() && self.request_targets.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelIdInfo {
    pub name: String,
    pub name_id: u32,
    pub value: String,
    pub value_id: u32,
    pub app_label_column_index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricLabelResponse {
    pub org_id: u32,
    pub metric_name: String,
    pub metric_id: u32,
    pub label_ids: Vec<LabelIdInfo>,
}

/// Flat "all labels" section of one org, only filled for full requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgLabelResponse {
    pub org_id: u32,
    pub response_labels: Vec<LabelIdInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelResponse {
    pub response_label_ids: Vec<MetricLabelResponse>,
    pub org_response_labels: Vec<OrgLabelResponse>,
}

impl LabelResponse {
    pub fn labels_count(&self) -> usize {
        self.response_label_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_request_has_no_labels_and_no_targets() {
        assert!(LabelRequest::all().is_full());

        let mut req = LabelRequest::default();
        req.request_targets.push(TargetRequest::default());
        assert!(!req.is_full());

        let mut req = LabelRequest::default();
        let mut metric = MetricLabelRequest::new("up");
        metric.add_label("job", "node");
        req.request_labels.push(metric);
        assert!(!req.is_full());
        assert_eq!(req.request_labels[0].labels[0].value, "node");
    }
}
