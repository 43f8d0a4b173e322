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
use std::fmt::{Display, Formatter};

/// String dictionaries of an org shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelKind {
    Metric,
    Name,
    Value,
}

impl LabelKind {
    pub const ALL: [LabelKind; 3] = [LabelKind::Metric, LabelKind::Name, LabelKind::Value];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKind::Metric => "metric",
            LabelKind::Name => "name",
            LabelKind::Value => "value",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "metric" => Some(LabelKind::Metric),
            "name" => Some(LabelKind::Name),
            "value" => Some(LabelKind::Value),
            _ => None,
        }
    }
}

impl Display for LabelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Debug commands understood by the label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelCmd {
    Metric,
    Name,
    Value,
    Column,
    Stats,
    Test,
    Explain,
}

impl LabelCmd {
    pub const ALL: [LabelCmd; 7] = [
        LabelCmd::Metric,
        LabelCmd::Name,
        LabelCmd::Value,
        LabelCmd::Column,
        LabelCmd::Stats,
        LabelCmd::Test,
        LabelCmd::Explain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelCmd::Metric => "metric",
            LabelCmd::Name => "name",
            LabelCmd::Value => "value",
            LabelCmd::Column => "column",
            LabelCmd::Stats => "stats",
            LabelCmd::Test => "test",
            LabelCmd::Explain => "explain",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }

    pub fn help(&self) -> &'static str {
        match self {
            LabelCmd::Metric | LabelCmd::Name | LabelCmd::Value | LabelCmd::Column => {
                "org_id[|filter]"
            }
            LabelCmd::Stats => "org_id",
            LabelCmd::Test => "metric=xxx,pod_cluster_id=xxx,epc_id=xxx,org_id=xxx,label1=xxx,..., all, or a JSON request",
            LabelCmd::Explain => {
                "xxx|xxx|xxxx|xxxx|..., means: metric_id|target_id|app_label_value_id_1|app_label_value_id_2|..."
            }
        }
    }

    pub fn kind(&self) -> Option<LabelKind> {
        match self {
            LabelCmd::Metric => Some(LabelKind::Metric),
            LabelCmd::Name => Some(LabelKind::Name),
            LabelCmd::Value => Some(LabelKind::Value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trip() {
        for cmd in LabelCmd::ALL {
            assert_eq!(LabelCmd::parse(cmd.as_str()), Some(cmd));
        }
        for kind in LabelKind::ALL {
            assert_eq!(LabelKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(LabelCmd::parse("drop"), None);
        assert_eq!(LabelCmd::Column.kind(), None);
    }
}
