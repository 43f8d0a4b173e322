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

//! Text dumps of the label table for the ingester debug command.

use crate::cache::split_column_index_key;
use crate::rpc::LabelAuthority;
use crate::LabelTable;
use orpc::client::Connector;
use orpc::common::LocalTime;
use promlabel_common::proto::{LabelRequest, MetricLabelRequest, TargetRequest};
use promlabel_common::state::{LabelCmd, LabelKind};
use promlabel_common::{LabelError, LabelResult};

/// Build a request from "metric=xxx,pod_cluster_id=xxx,epc_id=xxx,org_id=xxx,label1=xxx,...",
/// "all" for a full refresh, or a request written as JSON.
pub fn parse_test_request(args: &str) -> LabelResult<LabelRequest> {
    let args = args.trim();
    if args == "all" {
        return Ok(LabelRequest::all());
    }
    if args.starts_with('{') {
        return Ok(serde_json::from_str(args)?);
    }

    let mut metric = MetricLabelRequest::default();
    let mut target = TargetRequest::default();
    for kv in args.split(',') {
        let (k, v) = match kv.split_once('=') {
            Some((k, v)) if !v.contains('=') => (k.trim(), v.trim()),
            _ => continue,
        };
        match k {
            "metric" => metric.metric_name = v.to_string(),
            "pod_cluster_id" => target.pod_cluster_id = v.parse().unwrap_or(0),
            "epc_id" => target.epc_id = v.parse().unwrap_or(0),
            "org_id" => target.org_id = v.parse().unwrap_or(0),
            _ => metric.add_label(k, v),
        }
    }
    metric.pod_cluster_id = target.pod_cluster_id;
    metric.epc_id = target.epc_id;

    Ok(LabelRequest {
        request_labels: vec![metric],
        request_targets: vec![target],
    })
}

impl<C> LabelTable<C>
where
    C: Connector,
    C::Conn: LabelAuthority,
{
    fn check_org(&self, org: u32) -> LabelResult<u32> {
        if self.cache().is_valid_org(org) {
            Ok(org)
        } else {
            Err(LabelError::InvalidOrg(org))
        }
    }

    // "org_id[|filter]"
    fn parse_org_args(args: &str) -> LabelResult<(u32, &str)> {
        let mut parts = args.splitn(2, '|');
        let org = parts.next().unwrap_or("").trim();
        let filter = parts.next().unwrap_or("");
        match org.parse::<u32>() {
            Ok(v) => Ok((v, filter)),
            Err(_) => Err(LabelError::InvalidCommand(format!(
                "org id expected, got '{}'",
                org
            ))),
        }
    }

    pub fn stats_string(&self, org: u32) -> String {
        let cache = self.cache();
        let mut sb = format!("\norg-id {}\n", org);
        sb.push_str("\ntableType  total-count  max-id\n");
        sb.push_str("--------------------------------\n");
        for kind in LabelKind::ALL {
            sb.push_str(&format!(
                "{:<9}  {:<11}  {:<6}\n",
                kind.as_str(),
                cache.len(org, kind),
                cache.max_id(org, kind)
            ));
        }
        sb.push_str(&format!(
            "{:<9}  {:<11}  {:<6}\n",
            "column",
            cache.column_len(org),
            cache.max_column_index(org)
        ));
        sb
    }

    /// Rows of one string dictionary, rows not containing `filter` are left out.
    pub fn table_string(&self, kind: LabelKind, org: u32, filter: &str) -> String {
        let (key_width, id_width, key_title, id_title) = match kind {
            LabelKind::Metric => (100, 8, "metricName", "metricId"),
            LabelKind::Name => (64, 7, "name", "nameId"),
            LabelKind::Value => (128, 8, "value", "valueId"),
        };

        let mut sb = format!("\norg-id {}\n\n", org);
        let header = format!(
            "{:<key_width$}  {:<id_width$}   updated_at\n",
            key_title, id_title
        );
        sb.push_str(&header);
        sb.push_str(&"-".repeat(header.len() - 1));
        sb.push('\n');

        let mut entries = self.cache().entries(org, kind);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, entry) in entries {
            let row = format!(
                "{:<key_width$}  {:<id_width$}   {}\n",
                key,
                entry.id(),
                LocalTime::secs_to_string(entry.timestamp() as u64)
            );
            if row.contains(filter) {
                sb.push_str(&row);
            }
        }
        sb
    }

    pub fn column_string(&self, org: u32, filter: &str) -> String {
        let cache = self.cache();
        let mut sb = format!("\norg-id {}\n\n", org);
        let header = format!(
            "{:<11}  {:<100}  {:<9}  {:<64}  {:<6}\n",
            "columnIndex", "metricName", "metricId", "name", "nameId"
        );
        sb.push_str(&header);
        sb.push_str(&"-".repeat(header.len() - 1));
        sb.push('\n');

        let mut entries = cache.column_entries(org);
        entries.sort_by_key(|(key, index)| (*index, *key));
        for (key, index) in entries {
            let (metric_id, name_id) = split_column_index_key(key);
            let metric_name = cache
                .find_key(org, LabelKind::Metric, metric_id)
                .unwrap_or_default();
            let name = cache
                .find_key(org, LabelKind::Name, name_id)
                .unwrap_or_default();
            let row = format!(
                "{:<11}  {:<100}  {:<9}  {:<64}  {:<6}\n",
                index, metric_name, metric_id, name, name_id
            );
            if row.contains(filter) {
                sb.push_str(&row);
            }
        }
        sb
    }

    /// Resolve a wide row back to strings.
    /// `args` is "metric_id|target_id|app_label_value_id_1|app_label_value_id_2|...",
    /// the n-th app label value sits in column n of the metric.
    pub fn explain_string(&self, org: u32, args: &str) -> String {
        let ids: Vec<u32> = args
            .split('|')
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.parse::<u32>().unwrap_or(0))
            .collect();

        let mut explain = String::new();
        for (i, id) in ids.iter().enumerate() {
            match i {
                0 => explain.push_str(&format!("metric_id={},", id)),
                1 => explain.push_str(&format!("target_id={},", id)),
                _ => explain.push_str(&format!("app_label_value_id_{}={},", i - 1, id)),
            }
        }

        let metric_id = match ids.first() {
            Some(v) if *v != 0 => *v,
            _ => return format!("invalid metric_id, {}", explain),
        };
        match ids.get(1) {
            Some(v) if *v != 0 => (),
            _ => return format!("invalid target_id, {}", explain),
        }

        let cache = self.cache();
        let columns: Vec<(u32, u32)> = cache
            .column_entries(org)
            .into_iter()
            .filter_map(|(key, index)| {
                let (mid, name_id) = split_column_index_key(key);
                (mid == metric_id).then_some((index, name_id))
            })
            .collect();

        let metric_name = cache
            .find_key(org, LabelKind::Metric, metric_id)
            .unwrap_or_default();
        let mut explained = format!("metric={},", metric_name);
        for (i, value_id) in ids.iter().skip(2).enumerate() {
            let column = i as u32 + 1;
            let name = columns
                .iter()
                .find(|(index, _)| *index == column)
                .and_then(|(_, name_id)| cache.find_key(org, LabelKind::Name, *name_id))
                .unwrap_or_default();
            let value = cache
                .find_key(org, LabelKind::Value, *value_id)
                .unwrap_or_default();
            explained.push_str(&format!("[{}]{}={},", column, name, value));
        }

        format!("explain: {}\nexplained: {}", explain, explained)
    }

    /// Send a request built by [`parse_test_request`] and render both sides.
    pub async fn test_string(&self, args: &str) -> LabelResult<String> {
        let req = parse_test_request(args)?;
        let req_str = serde_json::to_string(&req)?;
        let res = match self.request_label_ids(&req).await {
            Ok(resp) => format!(
                "request: {}\nresponse: {}",
                req_str,
                serde_json::to_string(&resp)?
            ),
            Err(e) => format!("request: {}\nresponse failed: {}", req_str, e),
        };
        Ok(res)
    }

    async fn run_command(&self, cmd: LabelCmd, args: &str) -> LabelResult<String> {
        let res = match cmd {
            LabelCmd::Test => self.test_string(args).await?,
            LabelCmd::Explain => self.explain_string(Self::DEFAULT_ORG_ID, args),
            LabelCmd::Stats => {
                let (org, _) = Self::parse_org_args(args)?;
                self.stats_string(self.check_org(org)?)
            }
            LabelCmd::Column => {
                let (org, filter) = Self::parse_org_args(args)?;
                self.column_string(self.check_org(org)?, filter)
            }
            LabelCmd::Metric | LabelCmd::Name | LabelCmd::Value => {
                let (org, filter) = Self::parse_org_args(args)?;
                let org = self.check_org(org)?;
                match cmd.kind() {
                    Some(kind) => self.table_string(kind, org, filter),
                    None => self.stats_string(org),
                }
            }
        };
        Ok(res)
    }

    /// Execute a debug command, errors are rendered as text.
    pub async fn handle_command(&self, cmd: LabelCmd, args: &str) -> String {
        match self.run_command(cmd, args).await {
            Ok(v) => v,
            Err(e) => format!("{}\nusage: {} {}", e, cmd.as_str(), cmd.help()),
        }
    }

    pub async fn handle_command_str(&self, cmd: &str, args: &str) -> String {
        match LabelCmd::parse(cmd) {
            Some(cmd) => self.handle_command(cmd, args).await,
            None => {
                let cmds: Vec<&str> = LabelCmd::ALL.iter().map(|c| c.as_str()).collect();
                let err = LabelError::InvalidCommand(format!(
                    "{}, expected one of {}",
                    cmd,
                    cmds.join("|")
                ));
                err.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_test_request_args() {
        let req =
            parse_test_request("metric=up,pod_cluster_id=3,epc_id=4,org_id=2,job=node,bad").unwrap();
        assert!(!req.is_full());
        assert_eq!(req.request_labels[0].metric_name, "up");
        assert_eq!(req.request_labels[0].pod_cluster_id, 3);
        assert_eq!(req.request_labels[0].labels.len(), 1);
        assert_eq!(req.request_labels[0].labels[0].name, "job");
        assert_eq!(req.request_targets[0].org_id, 2);
        assert_eq!(req.request_targets[0].epc_id, 4);

        assert!(parse_test_request("all").unwrap().is_full());
    }

    #[test]
    fn parse_test_request_json() {
        let req = parse_test_request(
            r#" {"request_labels":[{"metric_name":"up","pod_cluster_id":0,"epc_id":0,"labels":[]}],"request_targets":[]} "#,
        )
        .unwrap();
        assert_eq!(req.request_labels[0].metric_name, "up");
        assert!(req.request_targets.is_empty());

        let err = parse_test_request("{\"request_labels\":").unwrap_err();
        assert!(matches!(err, LabelError::Json(_)));
    }
}
