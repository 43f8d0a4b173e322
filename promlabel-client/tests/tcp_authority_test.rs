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

use orpc::io::frame::FrameCodec;
use promlabel_client::LabelTable;
use promlabel_common::conf::ClusterConf;
use promlabel_common::proto::*;
use tokio::net::TcpListener;

// Answers every request with fixed ids, label values are only sent for targeted requests.
fn answer(req: &LabelRequest) -> LabelResponse {
    let is_full = req.is_full();
    let label = |name: &str, name_id, value: &str, value_id, column| LabelIdInfo {
        name: name.to_string(),
        name_id,
        value: if is_full { String::new() } else { value.to_string() },
        value_id: if is_full { 0 } else { value_id },
        app_label_column_index: column,
    };

    let mut resp = LabelResponse {
        response_label_ids: vec![MetricLabelResponse {
            org_id: 1,
            metric_name: "node_cpu_seconds_total".to_string(),
            metric_id: 42,
            label_ids: vec![label("cpu", 3, "0", 30, 1), label("mode", 4, "idle", 40, 2)],
        }],
        org_response_labels: vec![],
    };
    if is_full {
        resp.org_response_labels.push(OrgLabelResponse {
            org_id: 1,
            response_labels: vec![LabelIdInfo {
                name: "mode".to_string(),
                name_id: 4,
                value: "user".to_string(),
                value_id: 41,
                app_label_column_index: 0,
            }],
        });
    }
    resp
}

#[tokio::test]
async fn label_table_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(v) => v,
                Err(_) => return,
            };
            tokio::spawn(async move {
                let mut framed = FrameCodec::framed(stream, 1024 * 1024);
                while let Ok(Some(req)) = FrameCodec::recv::<LabelRequest>(&mut framed).await {
                    if FrameCodec::send(&mut framed, &answer(&req)).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    let conf = ClusterConf::from_str(&format!(
        r#"
        [label]
        authority_addrs = ["127.0.0.1"]
        port = {}
        rpc_timeout = "1s"
        rpc_max_msg_size = 1048576
        cache_expiration = "1h"
        max_org_count = 4
        "#,
        port
    ))
    .unwrap();
    let table = LabelTable::new(conf.label).unwrap();

    table.request_all_label_ids().await.unwrap();
    assert_eq!(table.query_metric_id(1, "node_cpu_seconds_total"), (42, true));
    assert_eq!(table.query_label_value_id(1, "user"), (41, true));
    assert!(table.query_label_name_value(1, 4, 41));
    assert_eq!(table.query_label_value_id(1, "idle"), (0, false));
    assert_eq!(table.query_column_index(1, 42, 4), Some(2));

    let mut metric = MetricLabelRequest::new("node_cpu_seconds_total");
    metric.add_label("mode", "idle");
    let req = LabelRequest {
        request_labels: vec![metric],
        request_targets: vec![],
    };
    let resp = table.request_label_ids(&req).await.unwrap();
    assert_eq!(resp.response_label_ids[0].metric_id, 42);
    assert_eq!(table.query_label_value_id(1, "idle"), (40, true));
    assert!(table.query_label_name_value(1, 4, 40));

    let c = table.get_counter();
    assert_eq!(c.request_count, 2);
    assert_eq!(c.response_labels_count, 2);
    assert!(c.request_total_delay_ns > 0);
    assert!(table
        .metrics()
        .text_output()
        .unwrap()
        .contains("prometheus_label_request_total 2"));
}
