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

use crate::rpc::LabelAuthority;
use crate::{LabelMetrics, LabelResolver};
use orpc::client::{Connector, FailoverSession};
use orpc::common::TimeSpent;
use promlabel_common::proto::{LabelRequest, LabelResponse};
use promlabel_common::LabelResult;
use std::sync::Arc;

/// Drives label id requests through the failover session and publishes the answers.
pub struct RequestCoordinator<C>
where
    C: Connector,
    C::Conn: LabelAuthority,
{
    session: FailoverSession<C>,
    resolver: Arc<LabelResolver>,
    metrics: Arc<LabelMetrics>,
}

impl<C> RequestCoordinator<C>
where
    C: Connector,
    C::Conn: LabelAuthority,
{
    pub fn new(
        session: FailoverSession<C>,
        resolver: Arc<LabelResolver>,
        metrics: Arc<LabelMetrics>,
    ) -> Self {
        Self {
            session,
            resolver,
            metrics,
        }
    }

    pub fn session(&self) -> &FailoverSession<C> {
        &self.session
    }

    /// Request the ids of `req` and publish them into the cache.
    /// A request without labels and targets is a full refresh.
    pub async fn fetch_labels(&self, req: &LabelRequest) -> LabelResult<LabelResponse> {
        self.metrics.on_request(req.request_labels.len());

        let spent = TimeSpent::new();
        let res = self
            .session
            .request(|conn, _| async move { conn.get_prometheus_label_ids(req).await })
            .await;

        let resp = match res {
            Ok(v) => v,
            Err(e) => {
                self.metrics.on_failure();
                return Err(e.into());
            }
        };

        self.metrics.on_response(resp.labels_count(), spent.used_ns());
        self.resolver.update_from_response(&resp, req.is_full());

        Ok(resp)
    }

    pub async fn fetch_all(&self) -> LabelResult<LabelResponse> {
        self.fetch_labels(&LabelRequest::all()).await
    }
}
