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

use async_trait::async_trait;
use orpc::client::FrameConn;
use orpc::CommonResult;
use promlabel_common::proto::{LabelRequest, LabelResponse};

/// The label id service of the authority.
/// An empty request asks for the whole universe of labels.
#[async_trait]
pub trait LabelAuthority: Clone + Send + Sync + 'static {
    async fn get_prometheus_label_ids(&self, req: &LabelRequest) -> CommonResult<LabelResponse>;
}

#[async_trait]
impl LabelAuthority for FrameConn {
    async fn get_prometheus_label_ids(&self, req: &LabelRequest) -> CommonResult<LabelResponse> {
        self.call(req).await
    }
}
