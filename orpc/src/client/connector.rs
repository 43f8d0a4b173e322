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

use crate::io::frame::{FrameCodec, FrameStream};
use crate::io::net::InetAddr;
use crate::{err_box, CommonError, CommonResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::SinkExt;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time;

/// Creates connections to one replica address.
/// The connection type is a cheap handle; the session clones it for every call.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Clone + Send + Sync + 'static;

    async fn connect(&self, addr: &InetAddr) -> CommonResult<Self::Conn>;

    async fn close(&self, _conn: Self::Conn) {}
}

/// A framed tcp connection. Calls are serialized: one request frame, one response frame.
#[derive(Clone)]
pub struct FrameConn {
    addr: InetAddr,
    stream: Arc<Mutex<FrameStream>>,
}

impl FrameConn {
    pub fn new(addr: InetAddr, stream: FrameStream) -> Self {
        Self {
            addr,
            stream: Arc::new(Mutex::new(stream)),
        }
    }

    pub fn addr(&self) -> &InetAddr {
        &self.addr
    }

    pub async fn call<Req, Rep>(&self, req: &Req) -> CommonResult<Rep>
    where
        Req: Serialize + Sync,
        Rep: DeserializeOwned,
    {
        let mut stream = self.stream.lock().await;
        FrameCodec::send(&mut stream, req).await?;
        match FrameCodec::recv(&mut stream).await? {
            Some(rep) => Ok(rep),
            None => err_box!("connection to {} closed by peer", self.addr),
        }
    }

    pub async fn shutdown(&self) {
        let mut stream = self.stream.lock().await;
        if let Err(e) = SinkExt::<Bytes>::close(&mut *stream).await {
            debug!("close connection to {} failed: {}", self.addr, e);
        }
    }
}

#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
    max_frame_len: usize,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration, max_frame_len: usize) -> Self {
        Self {
            connect_timeout,
            max_frame_len,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Conn = FrameConn;

    async fn connect(&self, addr: &InetAddr) -> CommonResult<FrameConn> {
        let stream = match time::timeout(
            self.connect_timeout,
            TcpStream::connect(addr.connect_addr()),
        )
        .await
        {
            Ok(v) => v?,
            Err(_) => return Err(CommonError::Timeout(self.connect_timeout)),
        };
        stream.set_nodelay(true)?;

        Ok(FrameConn::new(
            addr.clone(),
            FrameCodec::framed(stream, self.max_frame_len),
        ))
    }

    async fn close(&self, conn: FrameConn) {
        conn.shutdown().await
    }
}
