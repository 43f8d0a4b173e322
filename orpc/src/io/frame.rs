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

use crate::CommonResult;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

pub type FrameStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Length delimited frames carrying bincode encoded payloads.
/// One frame holds exactly one message.
pub struct FrameCodec;

impl FrameCodec {
    pub fn codec(max_frame_len: usize) -> LengthDelimitedCodec {
        LengthDelimitedCodec::builder()
            .max_frame_length(max_frame_len)
            .new_codec()
    }

    pub fn framed(stream: TcpStream, max_frame_len: usize) -> FrameStream {
        Framed::new(stream, Self::codec(max_frame_len))
    }

    pub fn encode<T: Serialize>(msg: &T) -> CommonResult<Bytes> {
        Ok(Bytes::from(bincode::serialize(msg)?))
    }

    pub fn decode<T: DeserializeOwned>(buf: &[u8]) -> CommonResult<T> {
        Ok(bincode::deserialize(buf)?)
    }

    pub async fn send<T: Serialize>(stream: &mut FrameStream, msg: &T) -> CommonResult<()> {
        let buf = Self::encode(msg)?;
        stream.send(buf).await?;
        Ok(())
    }

    /// Returns None when the peer closed the stream.
    pub async fn recv<T: DeserializeOwned>(stream: &mut FrameStream) -> CommonResult<Option<T>> {
        match stream.next().await {
            None => Ok(None),
            Some(frame) => {
                let frame = frame?;
                Ok(Some(Self::decode(&frame)?))
            }
        }
    }
}
