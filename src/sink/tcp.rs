/*
 *  sink/tcp.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  TCP driver for the panel controller. Commands go over the wire as
 *  newline-delimited JSON objects; the controller queues everything
 *  between begin_frame and end_frame and repaints on flush.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use super::{DisplaySink, SinkError};
use crate::fonts::FontClass;
use crate::layout::{Effects, Rect};

#[derive(Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum WireCommand<'a> {
    BeginFrame,
    Clear,
    SetBrightness {
        level: u8,
    },
    Text {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        font: u8,
        text: &'a str,
        effects: Effects,
    },
    Image {
        x: u32,
        y: u32,
        name: &'a str,
    },
    EndFrame,
}

/// Panel controller connection over TCP.
pub struct TcpSink {
    stream: BufWriter<TcpStream>,
    peer: String,
}

impl TcpSink {
    pub async fn connect(host: &str, port: u16) -> Result<Self, SinkError> {
        let peer = format!("{host}:{port}");
        info!("connecting to panel at {peer}");
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(TcpSink {
            stream: BufWriter::new(stream),
            peer,
        })
    }

    async fn send(&mut self, command: &WireCommand<'_>) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(command)?;
        line.push(b'\n');
        self.stream.write_all(&line).await?;
        Ok(())
    }
}

#[async_trait]
impl DisplaySink for TcpSink {
    async fn begin_frame(&mut self) -> Result<(), SinkError> {
        self.send(&WireCommand::BeginFrame).await
    }

    async fn clear(&mut self) -> Result<(), SinkError> {
        self.send(&WireCommand::Clear).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn set_brightness(&mut self, level: u8) -> Result<(), SinkError> {
        self.send(&WireCommand::SetBrightness { level }).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn submit_text(
        &mut self,
        text: &str,
        font: FontClass,
        rect: Rect,
        effects: Effects,
    ) -> Result<(), SinkError> {
        self.send(&WireCommand::Text {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            font: font.wire_id(),
            text,
            effects,
        })
        .await
    }

    async fn submit_image(&mut self, name: &str, rect: Rect) -> Result<(), SinkError> {
        self.send(&WireCommand::Image {
            x: rect.x,
            y: rect.y,
            name,
        })
        .await
    }

    async fn end_frame(&mut self) -> Result<(), SinkError> {
        self.send(&WireCommand::EndFrame).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        debug!("closing panel connection to {}", self.peer);
        self.stream.flush().await?;
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_commands_serialize_tagged() {
        let cmd = WireCommand::SetBrightness { level: 128 };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["cmd"], "set_brightness");
        assert_eq!(json["level"], 128);

        let cmd = WireCommand::Text {
            x: 0,
            y: 12,
            width: 24,
            height: 16,
            font: 10,
            text: "DC",
            effects: Effects::NONE.centered().inverted(),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["cmd"], "text");
        assert_eq!(json["effects"]["inverted"], true);
        assert_eq!(json["effects"]["scrolling"], false);
    }
}
