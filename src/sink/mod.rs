/*
 *  sink/mod.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Display sink contract. The panel itself is a remote controller with
 *  a small queued command set: draw commands accumulate between
 *  begin_frame and end_frame and are shown atomically on flush.
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

pub mod mock;
pub mod tcp;

use async_trait::async_trait;
use thiserror::Error;

use crate::fonts::FontClass;
use crate::layout::{DrawCommand, Effects, Rect};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("panel connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("command encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("panel fault: {0}")]
    Fault(String),
}

/// Command contract of the panel controller. One long-lived handle per
/// run; any failure here is fatal to the run and handled by the
/// supervisor.
#[async_trait]
pub trait DisplaySink: Send {
    /// Open a new draw queue for the next frame.
    async fn begin_frame(&mut self) -> Result<(), SinkError>;

    /// Wipe the panel contents.
    async fn clear(&mut self) -> Result<(), SinkError>;

    async fn set_brightness(&mut self, level: u8) -> Result<(), SinkError>;

    async fn submit_text(
        &mut self,
        text: &str,
        font: FontClass,
        rect: Rect,
        effects: Effects,
    ) -> Result<(), SinkError>;

    async fn submit_image(&mut self, name: &str, rect: Rect) -> Result<(), SinkError>;

    /// Flush the queued frame to the panel.
    async fn end_frame(&mut self) -> Result<(), SinkError>;

    /// Release the transport. Best effort; called before every restart.
    async fn close(&mut self) -> Result<(), SinkError>;

    /// Queue one prepared draw command.
    async fn submit(&mut self, command: &DrawCommand) -> Result<(), SinkError> {
        match command {
            DrawCommand::Text {
                text,
                font,
                rect,
                effects,
            } => self.submit_text(text, *font, *rect, *effects).await,
            DrawCommand::Image { name, rect } => self.submit_image(name, *rect).await,
        }
    }
}
