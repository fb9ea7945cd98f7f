/*
 *  sink/mock.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Mock panel sink for tests: records every operation and can inject a
 *  failure on a chosen text submission.
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

use super::{DisplaySink, SinkError};
use crate::fonts::FontClass;
use crate::layout::{Effects, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    BeginFrame,
    Clear,
    SetBrightness(u8),
    Text {
        text: String,
        font: FontClass,
        rect: Rect,
        effects: Effects,
    },
    Image {
        name: String,
        rect: Rect,
    },
    EndFrame,
    Close,
}

/// Records all sink operations for inspection in tests.
#[derive(Debug, Default)]
pub struct MockSink {
    pub events: Vec<SinkEvent>,
    /// Fail the nth (0-based) submit_text call, once.
    pub fail_on_text: Option<usize>,
    texts_seen: usize,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_text(index: usize) -> Self {
        MockSink {
            fail_on_text: Some(index),
            ..Self::default()
        }
    }

    /// Events of the most recent frame, begin to end inclusive.
    pub fn last_frame(&self) -> &[SinkEvent] {
        let begin = self
            .events
            .iter()
            .rposition(|e| *e == SinkEvent::BeginFrame)
            .unwrap_or(0);
        &self.events[begin..]
    }
}

#[async_trait]
impl DisplaySink for MockSink {
    async fn begin_frame(&mut self) -> Result<(), SinkError> {
        self.events.push(SinkEvent::BeginFrame);
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), SinkError> {
        self.events.push(SinkEvent::Clear);
        Ok(())
    }

    async fn set_brightness(&mut self, level: u8) -> Result<(), SinkError> {
        self.events.push(SinkEvent::SetBrightness(level));
        Ok(())
    }

    async fn submit_text(
        &mut self,
        text: &str,
        font: FontClass,
        rect: Rect,
        effects: Effects,
    ) -> Result<(), SinkError> {
        let index = self.texts_seen;
        self.texts_seen += 1;
        if self.fail_on_text == Some(index) {
            self.fail_on_text = None;
            return Err(SinkError::Fault(format!(
                "injected failure on text #{index}"
            )));
        }
        self.events.push(SinkEvent::Text {
            text: text.to_string(),
            font,
            rect,
            effects,
        });
        Ok(())
    }

    async fn submit_image(&mut self, name: &str, rect: Rect) -> Result<(), SinkError> {
        self.events.push(SinkEvent::Image {
            name: name.to_string(),
            rect,
        });
        Ok(())
    }

    async fn end_frame(&mut self) -> Result<(), SinkError> {
        self.events.push(SinkEvent::EndFrame);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.events.push(SinkEvent::Close);
        Ok(())
    }
}
