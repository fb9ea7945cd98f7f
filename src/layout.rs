/*
 *  layout.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Declarative page layouts: target rectangles, fonts and effects per
 *  page mode, plus the draw command model submitted to the sink. Row
 *  geometry is data, not code, so the two page variants share one
 *  renderer.
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

use serde::Serialize;
use thiserror::Error;

use crate::fonts::FontClass;
use crate::pages::PageMode;

/// Panel geometry. The layouts below are written against this and the
/// bounds check keeps them honest.
pub const PANEL_WIDTH: u32 = 288;
pub const PANEL_HEIGHT: u32 = 64;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(
        "draw rect {x},{y} {width}x{height} exceeds panel bounds {PANEL_WIDTH}x{PANEL_HEIGHT}"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full_panel() -> Self {
        Rect::new(0, 0, PANEL_WIDTH, PANEL_HEIGHT)
    }

    pub fn fits_panel(&self) -> bool {
        self.x + self.width <= PANEL_WIDTH && self.y + self.height <= PANEL_HEIGHT
    }
}

/// Presentation effects understood by the panel, combinable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Effects {
    pub centered: bool,
    pub right_aligned: bool,
    pub v_centered: bool,
    pub scrolling: bool,
    pub inverted: bool,
}

impl Effects {
    pub const NONE: Effects = Effects {
        centered: false,
        right_aligned: false,
        v_centered: false,
        scrolling: false,
        inverted: false,
    };

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    pub fn right_aligned(mut self) -> Self {
        self.right_aligned = true;
        self
    }

    pub fn v_centered(mut self) -> Self {
        self.v_centered = true;
        self
    }

    pub fn scrolling(mut self) -> Self {
        self.scrolling = true;
        self
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

/// One unit of panel output. A page is an ordered sequence of these,
/// submitted atomically inside one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
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
}

impl DrawCommand {
    pub fn text(
        text: impl Into<String>,
        font: FontClass,
        rect: Rect,
        effects: Effects,
    ) -> Result<Self, RenderError> {
        check_bounds(rect)?;
        Ok(DrawCommand::Text {
            text: text.into(),
            font,
            rect,
            effects,
        })
    }

    pub fn image(name: impl Into<String>, rect: Rect) -> Result<Self, RenderError> {
        check_bounds(rect)?;
        Ok(DrawCommand::Image {
            name: name.into(),
            rect,
        })
    }

    pub fn rect(&self) -> Rect {
        match self {
            DrawCommand::Text { rect, .. } | DrawCommand::Image { rect, .. } => *rect,
        }
    }
}

fn check_bounds(rect: Rect) -> Result<(), RenderError> {
    if rect.fits_panel() {
        Ok(())
    } else {
        Err(RenderError::OutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        })
    }
}

/// One column within a page row.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub x: u32,
    pub width: u32,
    pub height: u32,
    /// Offset from the row baseline; the schedule page nudges the
    /// smaller fonts down a few pixels.
    pub y_offset: u32,
    pub font: FontClass,
    pub effects: Effects,
    /// Whether an overflowing cell degrades to a marquee. Columns that
    /// always fit (fixed-width codes, minute counts) leave this off.
    pub scroll_on_overflow: bool,
}

/// Data-driven layout for one page mode.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub row_count: usize,
    pub row_height: u32,
    pub first_row_y: u32,
    pub columns: &'static [Column],
    pub placeholder_font: FontClass,
}

const ARRIVAL_COLUMNS: [Column; 3] = [
    // two-letter train code
    Column {
        x: 0,
        width: 24,
        height: 16,
        y_offset: 0,
        font: FontClass::Large,
        effects: Effects {
            centered: true,
            v_centered: true,
            right_aligned: false,
            scrolling: false,
            inverted: false,
        },
        scroll_on_overflow: false,
    },
    // train name
    Column {
        x: 32,
        width: 130,
        height: 16,
        y_offset: 0,
        font: FontClass::Large,
        effects: Effects {
            v_centered: true,
            centered: false,
            right_aligned: false,
            scrolling: false,
            inverted: false,
        },
        scroll_on_overflow: true,
    },
    // minutes to arrival
    Column {
        x: 260,
        width: 28,
        height: 16,
        y_offset: 0,
        font: FontClass::Large,
        effects: Effects {
            right_aligned: true,
            v_centered: true,
            centered: false,
            scrolling: false,
            inverted: false,
        },
        scroll_on_overflow: false,
    },
];

const SCHEDULE_COLUMNS: [Column; 4] = [
    // track code, inverted badge
    Column {
        x: 0,
        width: 24,
        height: 16,
        y_offset: 0,
        font: FontClass::Medium,
        effects: Effects {
            centered: true,
            v_centered: true,
            inverted: true,
            right_aligned: false,
            scrolling: false,
        },
        scroll_on_overflow: false,
    },
    // room
    Column {
        x: 26,
        width: 68,
        height: 16,
        y_offset: 1,
        font: FontClass::Small,
        effects: Effects::NONE,
        scroll_on_overflow: true,
    },
    // title
    Column {
        x: 96,
        width: 140,
        height: 16,
        y_offset: 3,
        font: FontClass::Medium,
        effects: Effects::NONE,
        scroll_on_overflow: true,
    },
    // starts in
    Column {
        x: 238,
        width: 50,
        height: 16,
        y_offset: 3,
        font: FontClass::Medium,
        effects: Effects {
            right_aligned: true,
            centered: false,
            v_centered: false,
            scrolling: false,
            inverted: false,
        },
        scroll_on_overflow: false,
    },
];

pub fn layout_for(mode: PageMode) -> PageLayout {
    match mode {
        PageMode::Arrivals => PageLayout {
            row_count: 4,
            row_height: 16,
            first_row_y: 0,
            columns: &ARRIVAL_COLUMNS,
            placeholder_font: FontClass::Large,
        },
        PageMode::Schedule => PageLayout {
            row_count: 3,
            row_height: 16,
            first_row_y: 12,
            columns: &SCHEDULE_COLUMNS,
            placeholder_font: FontClass::Large,
        },
    }
}

/// Static header for the schedule page: column labels and a rule.
pub fn schedule_header() -> Result<Vec<DrawCommand>, RenderError> {
    Ok(vec![
        DrawCommand::text(
            "Trck",
            FontClass::Small,
            Rect::new(0, 0, 28, 7),
            Effects::NONE,
        )?,
        DrawCommand::text(
            "Location",
            FontClass::Small,
            Rect::new(26, 0, 70, 7),
            Effects::NONE,
        )?,
        DrawCommand::text(
            "Title",
            FontClass::Small,
            Rect::new(96, 0, 32, 7),
            Effects::NONE,
        )?,
        DrawCommand::text(
            "Starts in",
            FontClass::Small,
            Rect::new(238, 0, 50, 7),
            Effects::NONE.right_aligned(),
        )?,
        DrawCommand::image("line_hor.png", Rect::new(0, 8, PANEL_WIDTH, 1))?,
    ])
}
