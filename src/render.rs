/*
 *  render.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Page renderer: maps one cycle's data set and the active page mode to
 *  an ordered list of draw commands. Overflowing text degrades to a
 *  marquee, never to truncation; an empty data set renders a single
 *  centered placeholder.
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

use chrono::{DateTime, Utc};

use crate::eta::ArrivalEstimate;
use crate::fonts;
use crate::layout::{self, DrawCommand, Effects, PageLayout, Rect, RenderError};
use crate::pages::PageMode;
use crate::schedule::{self, ScheduleEntry};

/// Render the active page from this cycle's data.
pub fn render_page(
    mode: PageMode,
    estimates: &[ArrivalEstimate],
    entries: &[ScheduleEntry],
    now: DateTime<Utc>,
) -> Result<Vec<DrawCommand>, RenderError> {
    match mode {
        PageMode::Arrivals => render_arrivals(estimates, now),
        PageMode::Schedule => render_schedule(entries, now),
    }
}

pub fn render_arrivals(
    estimates: &[ArrivalEstimate],
    now: DateTime<Utc>,
) -> Result<Vec<DrawCommand>, RenderError> {
    let layout = layout::layout_for(PageMode::Arrivals);
    if estimates.is_empty() {
        return placeholder("No Departures", &layout);
    }

    // Soonest first; trains without a computable ETA sort to the end.
    let mut ordered: Vec<&ArrivalEstimate> = estimates.iter().collect();
    ordered.sort_by_key(|e| e.eta.unwrap_or(DateTime::<Utc>::MAX_UTC));

    let mut rows = Vec::new();
    for estimate in ordered.iter().take(layout.row_count) {
        let eta_text = match estimate.eta {
            Some(eta) => {
                let secs = (eta - now).num_seconds().max(0);
                ((secs + 30) / 60).to_string()
            }
            None => "???".to_string(),
        };
        let code: String = estimate.object_id.chars().take(2).collect();
        rows.push(vec![
            code.to_uppercase(),
            estimate.object_id.clone(),
            eta_text,
        ]);
    }

    let mut commands = Vec::new();
    emit_rows(&layout, &rows, &mut commands)?;
    Ok(commands)
}

pub fn render_schedule(
    entries: &[ScheduleEntry],
    now: DateTime<Utc>,
) -> Result<Vec<DrawCommand>, RenderError> {
    let layout = layout::layout_for(PageMode::Schedule);
    if entries.is_empty() {
        return placeholder("No Events", &layout);
    }

    let mut commands = layout::schedule_header()?;

    let mut rows = Vec::new();
    for entry in entries.iter().take(layout.row_count) {
        let seconds = (entry.start - now).num_seconds();
        rows.push(vec![
            schedule::track_code(&entry.track),
            schedule::room_label(&entry.room),
            entry.title.clone(),
            schedule::format_time_until(seconds),
        ]);
    }

    emit_rows(&layout, &rows, &mut commands)?;
    Ok(commands)
}

/// Emit one text command per cell, row by row, applying the scroll
/// effect wherever the measured text is wider than its column.
fn emit_rows(
    layout: &PageLayout,
    rows: &[Vec<String>],
    out: &mut Vec<DrawCommand>,
) -> Result<(), RenderError> {
    for (row, cells) in rows.iter().take(layout.row_count).enumerate() {
        let y = layout.first_row_y + row as u32 * layout.row_height;
        for (column, text) in layout.columns.iter().zip(cells) {
            let mut effects = column.effects;
            if column.scroll_on_overflow && fonts::text_width(text, column.font) > column.width {
                effects.scrolling = true;
            }
            let rect = Rect::new(column.x, y + column.y_offset, column.width, column.height);
            out.push(DrawCommand::text(text.clone(), column.font, rect, effects)?);
        }
    }
    Ok(())
}

fn placeholder(text: &str, layout: &PageLayout) -> Result<Vec<DrawCommand>, RenderError> {
    Ok(vec![DrawCommand::text(
        text,
        layout.placeholder_font,
        Rect::full_panel(),
        Effects::NONE.centered().v_centered(),
    )?])
}
