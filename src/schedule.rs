/*
 *  schedule.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Filtering and presentation helpers for the conference program feed:
 *  drop placeholder all-day blocks, keep upcoming or freshly started
 *  events, and format the "starts in" column.
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

use chrono::{DateTime, Duration, Utc};

/// One program entry, an immutable snapshot from one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub title: String,
    pub track: String,
    pub room: String,
    pub start: DateTime<Utc>,
    pub duration: Duration,
}

/// Predicates applied to the raw feed before display.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleFilter {
    /// Entries longer than this are placeholder blocks, not talks.
    pub max_duration: Duration,
    /// Grace window: an event that started less than this ago still
    /// counts as "ongoing" and stays listed.
    pub max_ongoing: Duration,
}

impl ScheduleFilter {
    /// Apply both predicates and return the working set sorted ascending
    /// by start time. Idempotent; the caller slices to page capacity.
    pub fn apply(&self, mut entries: Vec<ScheduleEntry>, now: DateTime<Utc>) -> Vec<ScheduleEntry> {
        entries.retain(|e| e.duration <= self.max_duration);
        entries.retain(|e| e.start >= now - self.max_ongoing);
        entries.sort_by_key(|e| e.start);
        entries
    }
}

/// Format seconds-until-start for the "starts in" column.
///
/// Rounded to the nearest minute; whole hours only once we are ten or
/// more hours out. Minute rounding carries into the hour field, so
/// 3599 s reads "1h0m" rather than "60m".
pub fn format_time_until(seconds: i64) -> String {
    if seconds < 0 {
        return format!("{}m ago", round_to_minutes(-seconds));
    }
    if seconds >= 36_000 {
        return format!("{}h", seconds / 3600);
    }
    let minutes = round_to_minutes(seconds);
    if minutes >= 60 {
        format!("{}h{}m", minutes / 60, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}

fn round_to_minutes(seconds: i64) -> i64 {
    (seconds + 30) / 60
}

/// Two-letter column code for a known track, else the uppercased first
/// two characters.
pub fn track_code(track: &str) -> String {
    let known = match track {
        "Digitalcourage" => "DC",
        "Live Music" => "LM",
        "Bits & Bäume" => "BB",
        "DJ Set" => "DJ",
        "CCC" => "C",
        "Nerds der OberRheinischen Tiefebene und der xHain (N\\:O:R:T:x)" => "NX",
        "Entertainment" => "E",
        "Performance" => "P",
        "Milliways" => "MW",
        _ => "",
    };
    if !known.is_empty() {
        return known.to_string();
    }
    track.chars().take(2).collect::<String>().to_uppercase()
}

/// Room names that will not fit the location column get a fixed
/// abbreviation.
pub fn room_label(room: &str) -> String {
    match room {
        "Digitalcourage" => "Dig.courage",
        "Bits & Bäume" => "Bits+Bäume",
        "Hardware Hacking Village" => "HW Hck Vlg",
        "Milliways Workshop Dome" => "MW Dome",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn entry(title: &str, start_secs: i64, duration_mins: i64) -> ScheduleEntry {
        ScheduleEntry {
            title: title.to_string(),
            track: "CCC".to_string(),
            room: "Stage".to_string(),
            start: t(start_secs),
            duration: Duration::minutes(duration_mins),
        }
    }

    fn filter() -> ScheduleFilter {
        ScheduleFilter {
            max_duration: Duration::hours(2),
            max_ongoing: Duration::minutes(9),
        }
    }

    #[test]
    fn drops_overlong_entries() {
        let now = t(0);
        let entries = vec![entry("talk", 600, 45), entry("all day", 600, 10 * 60)];
        let kept = filter().apply(entries, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "talk");
    }

    #[test]
    fn filtering_is_idempotent() {
        let now = t(0);
        let entries = vec![
            entry("a", 600, 45),
            entry("stale", -3600, 45),
            entry("b", 1200, 200),
        ];
        let once = filter().apply(entries, now);
        let twice = filter().apply(once.clone(), now);
        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_ongoing_within_grace_window() {
        let now = t(0);
        let entries = vec![
            entry("just started", -5 * 60, 45),
            entry("long gone", -30 * 60, 45),
            entry("upcoming", 600, 45),
        ];
        let kept = filter().apply(entries, now);
        let titles: Vec<&str> = kept.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["just started", "upcoming"]);
    }

    #[test]
    fn sorted_non_decreasing_by_start() {
        let now = t(0);
        let entries = vec![
            entry("c", 1800, 45),
            entry("a", 300, 45),
            entry("b", 300, 30),
            entry("d", 900, 45),
        ];
        let kept = filter().apply(entries, now);
        for pair in kept.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
        // sort is stable: equal starts keep feed order
        assert_eq!(kept[0].title, "a");
        assert_eq!(kept[1].title, "b");
    }

    #[test]
    fn time_until_formatting() {
        assert_eq!(format_time_until(-120), "2m ago");
        assert_eq!(format_time_until(90), "2m");
        assert_eq!(format_time_until(5400), "1h30m");
        assert_eq!(format_time_until(40000), "11h");
        // boundaries
        assert_eq!(format_time_until(0), "0m");
        assert_eq!(format_time_until(3599), "1h0m");
        assert_eq!(format_time_until(3600), "1h0m");
        assert_eq!(format_time_until(35999), "10h0m");
        assert_eq!(format_time_until(36000), "10h");
    }

    #[test]
    fn track_codes_and_room_labels() {
        assert_eq!(track_code("Digitalcourage"), "DC");
        assert_eq!(track_code("Milliways"), "MW");
        assert_eq!(track_code("workshops"), "WO");
        assert_eq!(room_label("Hardware Hacking Village"), "HW Hck Vlg");
        assert_eq!(room_label("Stage"), "Stage");
    }
}
