/*
 *  tests/cycle_integration.rs
 *
 *  Integration tests for the page cycle controller, run against the
 *  mock panel sink and canned data providers.
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 */

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;

use trackside::cycle::{CycleController, CycleSettings};
use trackside::providers::{
    FetchError, PositionReport, ScheduleProvider, Topology, TrackDataProvider, Waypoint,
};
use trackside::schedule::ScheduleEntry;
use trackside::sink::mock::{MockSink, SinkEvent};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn settings() -> CycleSettings {
    CycleSettings {
        page_interval: std::time::Duration::from_millis(10),
        brightness: 128,
        display_trackmarker: 163.0,
        lookback: Duration::minutes(10),
        max_jump_secs: 30,
        arrival_zone: 20.0,
        max_duration: Duration::hours(2),
        max_ongoing: Duration::minutes(9),
    }
}

struct FakeTrains {
    topology: Topology,
    reports: Vec<PositionReport>,
}

impl FakeTrains {
    fn with_train(reports: Vec<(f64, i64)>) -> Self {
        let mut waypoints = HashMap::new();
        waypoints.insert(
            "loop_end".to_string(),
            Waypoint {
                trackmarker: 1000.0,
            },
        );
        FakeTrains {
            topology: Topology { waypoints },
            reports: reports
                .into_iter()
                .map(|(position, secs)| PositionReport {
                    object_id: "gigi".to_string(),
                    position,
                    observed_at: t(secs),
                })
                .collect(),
        }
    }

    fn empty() -> Self {
        FakeTrains {
            topology: Topology {
                waypoints: HashMap::new(),
            },
            reports: Vec::new(),
        }
    }
}

#[async_trait]
impl TrackDataProvider for FakeTrains {
    async fn get_topology(&self) -> Result<Topology, FetchError> {
        Ok(self.topology.clone())
    }

    async fn get_position_reports(&self) -> Result<Vec<PositionReport>, FetchError> {
        Ok(self.reports.clone())
    }
}

struct FakeSchedule(Vec<ScheduleEntry>);

#[async_trait]
impl ScheduleProvider for FakeSchedule {
    async fn get_all_entries(&self) -> Result<Vec<ScheduleEntry>, FetchError> {
        Ok(self.0.clone())
    }
}

struct FailingSchedule;

#[async_trait]
impl ScheduleProvider for FailingSchedule {
    async fn get_all_entries(&self) -> Result<Vec<ScheduleEntry>, FetchError> {
        Err(FetchError::Malformed("upstream unreachable".to_string()))
    }
}

fn entry(title: &str, start_secs: i64) -> ScheduleEntry {
    ScheduleEntry {
        title: title.to_string(),
        track: "CCC".to_string(),
        room: "Stage".to_string(),
        start: t(start_secs),
        duration: Duration::minutes(45),
    }
}

fn frame_texts(frame: &[SinkEvent]) -> Vec<String> {
    frame
        .iter()
        .filter_map(|e| match e {
            SinkEvent::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn init_clears_panel_and_sets_brightness() {
    let mut controller = CycleController::new(
        MockSink::new(),
        FakeTrains::empty(),
        FakeSchedule(Vec::new()),
        settings(),
    );
    controller.init().await.expect("init");
    assert_eq!(
        controller.sink().events,
        vec![SinkEvent::Clear, SinkEvent::SetBrightness(128)]
    );
}

#[tokio::test]
async fn rotation_renders_arrivals_then_schedule_then_wraps() {
    // train well away from the display, approaching at 2 units/sec
    let trains = FakeTrains::with_train(vec![(400.0, 0), (410.0, 5)]);
    let schedule = FakeSchedule(vec![entry("Opening", 600)]);
    let mut controller = CycleController::new(MockSink::new(), trains, schedule, settings());

    controller.tick(t(5)).await.expect("arrivals tick");
    let arrivals_texts = frame_texts(controller.sink().last_frame());
    assert!(arrivals_texts.contains(&"gigi".to_string()));
    assert!(arrivals_texts.contains(&"GI".to_string()));

    controller.tick(t(25)).await.expect("schedule tick");
    let frame = controller.sink().last_frame();
    let schedule_texts = frame_texts(frame);
    assert!(schedule_texts.contains(&"Opening".to_string()));
    assert!(schedule_texts.contains(&"Trck".to_string()));
    assert!(frame
        .iter()
        .any(|e| matches!(e, SinkEvent::Image { name, .. } if name == "line_hor.png")));

    // wraps back to arrivals
    controller.tick(t(45)).await.expect("wrap tick");
    let wrapped = frame_texts(controller.sink().last_frame());
    assert!(wrapped.contains(&"gigi".to_string()));
}

#[tokio::test]
async fn every_frame_is_scoped_begin_to_end() {
    let trains = FakeTrains::with_train(vec![(400.0, 0), (410.0, 5)]);
    let schedule = FakeSchedule(vec![entry("Opening", 600)]);
    let mut controller = CycleController::new(MockSink::new(), trains, schedule, settings());

    controller.tick(t(5)).await.expect("tick 1");
    controller.tick(t(25)).await.expect("tick 2");

    let begins = controller
        .sink()
        .events
        .iter()
        .filter(|e| **e == SinkEvent::BeginFrame)
        .count();
    let ends = controller
        .sink()
        .events
        .iter()
        .filter(|e| **e == SinkEvent::EndFrame)
        .count();
    assert_eq!(begins, 2);
    assert_eq!(ends, 2);
    assert_eq!(controller.sink().events.last(), Some(&SinkEvent::EndFrame));
}

#[tokio::test]
async fn no_data_renders_single_placeholder() {
    let mut controller = CycleController::new(
        MockSink::new(),
        FakeTrains::empty(),
        FakeSchedule(Vec::new()),
        settings(),
    );
    controller.tick(t(0)).await.expect("tick");
    let frame = controller.sink().last_frame();
    assert_eq!(frame_texts(frame), vec!["No Departures".to_string()]);
}

#[tokio::test]
async fn vanished_train_ages_out_of_the_arrivals_page() {
    // the only reports are twenty minutes old by the second tick
    let trains = FakeTrains::with_train(vec![(400.0, 0), (410.0, 5)]);
    let mut controller = CycleController::new(
        MockSink::new(),
        trains,
        FakeSchedule(Vec::new()),
        settings(),
    );

    controller.tick(t(5)).await.expect("fresh tick");
    assert!(frame_texts(controller.sink().last_frame()).contains(&"gigi".to_string()));

    controller.tick(t(25)).await.expect("schedule tick");
    // back on arrivals, with every sample outside the lookback window
    controller.tick(t(20 * 60)).await.expect("stale tick");
    let frame = frame_texts(controller.sink().last_frame());
    assert_eq!(frame, vec!["No Departures".to_string()]);
}

#[tokio::test]
async fn schedule_fetch_failure_degrades_to_placeholder() {
    let trains = FakeTrains::with_train(vec![(400.0, 0), (410.0, 5)]);
    let mut controller = CycleController::new(MockSink::new(), trains, FailingSchedule, settings());

    controller.tick(t(5)).await.expect("arrivals tick");
    // schedule page: the provider fails, the tick must not
    controller.tick(t(25)).await.expect("schedule tick");
    let frame = controller.sink().last_frame();
    assert_eq!(frame_texts(frame), vec!["No Events".to_string()]);
}

#[tokio::test]
async fn mid_frame_fault_closes_the_queue_before_propagating() {
    let trains = FakeTrains::with_train(vec![(400.0, 0), (410.0, 5)]);
    let schedule = FakeSchedule(Vec::new());
    // fail the second text command of the first frame
    let sink = MockSink::failing_on_text(1);
    let mut controller = CycleController::new(sink, trains, schedule, settings());

    let result = controller.tick(t(5)).await;
    assert!(result.is_err());

    let events = &controller.sink().events;
    let len = events.len();
    // the queue was cleared and closed before the error surfaced
    assert_eq!(events[len - 2], SinkEvent::Clear);
    assert_eq!(events[len - 1], SinkEvent::EndFrame);
}
