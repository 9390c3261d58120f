/*
 *  tests/refresh_cycle.rs
 *
 *  Integration tests for the refresh cycle and the input loop
 *
 *  ContribMon - GitHub contribution calendar for RGB LED matrices
 *  (c) 2026 the ContribMon authors
 */

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contribmon::calendar::GraphQlResponse;
use contribmon::config::{GithubSettings, Settings};
use contribmon::display::drivers::mock::MockDriverState;
use contribmon::display::{MatrixCapabilities, MockDriver, RenderMode};
use contribmon::input::{Button, LatchedInput, NoInput};
use contribmon::pacer::RefreshSchedule;
use contribmon::{CalendarSource, ContribMatrix, CycleError, MatrixError, SourceError};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use tokio::time::Instant;

/// Serves canned responses in order, then repeats the last good one
struct StubSource {
    queue: VecDeque<Result<GraphQlResponse, SourceError>>,
    last: Option<GraphQlResponse>,
    fetches: Arc<AtomicUsize>,
}

impl StubSource {
    fn new() -> Self {
        Self { queue: VecDeque::new(), last: None, fetches: Arc::new(AtomicUsize::new(0)) }
    }

    fn then(mut self, weeks: &[&[(u32, &str)]]) -> Self {
        self.queue.push_back(Ok(response(weeks)));
        self
    }

    fn then_fail(mut self) -> Self {
        self.queue.push_back(Err(SourceError::GraphQl("rate limited".to_string())));
        self
    }
}

impl CalendarSource for StubSource {
    async fn fetch(&mut self) -> Result<GraphQlResponse, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.queue.pop_front() {
            Some(Ok(r)) => {
                self.last = Some(r.clone());
                Ok(r)
            }
            Some(Err(e)) => Err(e),
            None => self.last.clone().ok_or_else(|| SourceError::GraphQl("no data".to_string())),
        }
    }
}

fn response(weeks: &[&[(u32, &str)]]) -> GraphQlResponse {
    let weeks: Vec<serde_json::Value> = weeks
        .iter()
        .enumerate()
        .map(|(w, days)| {
            let days: Vec<serde_json::Value> = days
                .iter()
                .enumerate()
                .map(|(d, (count, color))| serde_json::json!({
                    "color": format!("#{}", color),
                    "contributionCount": count,
                    "date": format!("2026-W{:02}-{}", w, d),
                }))
                .collect();
            serde_json::json!({ "contributionDays": days })
        })
        .collect();

    let body = serde_json::json!({
        "data": { "user": { "contributionsCollection": { "contributionCalendar": { "weeks": weeks } } } }
    });
    serde_json::from_value(body).unwrap()
}

fn settings() -> Settings {
    Settings {
        github: GithubSettings { username: "octocat".to_string(), ..GithubSettings::default() },
        ..Settings::default()
    }
}

fn matrix(source: StubSource, settings: Settings) -> (ContribMatrix<StubSource>, Arc<Mutex<MockDriverState>>) {
    let driver = MockDriver::new(53, 11);
    let state = driver.state();
    let m = ContribMatrix::new(settings, source, Box::new(driver), Box::new(NoInput)).unwrap();
    (m, state)
}

fn presents(state: &Arc<Mutex<MockDriverState>>) -> usize {
    state.lock().unwrap().present_count
}

fn pixel(state: &Arc<Mutex<MockDriverState>>, x: usize, y: usize) -> Rgb888 {
    state.lock().unwrap().last_frame[y * 53 + x]
}

#[tokio::test(start_paused = true)]
async fn test_new_activity_end_to_end() {
    let source = StubSource::new()
        .then(&[&[(0, "ebedf0")], &[(1, "9be9a8")]])
        .then(&[&[(0, "ebedf0")], &[(3, "2da44e")]]);
    let (mut m, state) = matrix(source, settings());

    let first = m.refresh().await.unwrap();
    assert!(!first.new_activity);
    assert_eq!(m.tracker().last_known(), Some(1));
    assert_eq!(presents(&state), 1);

    let second = m.refresh().await.unwrap();
    assert!(second.new_activity);
    assert_eq!(second.stats.max_count, 3);
    assert_eq!(second.stats.min_count, 0);
    assert_eq!(second.alert_blinks, 6);
    // grid, 6 x (banner + blank), grid again
    assert_eq!(presents(&state), 1 + 1 + 12 + 1);

    assert_eq!(pixel(&state, 0, 2), Rgb888::BLACK);
    assert_eq!(pixel(&state, 1, 2), Rgb888::new(14, 96, 14));
    assert_eq!(pixel(&state, 5, 0), Rgb888::BLACK);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_keeps_previous_frame() {
    let source = StubSource::new()
        .then(&[&[(2, "40c463"), (4, "30a14e")]])
        .then_fail();
    let (mut m, state) = matrix(source, settings());

    m.refresh().await.unwrap();
    let frame_before = state.lock().unwrap().last_frame.clone();
    let grid_before = m.grid().cloned();

    let err = m.refresh().await.unwrap_err();
    assert!(matches!(err, CycleError::Source(_)));
    assert_eq!(presents(&state), 1);
    assert_eq!(state.lock().unwrap().last_frame, frame_before);
    assert_eq!(m.grid().cloned(), grid_before);
    assert_eq!(m.tracker().last_known(), Some(4));
}

#[tokio::test(start_paused = true)]
async fn test_malformed_color_aborts_before_tracking() {
    let source = StubSource::new()
        .then(&[&[(1, "40c463")]])
        .then(&[&[(9, "zz0000")]]);
    let (mut m, state) = matrix(source, settings());

    m.refresh().await.unwrap();
    let err = m.refresh().await.unwrap_err();
    assert!(matches!(err, CycleError::Matrix(MatrixError::Format(_))));
    // no alert for a count we never showed
    assert_eq!(m.tracker().last_known(), Some(1));
    assert_eq!(presents(&state), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_calendar_is_a_data_error() {
    let source = StubSource::new().then(&[]);
    let (mut m, state) = matrix(source, settings());

    let err = m.refresh().await.unwrap_err();
    assert!(matches!(err, CycleError::Matrix(MatrixError::Data(_))));
    assert!(m.grid().is_none());
    assert_eq!(presents(&state), 0);
}

#[tokio::test(start_paused = true)]
async fn test_set_mode_redraws_once_per_change() {
    let source = StubSource::new().then(&[&[(1, "000000"), (1, "000000")]]);
    let (mut m, state) = matrix(source, settings());
    let gradient = RenderMode::Gradient(vec![Rgb888::RED, Rgb888::BLUE]);

    // nothing loaded: mode still switches, nothing drawn
    assert!(m.set_mode(gradient.clone()).unwrap());
    assert_eq!(presents(&state), 0);
    assert!(m.set_mode(RenderMode::FlatColor).unwrap());

    m.refresh().await.unwrap();
    assert_eq!(presents(&state), 1);
    assert_eq!(pixel(&state, 0, 2), Rgb888::new(30, 200, 30));

    assert!(!m.set_mode(RenderMode::FlatColor).unwrap());
    assert_eq!(presents(&state), 1);

    assert!(m.set_mode(gradient.clone()).unwrap());
    assert_eq!(presents(&state), 2);
    assert_ne!(pixel(&state, 0, 2), Rgb888::new(30, 200, 30));

    assert!(!m.set_mode(gradient).unwrap());
    assert_eq!(presents(&state), 2);
}

#[tokio::test(start_paused = true)]
async fn test_buttons_drive_modes_and_levels() {
    let source = StubSource::new().then(&[&[(1, "000000")]]);
    let driver = MockDriver::new(53, 11);
    let state = driver.state();
    let buttons = LatchedInput::new();
    let mut m = ContribMatrix::new(settings(), source, Box::new(driver), Box::new(buttons.handle())).unwrap();
    let mut schedule = RefreshSchedule::new(Duration::from_secs(30), Instant::now());

    // startup cycle
    m.step(&mut schedule).await;
    assert_eq!(presents(&state), 1);

    buttons.latch(Button::B);
    buttons.latch(Button::BrightnessUp);
    buttons.latch(Button::VolumeDown);
    m.step(&mut schedule).await;

    assert_eq!(m.mode(), &RenderMode::Gradient(settings().render.gradient_b));
    assert_eq!(presents(&state), 2);
    assert!((m.brightness() - 0.51).abs() < 1e-6);
    assert!((m.volume() - 0.4).abs() < 1e-6);
    assert_eq!(state.lock().unwrap().last_brightness, Some(m.brightness()));

    buttons.latch(Button::C);
    m.step(&mut schedule).await;
    assert_eq!(m.mode(), &RenderMode::Gradient(settings().render.gradient_c));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_gesture_resets_and_refetches() {
    let source = StubSource::new()
        .then(&[&[(1, "40c463")]])
        .then(&[&[(5, "216e39")]]);
    let fetches = Arc::clone(&source.fetches);
    let driver = MockDriver::new(53, 11);
    let buttons = LatchedInput::new();
    let mut m = ContribMatrix::new(settings(), source, Box::new(driver), Box::new(buttons.handle())).unwrap();
    let mut schedule = RefreshSchedule::new(Duration::from_secs(30), Instant::now());

    m.step(&mut schedule).await;
    m.set_mode(RenderMode::Gradient(vec![Rgb888::RED, Rgb888::GREEN])).unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    buttons.latch(Button::D);
    m.step(&mut schedule).await;
    buttons.latch(Button::C);
    m.step(&mut schedule).await;

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(m.mode(), &RenderMode::FlatColor);
    // history was dropped, so 1 -> 5 is a first observation, not an alert
    assert_eq!(m.tracker().last_known(), Some(5));
    assert_eq!(m.stats().max_count, 5);
}

#[tokio::test(start_paused = true)]
async fn test_failed_manual_refresh_keeps_state() {
    let source = StubSource::new()
        .then(&[&[(1, "000000"), (2, "40c463")]])
        .then_fail();
    let driver = MockDriver::new(53, 11);
    let state = driver.state();
    let buttons = LatchedInput::new();
    let mut m = ContribMatrix::new(settings(), source, Box::new(driver), Box::new(buttons.handle())).unwrap();
    let mut schedule = RefreshSchedule::new(Duration::from_secs(30), Instant::now());

    m.step(&mut schedule).await;
    buttons.latch(Button::B);
    m.step(&mut schedule).await;
    let gradient = RenderMode::Gradient(settings().render.gradient_b);
    assert_eq!(m.mode(), &gradient);
    let shown = state.lock().unwrap().last_frame.clone();
    let grid = m.grid().cloned();

    buttons.latch(Button::D);
    buttons.latch(Button::C);
    m.step(&mut schedule).await;

    assert_eq!(m.mode(), &gradient);
    assert!(m.grid().is_some());
    assert_eq!(m.grid().cloned(), grid);
    assert_eq!(m.tracker().last_known(), Some(2));
    assert_eq!(m.stats().max_count, 2);
    assert_eq!(state.lock().unwrap().last_frame, shown);
    assert_eq!(presents(&state), 2);

    // the mode still matches the screen, so A redraws in flat color
    buttons.latch(Button::A);
    m.step(&mut schedule).await;
    assert_eq!(m.mode(), &RenderMode::FlatColor);
    assert_eq!(presents(&state), 3);
    assert_eq!(pixel(&state, 0, 2), Rgb888::new(30, 200, 30));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_frame_keeps_tracker_for_next_cycle() {
    let source = StubSource::new()
        .then(&[&[(1, "40c463")]])
        .then(&[&[(3, "216e39")]]);
    let (mut m, state) = matrix(source, settings());

    m.refresh().await.unwrap();
    let canvas = m.canvas().clone();
    let grid = m.grid().cloned();

    state.lock().unwrap().simulate_present_failure = true;
    let err = m.refresh().await.unwrap_err();
    assert!(matches!(err, CycleError::Display(_)));
    assert_eq!(m.tracker().last_known(), Some(1));
    assert_eq!(m.grid().cloned(), grid);
    assert_eq!(m.canvas(), &canvas);

    // the matrix recovers and the 1 -> 3 increase is still announced
    state.lock().unwrap().simulate_present_failure = false;
    let report = m.refresh().await.unwrap();
    assert!(report.new_activity);
    assert_eq!(report.alert_blinks, 6);
    assert_eq!(m.tracker().last_known(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_manual_refresh_rejected_frame_resets_nothing() {
    let source = StubSource::new()
        .then(&[&[(1, "40c463")]])
        .then(&[&[(4, "216e39")]]);
    let (mut m, state) = matrix(source, settings());

    m.refresh().await.unwrap();
    let gradient = RenderMode::Gradient(vec![Rgb888::RED, Rgb888::BLUE]);
    m.set_mode(gradient.clone()).unwrap();

    state.lock().unwrap().simulate_present_failure = true;
    assert!(m.manual_refresh().await.is_err());
    assert_eq!(m.mode(), &gradient);
    assert_eq!(m.tracker().last_known(), Some(1));
    assert_eq!(m.grid().and_then(|g| g.latest_day()).map(|d| d.count), Some(1));

    state.lock().unwrap().simulate_present_failure = false;
    let report = m.manual_refresh().await.unwrap();
    assert_eq!(m.mode(), &RenderMode::FlatColor);
    // history dropped by the reset: a first observation, no alert
    assert!(!report.new_activity);
    assert_eq!(m.tracker().last_known(), Some(4));
}

#[tokio::test(start_paused = true)]
async fn test_speakerless_matrix_ignores_volume() {
    let source = StubSource::new().then(&[&[(1, "000000")]]);
    let caps = MatrixCapabilities { supports_volume: false, ..MatrixCapabilities::galactic(53, 11) };
    let driver = MockDriver::with_capabilities(caps);
    let state = driver.state();
    let buttons = LatchedInput::new();
    let mut m = ContribMatrix::new(settings(), source, Box::new(driver), Box::new(buttons.handle())).unwrap();
    let mut schedule = RefreshSchedule::new(Duration::from_secs(30), Instant::now());

    assert_eq!(state.lock().unwrap().last_volume, None);
    assert_eq!(state.lock().unwrap().last_brightness, Some(0.5));

    m.step(&mut schedule).await;
    buttons.latch(Button::VolumeUp);
    buttons.latch(Button::BrightnessDown);
    m.step(&mut schedule).await;

    assert_eq!(m.volume(), 0.5);
    assert_eq!(state.lock().unwrap().last_volume, None);
    assert!((m.brightness() - 0.49).abs() < 1e-6);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_gesture_can_keep_activity() {
    let source = StubSource::new()
        .then(&[&[(1, "40c463")]])
        .then(&[&[(5, "216e39")]]);
    let settings = Settings { keep_activity_on_reset: true, ..settings() };
    let driver = MockDriver::new(53, 11);
    let state = driver.state();
    let buttons = LatchedInput::new();
    let mut m = ContribMatrix::new(settings, source, Box::new(driver), Box::new(buttons.handle())).unwrap();
    let mut schedule = RefreshSchedule::new(Duration::from_secs(30), Instant::now());

    m.step(&mut schedule).await;
    buttons.latch(Button::C);
    buttons.latch(Button::D);
    m.step(&mut schedule).await;

    // startup, then grid + 12 alert frames + grid
    assert_eq!(presents(&state), 1 + 14);
    assert_eq!(m.tracker().last_known(), Some(5));
}

#[tokio::test(start_paused = true)]
async fn test_loop_ticks_on_interval_until_shutdown() {
    let source = StubSource::new().then(&[&[(1, "40c463")]]);
    let fetches = Arc::clone(&source.fetches);
    let (mut m, _state) = matrix(source, settings());

    m.run_until(tokio::time::sleep(Duration::from_secs(65))).await;

    // startup, 30s, 60s
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_loop_survives_failed_cycles() {
    let source = StubSource::new().then_fail().then(&[&[(2, "40c463")]]);
    let fetches = Arc::clone(&source.fetches);
    let (mut m, state) = matrix(source, settings());

    m.run_until(tokio::time::sleep(Duration::from_secs(35))).await;

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(presents(&state), 1);
    assert_eq!(m.tracker().last_known(), Some(2));
}
