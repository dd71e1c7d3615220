use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, StartCause, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::assets::{load_assets, AssetError};
use crate::storage::SaveStore;
use crate::{resolve_app_paths, StartupError};

use super::frame::StepMode;
use super::input::InputCollector;
use super::perf::LoopRateAccumulator;
use super::rendering::{compose_frame, Renderer, Surface};
use super::shell::{Shell, ShellOptions};
use super::simulation::Simulation;

pub const STEP_MODE_ENV_VAR: &str = "IRONWORKS_STEP_MODE";

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);
const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(100);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub tick_interval: Duration,
    pub step_mode: StepMode,
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    pub perf_overlay: bool,
    /// Simulated time between automatic saves.
    pub autosave_interval: Duration,
    pub save_key: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Ironworks".to_string(),
            window_width: 1280,
            window_height: 720,
            tick_interval: DEFAULT_TICK_INTERVAL,
            step_mode: StepMode::Fixed(DEFAULT_TICK_INTERVAL),
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            metrics_log_interval: Duration::from_secs(1),
            perf_overlay: false,
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            save_key: "ironworks".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load images: {0}")]
    Assets(#[from] AssetError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Loads every image, builds the engine from them, restores the last save and runs the
/// window until it closes.
pub fn run_app<S, F>(config: LoopConfig, build: F) -> Result<(), AppError>
where
    S: Simulation + 'static,
    F: FnOnce(Arc<crate::assets::AssetBundle>) -> S,
{
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        image_dir = %app_paths.image_dir.display(),
        save_dir = %app_paths.save_dir.display(),
        "startup"
    );
    let assets = Arc::new(load_assets(&app_paths.image_dir)?);
    info!(image_count = assets.len(), "assets_loaded");

    let mut sim = build(Arc::clone(&assets));
    let save_store = SaveStore::new(&app_paths.save_dir, &config.save_key);
    restore_save(&mut sim, &save_store);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    let (width, height) = renderer.size();

    let tick_interval = normalize_non_zero_duration(config.tick_interval, DEFAULT_TICK_INTERVAL);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, DEFAULT_MAX_FRAME_DELTA);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let autosave_interval =
        normalize_non_zero_duration(config.autosave_interval, DEFAULT_AUTOSAVE_INTERVAL);
    let step_mode = resolve_step_mode(config.step_mode, tick_interval, max_frame_delta);
    info!(
        tick_interval_ms = tick_interval.as_millis() as u64,
        step_mode = ?step_mode,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        autosave_interval_s = autosave_interval.as_secs(),
        "loop_config"
    );

    let mut shell = Shell::new(
        sim,
        ShellOptions {
            width: width.max(1),
            height: height.max(1),
            step_mode,
            perf_overlay: config.perf_overlay,
        },
    );
    let mut input = InputCollector::new();
    let mut frame = Surface::new(width.max(1), height.max(1));
    let mut loop_rate = LoopRateAccumulator::new(metrics_log_interval);
    let mut autosave = AutosaveClock::new(autosave_interval);
    let mut last_tick = Instant::now();
    let mut next_tick = last_tick + tick_interval;

    event_loop
        .run(move |event, window_target| match event {
            Event::NewEvents(StartCause::Init) => {
                window_target.set_control_flow(ControlFlow::WaitUntil(next_tick));
            }
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                let now = Instant::now();
                let elapsed =
                    clamp_frame_delta(now.saturating_duration_since(last_tick), max_frame_delta);
                last_tick = now;

                let started = Instant::now();
                let report = shell.tick(elapsed);
                loop_rate.record_tick(started.elapsed());

                if let Some(advanced) = report.advanced {
                    if autosave.advance(advanced) {
                        write_save(shell.simulation(), &save_store);
                    }
                }
                if let Some(snapshot) = loop_rate.maybe_snapshot(now) {
                    shell.record_loop_rate(snapshot);
                    info!(
                        tps = snapshot.tps,
                        frame_time_ms = snapshot.frame_time_ms,
                        run_state = ?shell.run_state(),
                        popups = shell.popups().len(),
                        "loop_metrics"
                    );
                }

                next_tick = next_tick_after(next_tick, now, tick_interval);
                window_target.set_control_flow(ControlFlow::WaitUntil(next_tick));
                window.request_redraw();
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    shell.resize(new_size.width.max(1), new_size.height.max(1));
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    shell.resize(size.width.max(1), size.height.max(1));
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    compose_frame(&shell, Some(assets.as_ref()), &mut frame);
                    if let Err(error) = renderer.present(&frame) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                }
                other => {
                    if let Some(input_event) = input.translate(&other) {
                        shell.handle_input(input_event);
                    }
                    if shell.take_save_request() {
                        write_save(shell.simulation(), &save_store);
                    }
                    if shell.exit_requested() {
                        window_target.exit();
                    }
                }
            },
            Event::LoopExiting => {
                write_save(shell.simulation(), &save_store);
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Counts simulated time and fires once per `interval`.
#[derive(Debug)]
struct AutosaveClock {
    interval: Duration,
    accumulated: Duration,
}

impl AutosaveClock {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    fn advance(&mut self, simulated: Duration) -> bool {
        self.accumulated = self.accumulated.saturating_add(simulated);
        if self.accumulated < self.interval {
            return false;
        }
        self.accumulated = self.accumulated.saturating_sub(self.interval);
        true
    }
}

fn restore_save<S: Simulation + ?Sized>(sim: &mut S, store: &SaveStore) {
    match store.load() {
        Ok(Some(blob)) => {
            if sim.deserialize(&blob) {
                info!(path = %store.path().display(), bytes = blob.len(), "save_loaded");
            } else {
                warn!(path = %store.path().display(), "save_rejected");
            }
        }
        Ok(None) => debug!(path = %store.path().display(), "save_not_found"),
        Err(error) => warn!(error = %error, "save_read_failed"),
    }
}

fn write_save<S: Simulation + ?Sized>(sim: &S, store: &SaveStore) {
    let Some(blob) = sim.serialize() else {
        debug!("save_skipped");
        return;
    };
    match store.save(&blob) {
        Ok(()) => info!(path = %store.path().display(), bytes = blob.len(), "save_written"),
        Err(error) => warn!(error = %error, "save_write_failed"),
    }
}

/// Next deadline on the fixed grid, or one interval from `now` when the loop fell behind.
fn next_tick_after(previous: Instant, now: Instant, interval: Duration) -> Instant {
    let next = previous + interval;
    if next <= now {
        now + interval
    } else {
        next
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_step_mode(
    configured: StepMode,
    tick_interval: Duration,
    max_frame_delta: Duration,
) -> StepMode {
    let configured = normalize_step_mode(configured, tick_interval, max_frame_delta);
    match env::var(STEP_MODE_ENV_VAR) {
        Ok(value) => match StepMode::parse(&value, tick_interval, max_frame_delta) {
            Some(mode) => mode,
            None => {
                warn!(
                    env_var = STEP_MODE_ENV_VAR,
                    value = value.as_str(),
                    "invalid step-mode env var value; falling back to config"
                );
                configured
            }
        },
        Err(env::VarError::NotPresent) => configured,
        Err(err) => {
            warn!(
                env_var = STEP_MODE_ENV_VAR,
                error = %err,
                "unable to read step-mode env var; falling back to config"
            );
            configured
        }
    }
}

fn normalize_step_mode(
    mode: StepMode,
    tick_interval: Duration,
    max_frame_delta: Duration,
) -> StepMode {
    match mode {
        StepMode::Fixed(step) => StepMode::Fixed(normalize_non_zero_duration(step, tick_interval)),
        StepMode::Variable { max_delta } => StepMode::Variable {
            max_delta: normalize_non_zero_duration(max_delta, max_frame_delta),
        },
    }
}
