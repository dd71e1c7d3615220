use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::layout::{minimap_viewport_rect, Vec2, MINIMAP_SIZE};
use super::perf::{LoopRateSnapshot, StageTimings};
use super::rendering::Surface;
use super::shell::{Shell, ShellOptions};
use super::simulation::{SimEvent, Simulation};
use super::tools::{draw_overlay, OverlayData};

const DEFAULT_FIXED_STEP: Duration = Duration::from_millis(50);
const MINIMAP_VIEWPORT_COLOR: [u8; 4] = [255, 255, 255, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Paused,
}

impl RunState {
    pub fn toggled(self) -> Self {
        match self {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        }
    }
}

/// How much simulated time one tick advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Fixed(Duration),
    /// Real elapsed time, capped at `max_delta`.
    Variable { max_delta: Duration },
}

impl Default for StepMode {
    fn default() -> Self {
        StepMode::Fixed(DEFAULT_FIXED_STEP)
    }
}

impl StepMode {
    pub fn delta(self, elapsed: Duration) -> Duration {
        match self {
            StepMode::Fixed(step) => step,
            StepMode::Variable { max_delta } => elapsed.min(max_delta),
        }
    }

    /// Parses `fixed` or `variable`, case-insensitively.
    pub fn parse(value: &str, fixed_step: Duration, max_delta: Duration) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(StepMode::Fixed(fixed_step)),
            "variable" => Some(StepMode::Variable { max_delta }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStage {
    Advance,
    Dispatch,
    World,
    Minimap,
    Popups,
    PerfOverlay,
}

impl FrameStage {
    pub const COUNT: usize = 6;
    pub const ALL: [FrameStage; FrameStage::COUNT] = [
        FrameStage::Advance,
        FrameStage::Dispatch,
        FrameStage::World,
        FrameStage::Minimap,
        FrameStage::Popups,
        FrameStage::PerfOverlay,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn short_label(self) -> &'static str {
        match self {
            FrameStage::Advance => "ADV",
            FrameStage::Dispatch => "DSP",
            FrameStage::World => "WLD",
            FrameStage::Minimap => "MAP",
            FrameStage::Popups => "POP",
            FrameStage::PerfOverlay => "PRF",
        }
    }
}

/// Which pipeline stages run on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSet {
    bits: u8,
}

impl Default for StageSet {
    fn default() -> Self {
        Self::all()
    }
}

impl StageSet {
    pub const fn all() -> Self {
        Self {
            bits: (1 << FrameStage::COUNT) - 1,
        }
    }

    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Advance and dispatch only; nothing is drawn.
    pub fn headless() -> Self {
        Self::empty()
            .with(FrameStage::Advance)
            .with(FrameStage::Dispatch)
    }

    pub fn with(mut self, stage: FrameStage) -> Self {
        self.set(stage, true);
        self
    }

    pub fn set(&mut self, stage: FrameStage, enabled: bool) {
        let bit = 1 << stage.index();
        if enabled {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
    }

    pub fn contains(self, stage: FrameStage) -> bool {
        self.bits & (1 << stage.index()) != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Simulated time handed to the engine, `None` when nothing advanced.
    pub advanced: Option<Duration>,
    pub events_dispatched: usize,
    pub stages_run: Vec<FrameStage>,
}

#[derive(Debug)]
pub(crate) struct FrameSurfaces {
    pub world: Surface,
    pub minimap: Surface,
    pub perf: Surface,
}

#[derive(Debug)]
pub(crate) struct FramePipeline {
    pub run_state: RunState,
    pub step_mode: StepMode,
    pub stages: StageSet,
    pub perf_overlay: bool,
    pub timings: StageTimings,
    pub loop_rate: LoopRateSnapshot,
    pub surfaces: FrameSurfaces,
}

impl FramePipeline {
    pub(crate) fn new(options: ShellOptions) -> Self {
        Self {
            run_state: RunState::Running,
            step_mode: options.step_mode,
            stages: StageSet::all(),
            perf_overlay: options.perf_overlay,
            timings: StageTimings::default(),
            loop_rate: LoopRateSnapshot::default(),
            surfaces: FrameSurfaces {
                world: Surface::new(options.width.max(1), options.height.max(1)),
                minimap: Surface::new(MINIMAP_SIZE, MINIMAP_SIZE),
                perf: Surface::new(1, 1),
            },
        }
    }
}

impl<S: Simulation> Shell<S> {
    /// Runs one pass of the frame pipeline. `elapsed` is the real time since the last tick
    /// and only matters in variable step mode.
    pub fn tick(&mut self, elapsed: Duration) -> FrameReport {
        let mut report = FrameReport::default();
        let stages = self.frame.stages;

        let mut events = Vec::new();
        if stages.contains(FrameStage::Advance) && self.frame.run_state == RunState::Running {
            let started = Instant::now();
            let delta = self.frame.step_mode.delta(elapsed);
            events = self.sim.simulate(delta.as_secs_f64());
            self.finish_stage(&mut report, FrameStage::Advance, started);
            report.advanced = Some(delta);
        }

        if stages.contains(FrameStage::Dispatch) {
            let started = Instant::now();
            report.events_dispatched = events.len();
            for event in events {
                self.dispatch_event(event);
            }
            self.finish_stage(&mut report, FrameStage::Dispatch, started);
        }

        if stages.contains(FrameStage::World) {
            let started = Instant::now();
            self.sim.render_world(&mut self.frame.surfaces.world);
            self.finish_stage(&mut report, FrameStage::World, started);
        }

        if stages.contains(FrameStage::Minimap) {
            let started = Instant::now();
            self.draw_minimap();
            self.finish_stage(&mut report, FrameStage::Minimap, started);
        }

        if stages.contains(FrameStage::Popups) {
            let started = Instant::now();
            self.popups.tick();
            self.finish_stage(&mut report, FrameStage::Popups, started);
        }

        if stages.contains(FrameStage::PerfOverlay) && self.frame.perf_overlay {
            let started = Instant::now();
            self.draw_perf_overlay();
            self.finish_stage(&mut report, FrameStage::PerfOverlay, started);
        }

        self.settle();
        report
    }

    pub fn set_stage_enabled(&mut self, stage: FrameStage, enabled: bool) {
        self.frame.stages.set(stage, enabled);
        debug!(stage = stage.short_label(), enabled, "frame_stage_toggled");
    }

    pub fn set_stages(&mut self, stages: StageSet) {
        self.frame.stages = stages;
    }

    pub fn step_mode(&self) -> StepMode {
        self.frame.step_mode
    }

    pub fn set_step_mode(&mut self, step_mode: StepMode) {
        self.frame.step_mode = step_mode;
    }

    pub fn perf_overlay_visible(&self) -> bool {
        self.frame.perf_overlay
    }

    pub fn record_loop_rate(&mut self, snapshot: LoopRateSnapshot) {
        self.frame.loop_rate = snapshot;
    }

    pub fn world_surface(&self) -> &Surface {
        &self.frame.surfaces.world
    }

    pub fn minimap_surface(&self) -> &Surface {
        &self.frame.surfaces.minimap
    }

    pub fn perf_surface(&self) -> &Surface {
        &self.frame.surfaces.perf
    }

    pub(crate) fn dispatch_event(&mut self, event: SimEvent) {
        trace!(?event, "sim_event");
        match event {
            SimEvent::UpdateStructureInventory(pos) => {
                if self.panels.open_structure() == Some(pos) {
                    self.refresh_structure();
                }
            }
            SimEvent::UpdatePlayerInventory => self.refresh_player(),
            SimEvent::ShowInventory => self.toggle_inventory(),
            SimEvent::ShowInventoryAt {
                pos,
                recipes_enabled,
            } => self.open_structure_inventory(pos, recipes_enabled),
            SimEvent::UpdateResearch => self.refresh_research(),
            SimEvent::PopupText { text, x, y } => {
                self.popups.push(text, Vec2::new(x, y));
            }
        }
    }

    fn draw_minimap(&mut self) {
        let minimap = &mut self.frame.surfaces.minimap;
        self.sim.render_minimap(minimap);
        let world_px = self.frame.surfaces.world.size();
        let viewport = minimap_viewport_rect(
            world_px,
            self.sim.viewport_scale(),
            MINIMAP_SIZE as f32,
        );
        minimap.outline(viewport, MINIMAP_VIEWPORT_COLOR);
    }

    fn draw_perf_overlay(&mut self) {
        let engine_labels = self.sim.perf_labels();
        let stages = FrameStage::ALL
            .iter()
            .map(|stage| (*stage, self.frame.timings.stats(*stage)))
            .collect();
        let data = OverlayData {
            run_state: self.frame.run_state,
            loop_rate: self.frame.loop_rate,
            stages,
            engine_labels: &engine_labels,
        };
        draw_overlay(&mut self.frame.surfaces.perf, &data);
    }

    fn finish_stage(&mut self, report: &mut FrameReport, stage: FrameStage, started: Instant) {
        self.frame.timings.record(stage, started.elapsed());
        report.stages_run.push(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::Modifiers;
    use crate::app::simulation::{PointerButton, SlotCategory, StructurePos};
    use crate::app::testing::{Call, FakeSimulation};
    use crate::app::windows::WindowKind;

    fn shell_with(sim: FakeSimulation) -> Shell<FakeSimulation> {
        Shell::new(sim, ShellOptions::default())
    }

    fn simulate_calls(shell: &Shell<FakeSimulation>) -> Vec<f64> {
        shell
            .simulation()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Simulate(delta) => Some(delta),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fixed_step_ignores_elapsed_time() {
        let mut shell = shell_with(FakeSimulation::default());

        let report = shell.tick(Duration::from_millis(400));

        assert_eq!(report.advanced, Some(Duration::from_millis(50)));
        assert_eq!(simulate_calls(&shell), vec![0.05]);
        assert_eq!(report.stages_run.len(), 5);
    }

    #[test]
    fn variable_step_is_capped() {
        let mut shell = shell_with(FakeSimulation::default());
        shell.set_step_mode(StepMode::Variable {
            max_delta: Duration::from_millis(100),
        });

        shell.tick(Duration::from_millis(30));
        shell.tick(Duration::from_millis(900));

        assert_eq!(simulate_calls(&shell), vec![0.03, 0.1]);
    }

    #[test]
    fn step_mode_parse_accepts_known_names() {
        let fixed = Duration::from_millis(50);
        let max = Duration::from_millis(250);
        assert_eq!(StepMode::parse("Fixed", fixed, max), Some(StepMode::Fixed(fixed)));
        assert_eq!(
            StepMode::parse(" variable ", fixed, max),
            Some(StepMode::Variable { max_delta: max })
        );
        assert_eq!(StepMode::parse("turbo", fixed, max), None);
    }

    #[test]
    fn paused_shell_skips_advance_but_keeps_drawing() {
        let mut shell = shell_with(FakeSimulation::default());
        shell.toggle_pause();

        let report = shell.tick(Duration::from_millis(50));

        assert_eq!(report.advanced, None);
        assert!(simulate_calls(&shell).is_empty());
        assert!(report.stages_run.contains(&FrameStage::World));
        assert_eq!(
            shell
                .simulation()
                .count(|call| matches!(call, Call::RenderWorld)),
            1
        );
    }

    #[test]
    fn pause_stops_simulation_while_window_drag_keeps_working() {
        let mut shell = shell_with(FakeSimulation::with_player(&[("Iron Plate", 4)]));
        shell.toggle_inventory();
        shell.key_down(crate::app::input::Key::Char('p'));
        assert_eq!(shell.run_state(), RunState::Paused);

        let grab = shell
            .title_bar_center(WindowKind::Inventory)
            .expect("inventory visible");
        let before = shell
            .windows()
            .get(WindowKind::Inventory)
            .expect("handle")
            .position();
        shell.pointer_down(grab, PointerButton::Primary, Modifiers::default());
        shell.pointer_move(Vec2::new(grab.x + 40.0, grab.y + 25.0));
        shell.pointer_up(Vec2::new(grab.x + 40.0, grab.y + 25.0), PointerButton::Primary);
        shell.tick(Duration::from_millis(50));

        let after = shell
            .windows()
            .get(WindowKind::Inventory)
            .expect("handle")
            .position();
        assert_eq!(after, Vec2::new(before.x + 40.0, before.y + 25.0));
        assert!(simulate_calls(&shell).is_empty());
    }

    #[test]
    fn paused_shell_suppresses_world_clicks_but_not_moves() {
        let mut shell = shell_with(FakeSimulation::default());
        shell.toggle_pause();
        let world = Vec2::new(300.0, 300.0);

        shell.pointer_down(world, PointerButton::Primary, Modifiers::default());
        shell.pointer_up(world, PointerButton::Primary);
        shell.pointer_move(world);
        shell.wheel(1, world);

        let calls = shell.simulation().calls();
        assert!(!calls.iter().any(|call| matches!(call, Call::MouseDown(_))));
        assert!(!calls.iter().any(|call| matches!(call, Call::MouseUp(_))));
        assert!(!calls.iter().any(|call| matches!(call, Call::Wheel(_))));
        assert!(calls.contains(&Call::MouseMove));
    }

    #[test]
    fn dispatch_handles_events_in_order() {
        let furnace = StructurePos::new(1, 1);
        let mut sim = FakeSimulation::default();
        sim.add_structure(furnace, "Furnace", &[(SlotCategory::Input, &[("Iron Ore", 2)])]);
        sim.pending_events = vec![
            SimEvent::ShowInventoryAt {
                pos: furnace,
                recipes_enabled: false,
            },
            SimEvent::UpdateStructureInventory(furnace),
            SimEvent::PopupText {
                text: "+1 Iron Plate".to_string(),
                x: 40.0,
                y: 80.0,
            },
        ];
        let mut shell = shell_with(sim);

        let report = shell.tick(Duration::from_millis(50));

        assert_eq!(report.events_dispatched, 3);
        assert!(shell.windows().is_visible(WindowKind::Inventory));
        assert_eq!(shell.panels().open_structure(), Some(furnace));
        assert_eq!(
            shell
                .simulation()
                .count(|call| *call == Call::StructureInventory(furnace, SlotCategory::Input)),
            2
        );
        assert_eq!(shell.popups().len(), 1);
        assert_eq!(shell.popups().entries()[0].text, "+1 Iron Plate");
    }

    #[test]
    fn update_for_closed_structure_is_ignored() {
        let mut sim = FakeSimulation::default();
        sim.pending_events = vec![SimEvent::UpdateStructureInventory(StructurePos::new(9, 9))];
        let mut shell = shell_with(sim);

        shell.tick(Duration::from_millis(50));

        assert_eq!(
            shell
                .simulation()
                .count(|call| matches!(call, Call::StructureInventory(..))),
            0
        );
    }

    #[test]
    fn headless_stages_never_draw() {
        let mut sim = FakeSimulation::default();
        sim.pending_events = vec![SimEvent::UpdatePlayerInventory];
        let mut shell = shell_with(sim);
        shell.set_stages(StageSet::headless());

        let report = shell.tick(Duration::from_millis(50));

        assert_eq!(
            report.stages_run,
            vec![FrameStage::Advance, FrameStage::Dispatch]
        );
        let calls = shell.simulation().calls();
        assert!(!calls.contains(&Call::RenderWorld));
        assert!(!calls.contains(&Call::RenderMinimap));
    }

    #[test]
    fn minimap_stage_can_be_switched_off_alone() {
        let mut shell = shell_with(FakeSimulation::default());
        shell.set_stage_enabled(FrameStage::Minimap, false);

        shell.tick(Duration::from_millis(50));

        let calls = shell.simulation().calls();
        assert!(calls.contains(&Call::RenderWorld));
        assert!(!calls.contains(&Call::RenderMinimap));
    }

    #[test]
    fn perf_overlay_runs_only_when_visible() {
        let mut shell = shell_with(FakeSimulation::default());
        let hidden = shell.tick(Duration::from_millis(50));
        assert!(!hidden.stages_run.contains(&FrameStage::PerfOverlay));

        shell.key_down(crate::app::input::Key::F3);
        let shown = shell.tick(Duration::from_millis(50));

        assert!(shown.stages_run.contains(&FrameStage::PerfOverlay));
        assert!(shell.perf_surface().width() > 1);
    }

    #[test]
    fn minimap_shows_viewport_rectangle() {
        let mut shell = shell_with(FakeSimulation::default());
        shell.resize(1280, 640);
        shell.tick(Duration::from_millis(50));

        let viewport = minimap_viewport_rect(shell.surface_size(), 1.0, MINIMAP_SIZE as f32);
        let corner = shell
            .minimap_surface()
            .pixel(viewport.x as u32, viewport.y as u32);
        assert_eq!(corner, Some(MINIMAP_VIEWPORT_COLOR));
    }

    #[test]
    fn stage_set_toggles_individual_stages() {
        let mut stages = StageSet::all();
        stages.set(FrameStage::World, false);

        assert!(!stages.contains(FrameStage::World));
        assert!(stages.contains(FrameStage::Popups));
        assert!(!StageSet::headless().contains(FrameStage::PerfOverlay));
    }
}
