use std::collections::BTreeMap;

use tracing::{debug, info};

use super::frame::{FramePipeline, RunState, StepMode};
use super::input::{InputEvent, Key, Modifiers};
use super::layout::{
    close_button_rect, inventory_layout, list_row_at, list_row_rect, list_window_size,
    minimap_rect, title_bar_rect, tool_slot_at, InventoryLayout, StructureSection, Vec2, LIST_ROW_HEIGHT,
};
use super::popup::PopupQueue;
use super::rendering::{text_width_px, LINE_ADVANCE};
use super::selection::{SelectionMachine, SelectionOwner, ToolOutcome};
use super::simulation::{
    InventoryLine, PointerButton, RecipeEntry, ResearchEntry, Simulation, SlotCategory,
    StructureInfo, StructurePos, UiCommand,
};
use super::transfer::{InventorySide, ItemGesture, SlotRef};
use super::windows::{TooltipOwner, WindowKind, WindowStack};

const TOOLTIP_OFFSET: Vec2 = Vec2::new(14.0, 18.0);
const TOOLTIP_PADDING: f32 = 6.0;
const WINDOW_GAP: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Resume,
    Save,
    PerfOverlay,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Resume,
        MenuItem::Save,
        MenuItem::PerfOverlay,
        MenuItem::Quit,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            MenuItem::Resume => "Resume",
            MenuItem::Save => "Save game",
            MenuItem::PerfOverlay => "Toggle perf overlay",
            MenuItem::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureView {
    pub pos: StructurePos,
    pub info: StructureInfo,
    pub recipes_enabled: bool,
    pub slots: BTreeMap<SlotCategory, Vec<InventoryLine>>,
    pub recipes: Vec<RecipeEntry>,
}

/// Transient copies of engine data shown in the panels. Refetched whenever the engine says
/// they changed; never edited locally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelViews {
    pub player: Vec<InventoryLine>,
    pub structure: Option<StructureView>,
    pub research: Vec<ResearchEntry>,
    pub tooltip_text: String,
}

impl PanelViews {
    pub fn lines(&self, side: InventorySide) -> &[InventoryLine] {
        match side {
            InventorySide::Player => &self.player,
            InventorySide::Structure(pos, category) => self
                .structure
                .as_ref()
                .filter(|view| view.pos == pos)
                .and_then(|view| view.slots.get(&category))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    pub fn open_structure(&self) -> Option<StructurePos> {
        self.structure.as_ref().map(|view| view.pos)
    }

    pub fn research_label(entry: &ResearchEntry) -> String {
        if entry.unlocked {
            format!("{} (done)", entry.label)
        } else if entry.active {
            format!("> {} {:.0}%", entry.label, entry.progress * 100.0)
        } else {
            format!("{} {:.0}%", entry.label, entry.progress * 100.0)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorIndicators {
    pub held_item: Option<InventoryLine>,
    pub tool_highlight: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellOptions {
    pub width: u32,
    pub height: u32,
    pub step_mode: StepMode,
    pub perf_overlay: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            step_mode: StepMode::default(),
            perf_overlay: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PanelHit {
    TitleBar,
    Close,
    Slot(SlotRef),
    RecipeButton,
    ListRow(usize),
    Body,
}

/// The interaction shell: owns the engine handle and every piece of UI state around it.
///
/// Input handlers and [`Shell::tick`] are the only entry points; each finishes with a settle
/// step that brings the cursor indicators in line with the selection.
pub struct Shell<S: Simulation> {
    pub(crate) sim: S,
    pub(crate) selection: SelectionMachine,
    pub(crate) windows: WindowStack,
    pub(crate) popups: PopupQueue,
    pub(crate) panels: PanelViews,
    pub(crate) cursor: CursorIndicators,
    pub(crate) gesture: Option<ItemGesture>,
    pub(crate) frame: FramePipeline,
    pub(crate) pointer: Option<Vec2>,
    world_press: Option<PointerButton>,
    save_requested: bool,
    exit_requested: bool,
}

impl<S: Simulation> Shell<S> {
    pub fn new(sim: S, options: ShellOptions) -> Self {
        let mut shell = Self {
            sim,
            selection: SelectionMachine::new(),
            windows: WindowStack::new(),
            popups: PopupQueue::new(),
            panels: PanelViews::default(),
            cursor: CursorIndicators::default(),
            gesture: None,
            frame: FramePipeline::new(options),
            pointer: None,
            world_press: None,
            save_requested: false,
            exit_requested: false,
        };
        shell.refresh_player();
        shell.refresh_research();
        shell.selection.reconcile(shell.sim.current_selection());
        shell.settle();
        shell
    }

    pub fn simulation(&self) -> &S {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn selection(&self) -> &SelectionOwner {
        self.selection.owner()
    }

    pub fn windows(&self) -> &WindowStack {
        &self.windows
    }

    pub fn popups(&self) -> &PopupQueue {
        &self.popups
    }

    pub fn panels(&self) -> &PanelViews {
        &self.panels
    }

    pub fn cursor(&self) -> &CursorIndicators {
        &self.cursor
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn surface_size(&self) -> Vec2 {
        self.frame.surfaces.world.size()
    }

    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.save_requested)
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame.surfaces.world.resize(width, height);
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown {
                pos,
                button,
                modifiers,
            } => self.pointer_down(pos, button, modifiers),
            InputEvent::PointerUp { pos, button } => self.pointer_up(pos, button),
            InputEvent::PointerMove(pos) => self.pointer_move(pos),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::Wheel { delta, pos } => self.wheel(delta, pos),
            InputEvent::KeyDown(key) => self.key_down(key),
        }
    }

    pub fn pointer_down(&mut self, pos: Vec2, button: PointerButton, modifiers: Modifiers) {
        self.pointer = Some(pos);
        let minimap = minimap_rect(self.surface_size());
        if let Some(kind) = self.windows.topmost_at(pos) {
            self.windows.bring_to_front(kind);
            self.press_window(kind, pos, button, modifiers);
        } else if let Some(index) = tool_slot_at(self.surface_size(), self.sim.tool_count(), pos)
        {
            if button == PointerButton::Primary {
                self.select_tool_slot(index);
            }
        } else if minimap.contains(pos) {
            if button == PointerButton::Primary {
                self.sim
                    .minimap_click(Vec2::new(pos.x - minimap.x, pos.y - minimap.y));
            }
        } else if self.forwarding_suppressed("mouse_down") {
        } else {
            self.world_press = Some(button);
            let command = self.sim.mouse_down(pos, button);
            self.apply_command(command);
            self.selection.reconcile(self.sim.current_selection());
        }
        self.settle();
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        if self.windows.drag_to(pos) {
            return;
        }
        if self.gesture.is_some() {
            self.item_drag_motion(pos);
            self.settle();
            return;
        }
        self.update_hover(pos);
        if self.windows.topmost_at(pos).is_none() {
            self.sim.mouse_move(pos);
        }
    }

    pub fn pointer_up(&mut self, pos: Vec2, button: PointerButton) {
        self.pointer = Some(pos);
        if self.windows.end_drag() {
            return;
        }
        if let Some(gesture) = self.gesture.take() {
            self.release_item_gesture(gesture, pos);
            self.settle();
            return;
        }
        if self.world_press.take() != Some(button) {
            return;
        }
        if self.forwarding_suppressed("mouse_up") {
            return;
        }
        let command = self.sim.mouse_up(pos, button);
        self.apply_command(command);
        self.selection.reconcile(self.sim.current_selection());
        self.settle();
    }

    /// Pointer left the window: every capture ends exactly as on release, without a drop.
    pub fn pointer_leave(&mut self) {
        self.pointer = None;
        self.windows.end_drag();
        if let Some(gesture) = self.gesture.take() {
            debug!(item = ?gesture.item_name, "item_drag_cancelled");
        }
        self.world_press = None;
        if let Some(owner) = self.windows.tooltip_owner() {
            self.windows.hide_tooltip_owned_by(owner);
        }
        self.sim.mouse_leave();
        self.settle();
    }

    pub fn wheel(&mut self, delta: i32, pos: Vec2) {
        if self.windows.topmost_at(pos).is_some()
            || minimap_rect(self.surface_size()).contains(pos)
            || self.forwarding_suppressed("mouse_wheel")
        {
            return;
        }
        self.sim.mouse_wheel(delta, pos);
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Char('p') => self.toggle_pause(),
            Key::Char('e') => self.toggle_inventory(),
            Key::Char('t') => self.toggle_research(),
            Key::Digit(digit) => self.select_tool_slot((digit as usize + 9) % 10),
            Key::Escape => self.escape(),
            Key::F3 => self.toggle_perf_overlay(),
            other => {
                if !self.forwarding_suppressed("key_down") {
                    let command = self.sim.key_down(other);
                    self.apply_command(command);
                    self.selection.reconcile(self.sim.current_selection());
                }
            }
        }
        self.settle();
    }

    pub fn run_state(&self) -> RunState {
        self.frame.run_state
    }

    pub fn toggle_pause(&mut self) {
        self.frame.run_state = self.frame.run_state.toggled();
        info!(run_state = ?self.frame.run_state, "run_state_changed");
    }

    pub fn toggle_perf_overlay(&mut self) {
        self.frame.perf_overlay = !self.frame.perf_overlay;
        info!(perf_overlay = self.frame.perf_overlay, "perf_overlay_toggled");
    }

    pub fn select_tool_slot(&mut self, index: usize) {
        if index >= self.sim.tool_count() {
            return;
        }
        if matches!(self.selection.owner(), SelectionOwner::StructureItem { .. }) {
            self.selection.deselect(&mut self.sim);
        }
        if self.selection.select_tool(&mut self.sim, index) == ToolOutcome::OpenInventory {
            self.open_player_inventory();
        }
        self.refresh_player();
        self.settle();
    }

    pub fn toggle_inventory(&mut self) {
        if self.windows.is_visible(WindowKind::Inventory) {
            self.hide_window(WindowKind::Inventory);
        } else {
            self.open_player_inventory();
        }
    }

    pub fn open_player_inventory(&mut self) {
        if self.panels.structure.take().is_some() {
            self.sim.close_structure();
        }
        self.refresh_player();
        self.show_window(WindowKind::Inventory);
        self.windows
            .place_center(WindowKind::Inventory, self.surface_size());
    }

    pub fn open_structure_inventory(&mut self, pos: StructurePos, recipes_enabled: bool) {
        let Some(info) = self.sim.open_structure(pos) else {
            debug!(x = pos.x, y = pos.y, "structure_open_rejected");
            return;
        };
        if let SelectionOwner::StructureItem { pos: held_from, .. } = self.selection.owner() {
            if *held_from != pos {
                self.selection.deselect(&mut self.sim);
            }
        }
        self.panels.structure = Some(StructureView {
            pos,
            recipes_enabled: recipes_enabled || info.recipes_enabled,
            info,
            slots: BTreeMap::new(),
            recipes: Vec::new(),
        });
        self.refresh_structure();
        self.refresh_player();
        self.show_window(WindowKind::Inventory);
        self.windows
            .place_center(WindowKind::Inventory, self.surface_size());
        debug!(x = pos.x, y = pos.y, "structure_inventory_opened");
    }

    pub fn toggle_research(&mut self) {
        if self.windows.is_visible(WindowKind::ResearchSelector) {
            self.hide_window(WindowKind::ResearchSelector);
            return;
        }
        self.refresh_research();
        self.show_window(WindowKind::ResearchSelector);
        self.windows
            .place_center(WindowKind::ResearchSelector, self.surface_size());
    }

    pub fn show_window(&mut self, kind: WindowKind) {
        let closed = self.windows.show(kind);
        self.on_windows_closed(&closed);
    }

    pub fn hide_window(&mut self, kind: WindowKind) {
        let closed = self.windows.hide(kind);
        self.on_windows_closed(&closed);
    }

    /// Layout of the inventory window at its current position.
    pub fn inventory_layout(&self) -> Option<InventoryLayout> {
        let handle = self.windows.get(WindowKind::Inventory)?;
        Some(self.inventory_layout_at(handle.position()))
    }

    pub(crate) fn inventory_layout_at(&self, origin: Vec2) -> InventoryLayout {
        let section = self.panels.structure.as_ref().map(|view| StructureSection {
            pos: view.pos,
            name: &view.info.name,
            categories: view
                .info
                .categories
                .iter()
                .map(|category| {
                    let populated = view.slots.get(category).map_or(0, Vec::len);
                    (*category, populated)
                })
                .collect(),
            recipes_enabled: view.recipes_enabled,
        });
        inventory_layout(origin, self.panels.player.len(), section.as_ref())
    }

    pub(crate) fn list_rows(&self, kind: WindowKind) -> Vec<String> {
        match kind {
            WindowKind::RecipeSelector => self
                .panels
                .structure
                .as_ref()
                .map(|view| view.recipes.iter().map(recipe_row_label).collect())
                .unwrap_or_default(),
            WindowKind::ResearchSelector => self
                .panels
                .research
                .iter()
                .map(PanelViews::research_label)
                .collect(),
            WindowKind::MainMenu => MenuItem::ALL
                .iter()
                .map(|item| item.label().to_string())
                .collect(),
            WindowKind::Inventory | WindowKind::Tooltip => Vec::new(),
        }
    }

    pub(crate) fn refresh_player(&mut self) {
        self.panels.player = self.sim.player_inventory().lines;
        self.selection.mark_cursor_stale();
        self.sync_window_sizes();
    }

    pub(crate) fn refresh_structure(&mut self) {
        let Some(pos) = self.panels.open_structure() else {
            return;
        };
        let categories = self
            .panels
            .structure
            .as_ref()
            .map(|view| view.info.categories.clone())
            .unwrap_or_default();
        for category in categories {
            self.refresh_structure_category(pos, category);
        }
        let recipes = self.sim.recipes(pos);
        if let Some(view) = self.panels.structure.as_mut() {
            view.recipes = recipes;
        }
        self.sync_window_sizes();
    }

    pub(crate) fn refresh_structure_category(&mut self, pos: StructurePos, category: SlotCategory) {
        let lines = self.sim.structure_inventory(pos, category).lines;
        if let Some(view) = self.panels.structure.as_mut().filter(|view| view.pos == pos) {
            view.slots.insert(category, lines);
        }
        self.selection.mark_cursor_stale();
        self.sync_window_sizes();
    }

    pub(crate) fn refresh_research(&mut self) {
        self.panels.research = self.sim.research_list();
        self.sync_window_sizes();
    }

    pub(crate) fn apply_command(&mut self, command: Option<UiCommand>) {
        match command {
            Some(UiCommand::ShowInventory) => self.toggle_inventory(),
            Some(UiCommand::ShowInventoryAt {
                pos,
                recipes_enabled,
            }) => self.open_structure_inventory(pos, recipes_enabled),
            None => {}
        }
    }

    /// Brings the cursor indicators in line with the selection, if it changed.
    pub(crate) fn settle(&mut self) {
        if !self.selection.take_cursor_stale() {
            return;
        }
        self.cursor.held_item = if self.selection.held_item_visible() {
            self.sim.held_item().or_else(|| {
                self.selection
                    .owner()
                    .held_item_name()
                    .map(|name| InventoryLine::new(name, 0))
            })
        } else {
            None
        };
        self.cursor.tool_highlight = self.selection.tool_highlight();
    }

    pub(crate) fn forwarding_suppressed(&self, call: &'static str) -> bool {
        let paused = self.frame.run_state == RunState::Paused;
        if paused {
            debug!(call, "engine_input_suppressed");
        }
        paused
    }

    fn press_window(
        &mut self,
        kind: WindowKind,
        pos: Vec2,
        button: PointerButton,
        modifiers: Modifiers,
    ) {
        if button != PointerButton::Primary {
            return;
        }
        match self.panel_hit(kind, pos) {
            PanelHit::Close => self.hide_window(kind),
            PanelHit::TitleBar => {
                self.windows.start_drag(kind, pos);
            }
            PanelHit::Slot(slot) => {
                let item_name = self
                    .panels
                    .lines(slot.side)
                    .get(slot.index)
                    .map(|line| line.item_name.clone());
                self.gesture = Some(ItemGesture::pressed(slot, pos, modifiers, item_name));
            }
            PanelHit::RecipeButton => self.open_recipe_selector(),
            PanelHit::ListRow(index) => self.activate_list_row(kind, index),
            PanelHit::Body => {}
        }
    }

    pub(crate) fn panel_hit(&self, kind: WindowKind, pos: Vec2) -> PanelHit {
        let Some(handle) = self.windows.get(kind) else {
            return PanelHit::Body;
        };
        let rect = handle.rect();
        if close_button_rect(rect).contains(pos) {
            return PanelHit::Close;
        }
        if title_bar_rect(rect).contains(pos) {
            return PanelHit::TitleBar;
        }
        match kind {
            WindowKind::Inventory => {
                let layout = self.inventory_layout_at(rect.origin());
                if let Some(grid) = layout.grid_at(pos) {
                    if let Some(index) = grid.slot_at(pos) {
                        return PanelHit::Slot(SlotRef {
                            side: grid.side,
                            index,
                        });
                    }
                }
                if layout
                    .recipe_button
                    .is_some_and(|button| button.contains(pos))
                {
                    return PanelHit::RecipeButton;
                }
                PanelHit::Body
            }
            WindowKind::RecipeSelector | WindowKind::ResearchSelector | WindowKind::MainMenu => {
                let rows = self.list_rows(kind).len();
                list_row_at(rect, rows, pos).map_or(PanelHit::Body, PanelHit::ListRow)
            }
            WindowKind::Tooltip => PanelHit::Body,
        }
    }

    fn open_recipe_selector(&mut self) {
        let Some(inventory) = self.windows.get(WindowKind::Inventory).map(|h| h.rect()) else {
            return;
        };
        self.refresh_structure();
        self.show_window(WindowKind::RecipeSelector);
        self.windows.move_to(
            WindowKind::RecipeSelector,
            Vec2::new(inventory.right() + WINDOW_GAP, inventory.y),
        );
    }

    fn activate_list_row(&mut self, kind: WindowKind, index: usize) {
        match kind {
            WindowKind::RecipeSelector => {
                let Some(pos) = self.panels.open_structure() else {
                    return;
                };
                if self.sim.select_recipe(pos, index) {
                    info!(x = pos.x, y = pos.y, index, "recipe_selected");
                    self.hide_window(WindowKind::RecipeSelector);
                    self.refresh_structure();
                } else {
                    debug!(index, "recipe_selection_rejected");
                }
            }
            WindowKind::ResearchSelector => {
                if self.sim.select_research(index) {
                    info!(index, "research_selected");
                } else {
                    debug!(index, "research_selection_rejected");
                }
                self.refresh_research();
            }
            WindowKind::MainMenu => match MenuItem::ALL.get(index) {
                Some(MenuItem::Resume) => self.hide_window(WindowKind::MainMenu),
                Some(MenuItem::Save) => {
                    self.save_requested = true;
                    self.hide_window(WindowKind::MainMenu);
                }
                Some(MenuItem::PerfOverlay) => self.toggle_perf_overlay(),
                Some(MenuItem::Quit) => {
                    info!(reason = "main_menu", "shutdown_requested");
                    self.exit_requested = true;
                }
                None => {}
            },
            WindowKind::Inventory | WindowKind::Tooltip => {}
        }
    }

    fn escape(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            debug!(item = ?gesture.item_name, "item_drag_cancelled");
        } else if !self.selection.owner().is_none() {
            self.selection.deselect(&mut self.sim);
        } else if let Some(kind) = self.windows.topmost_visible() {
            self.hide_window(kind);
        } else {
            self.show_window(WindowKind::MainMenu);
            self.windows
                .place_center(WindowKind::MainMenu, self.surface_size());
        }
    }

    fn on_windows_closed(&mut self, closed: &[WindowKind]) {
        if !closed.contains(&WindowKind::Inventory) {
            return;
        }
        if self.selection.owner().holds_item() {
            self.selection.deselect(&mut self.sim);
        }
        self.gesture = None;
        if self.panels.structure.take().is_some() {
            self.sim.close_structure();
        }
        self.sync_window_sizes();
    }

    fn update_hover(&mut self, pos: Vec2) {
        match self.hover_tooltip(pos) {
            Some((owner, text)) => {
                let size = Vec2::new(
                    text_width_px(text.chars().count()) as f32 + TOOLTIP_PADDING * 2.0,
                    LINE_ADVANCE as f32 + TOOLTIP_PADDING * 2.0,
                );
                let position = Vec2::new(pos.x + TOOLTIP_OFFSET.x, pos.y + TOOLTIP_OFFSET.y);
                self.panels.tooltip_text = text;
                self.windows.show_tooltip(owner, position, size);
            }
            None => {
                if let Some(owner) = self.windows.tooltip_owner() {
                    self.windows.hide_tooltip_owned_by(owner);
                }
            }
        }
    }

    fn hover_tooltip(&self, pos: Vec2) -> Option<(TooltipOwner, String)> {
        match self.windows.topmost_at(pos) {
            Some(WindowKind::Inventory) => match self.panel_hit(WindowKind::Inventory, pos) {
                PanelHit::Slot(slot) => {
                    let line = self.panels.lines(slot.side).get(slot.index)?;
                    Some((
                        TooltipOwner::Inventory,
                        format!("{} x{}", line.item_name, line.count),
                    ))
                }
                _ => None,
            },
            Some(WindowKind::RecipeSelector) => {
                let PanelHit::ListRow(index) = self.panel_hit(WindowKind::RecipeSelector, pos)
                else {
                    return None;
                };
                let recipe = self.panels.structure.as_ref()?.recipes.get(index)?;
                Some((TooltipOwner::RecipeSelector, recipe_tooltip(recipe)))
            }
            Some(WindowKind::ResearchSelector) => {
                let PanelHit::ListRow(index) = self.panel_hit(WindowKind::ResearchSelector, pos)
                else {
                    return None;
                };
                let entry = self.panels.research.get(index)?;
                Some((
                    TooltipOwner::ResearchSelector,
                    PanelViews::research_label(entry),
                ))
            }
            Some(_) => None,
            None => {
                let index = tool_slot_at(self.surface_size(), self.sim.tool_count(), pos)?;
                let label = self.sim.tool_label(index)?;
                Some((TooltipOwner::ToolBelt, label))
            }
        }
    }

    fn sync_window_sizes(&mut self) {
        let inventory_origin = self
            .windows
            .get(WindowKind::Inventory)
            .map_or(Vec2::ZERO, |handle| handle.position());
        let inventory_size = self.inventory_layout_at(inventory_origin).size;
        self.windows
            .set_size(WindowKind::Inventory, inventory_size);

        for kind in [
            WindowKind::RecipeSelector,
            WindowKind::ResearchSelector,
            WindowKind::MainMenu,
        ] {
            let rows = self.list_rows(kind);
            let longest = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
            self.windows
                .set_size(kind, list_window_size(rows.len(), longest));
        }
    }

    /// Centre of the visible rect of slot `index` on `side`, if the inventory shows it.
    pub fn slot_center(&self, side: InventorySide, index: usize) -> Option<Vec2> {
        let layout = self.inventory_layout()?;
        let grid = layout.grids.iter().find(|grid| grid.side == side)?;
        if index >= grid.slots {
            return None;
        }
        let rect = grid.slot_rect(index);
        Some(Vec2::new(
            rect.x + rect.width / 2.0,
            rect.y + rect.height / 2.0,
        ))
    }

    /// Centre of row `index` of a list window.
    pub fn list_row_center(&self, kind: WindowKind, index: usize) -> Option<Vec2> {
        let handle = self.windows.get(kind)?;
        let rect = handle.rect();
        let row = list_row_rect(rect, index);
        Some(Vec2::new(row.x + row.width / 2.0, row.y + LIST_ROW_HEIGHT / 2.0))
    }

    pub fn title_bar_center(&self, kind: WindowKind) -> Option<Vec2> {
        let rect = title_bar_rect(self.windows.get(kind)?.rect());
        Some(Vec2::new(rect.x + 10.0, rect.y + rect.height / 2.0))
    }
}

fn recipe_row_label(recipe: &RecipeEntry) -> String {
    if recipe.selected {
        format!("> {}", recipe.label)
    } else {
        recipe.label.clone()
    }
}

fn recipe_tooltip(recipe: &RecipeEntry) -> String {
    let side = |lines: &[InventoryLine]| {
        lines
            .iter()
            .map(|line| format!("{} {}", line.count, line.item_name))
            .collect::<Vec<_>>()
            .join(" + ")
    };
    format!("{} -> {}", side(&recipe.inputs), side(&recipe.outputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::layout::{tool_belt_rect, tool_slot_rect, MINIMAP_SIZE};
    use crate::app::testing::{Call, FakeSimulation};

    fn shell_with(sim: FakeSimulation) -> Shell<FakeSimulation> {
        Shell::new(sim, ShellOptions::default())
    }

    fn click(shell: &mut Shell<FakeSimulation>, pos: Vec2) {
        shell.pointer_down(pos, PointerButton::Primary, Modifiers::default());
        shell.pointer_up(pos, PointerButton::Primary);
    }

    fn player(index: usize) -> SlotRef {
        SlotRef {
            side: InventorySide::Player,
            index,
        }
    }

    fn minimap_centre(shell: &Shell<FakeSimulation>) -> Vec2 {
        let rect = minimap_rect(shell.surface_size());
        Vec2::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
    }

    #[test]
    fn minimap_click_never_reaches_the_world() {
        let mut shell = shell_with(FakeSimulation::default());
        let centre = minimap_centre(&shell);

        click(&mut shell, centre);
        shell.wheel(1, centre);

        let sim = shell.simulation();
        assert_eq!(sim.count(|call| matches!(call, Call::MouseDown(_))), 0);
        assert_eq!(sim.count(|call| matches!(call, Call::MouseUp(_))), 0);
        assert_eq!(sim.count(|call| matches!(call, Call::Wheel(_))), 0);
        let half = MINIMAP_SIZE as f32 / 2.0;
        assert!(sim.calls().contains(&Call::MinimapClick(Vec2::new(half, half))));
    }

    #[test]
    fn secondary_click_on_minimap_is_dropped() {
        let mut shell = shell_with(FakeSimulation::default());
        let centre = minimap_centre(&shell);

        shell.pointer_down(centre, PointerButton::Secondary, Modifiers::default());
        shell.pointer_up(centre, PointerButton::Secondary);

        let sim = shell.simulation();
        assert_eq!(sim.count(|call| matches!(call, Call::MinimapClick(_))), 0);
        assert_eq!(sim.count(|call| matches!(call, Call::MouseDown(_))), 0);
    }

    #[test]
    fn closing_inventory_drops_held_player_item() {
        let mut shell = shell_with(FakeSimulation::with_player(&[("Iron Plate", 4)]));
        shell.toggle_inventory();
        let plate = shell
            .slot_center(InventorySide::Player, 0)
            .expect("plate slot");
        click(&mut shell, plate);
        assert_eq!(
            shell.selection(),
            &SelectionOwner::PlayerItem("Iron Plate".to_string())
        );
        assert_eq!(
            shell.cursor().held_item,
            Some(InventoryLine::new("Iron Plate", 4))
        );

        shell.key_down(Key::Char('e'));

        assert!(!shell.windows().is_visible(WindowKind::Inventory));
        assert_eq!(shell.selection(), &SelectionOwner::None);
        assert_eq!(shell.cursor().held_item, None);
        assert!(shell.simulation().calls().contains(&Call::Deselect));
    }

    #[test]
    fn closing_inventory_drops_held_structure_item_and_closes_structure() {
        let chest = StructurePos::new(4, 2);
        let mut sim = FakeSimulation::default();
        sim.add_structure(chest, "Chest", &[(SlotCategory::Storage, &[("Coal Ore", 5)])]);
        let mut shell = shell_with(sim);
        shell.open_structure_inventory(chest, false);
        shell.click_slot(SlotRef {
            side: InventorySide::Structure(chest, SlotCategory::Storage),
            index: 0,
        });
        assert!(shell.selection().holds_item());
        shell.simulation().clear_calls();

        shell.hide_window(WindowKind::Inventory);

        assert_eq!(shell.selection(), &SelectionOwner::None);
        assert_eq!(shell.panels().open_structure(), None);
        let calls = shell.simulation().calls();
        assert!(calls.contains(&Call::Deselect));
        assert!(calls.contains(&Call::CloseStructure));
    }

    #[test]
    fn closing_inventory_keeps_selected_tool() {
        let mut shell = shell_with(FakeSimulation::with_player(&[("Gear", 1)]));
        shell.select_tool_slot(2);
        shell.toggle_inventory();

        shell.toggle_inventory();

        assert_eq!(shell.selection(), &SelectionOwner::Tool(2));
    }

    #[test]
    fn escape_unwinds_drag_then_selection_then_window_then_opens_menu() {
        let mut shell = shell_with(FakeSimulation::with_player(&[
            ("Iron Plate", 4),
            ("Gear", 2),
        ]));
        shell.toggle_inventory();
        shell.click_slot(player(0));
        let gear = shell
            .slot_center(InventorySide::Player, 1)
            .expect("gear slot");
        shell.pointer_down(gear, PointerButton::Primary, Modifiers::default());
        assert!(shell.gesture.is_some());

        shell.key_down(Key::Escape);
        assert!(shell.gesture.is_none());
        assert!(shell.selection().holds_item());

        shell.key_down(Key::Escape);
        assert_eq!(shell.selection(), &SelectionOwner::None);
        assert!(shell.windows().is_visible(WindowKind::Inventory));

        shell.key_down(Key::Escape);
        assert!(!shell.windows().is_visible(WindowKind::Inventory));
        assert!(!shell.windows().is_visible(WindowKind::MainMenu));

        shell.key_down(Key::Escape);
        assert!(shell.windows().is_visible(WindowKind::MainMenu));
    }

    #[test]
    fn main_menu_save_row_requests_one_save_and_closes() {
        let mut shell = shell_with(FakeSimulation::default());
        shell.key_down(Key::Escape);
        let save_row = shell
            .list_row_center(WindowKind::MainMenu, 1)
            .expect("menu row");

        click(&mut shell, save_row);

        assert!(shell.take_save_request());
        assert!(!shell.take_save_request());
        assert!(!shell.windows().is_visible(WindowKind::MainMenu));
        assert!(!shell.exit_requested());
    }

    #[test]
    fn main_menu_quit_row_requests_exit() {
        let mut shell = shell_with(FakeSimulation::default());
        shell.key_down(Key::Escape);
        let quit_row = shell
            .list_row_center(WindowKind::MainMenu, 3)
            .expect("menu row");

        click(&mut shell, quit_row);

        assert!(shell.exit_requested());
        assert!(!shell.take_save_request());
    }

    #[test]
    fn hovering_tool_belt_shows_tool_tooltip() {
        let mut shell = shell_with(FakeSimulation::default());
        let belt = tool_belt_rect(shell.surface_size(), shell.simulation().tool_count());
        let slot = tool_slot_rect(belt, 3);

        shell.pointer_move(Vec2::new(slot.x + slot.width / 2.0, slot.y + slot.height / 2.0));

        assert_eq!(shell.windows().tooltip_owner(), Some(TooltipOwner::ToolBelt));
        assert!(shell.windows().is_visible(WindowKind::Tooltip));
        assert_eq!(shell.panels().tooltip_text, "Tool 3");

        shell.pointer_move(Vec2::new(300.0, 300.0));

        assert_eq!(shell.windows().tooltip_owner(), None);
        assert!(!shell.windows().is_visible(WindowKind::Tooltip));
    }
}
