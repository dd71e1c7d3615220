//! Small in-process factory engine the shell drives: a tile map with ore patches,
//! placeable chests, furnaces, assemblers and labs, a player inventory and a tool belt.

mod inventory;
mod research;
mod save;
mod structures;
mod world;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use controller::{
    AssetBundle, InventoryLine, InventorySnapshot, Key, MoveAllRequest, PointerButton,
    RecipeEntry, Rect, ResearchEntry, SelectionOwner, SimEvent, Simulation, SlotCategory,
    StructureInfo, StructurePos, Surface, ToolSelection, TransferDirection, TransferOutcome,
    TransferRequest, UiCommand, Vec2, MINIMAP_SIZE,
};
use tracing::{debug, info, warn};

use inventory::{Inventory, STACK_SIZE};
use research::Research;
use save::{decode_save, encode_save, SaveGame, SavedStructure, SAVE_VERSION};
use structures::{Structure, StructureKind};
use world::{in_bounds, terrain_at, Camera};

pub(crate) const BELT_SLOTS: usize = 10;

const STARTING_ITEMS: &[(&str, u32)] = &[
    ("Chest", 4),
    ("Furnace", 4),
    ("Assembler", 2),
    ("Lab", 1),
    ("Coal Ore", 60),
    ("Iron Ore", 80),
    ("Copper Ore", 40),
    ("Iron Plate", 120),
];
const STARTING_BELT: &[&str] = &["Chest", "Furnace", "Assembler", "Lab"];

const ARROW_PAN_PX: f32 = 32.0;
const SIMULATE_AVG_WEIGHT: f32 = 0.1;

pub(crate) struct SandboxSimulation {
    assets: Arc<AssetBundle>,
    camera: Camera,
    view_px: Vec2,
    structures: BTreeMap<StructurePos, Structure>,
    player: Inventory,
    belt: Vec<Option<String>>,
    selection: SelectionOwner,
    held_whole_stack: bool,
    open: Option<StructurePos>,
    research: Research,
    pending: Vec<SimEvent>,
    pan_anchor: Option<Vec2>,
    simulate_avg_ms: f32,
}

impl SandboxSimulation {
    pub(crate) fn new(assets: Arc<AssetBundle>) -> Self {
        let mut belt = vec![None; BELT_SLOTS];
        for (slot, item) in belt.iter_mut().zip(STARTING_BELT) {
            *slot = Some(item.to_string());
        }
        Self {
            assets,
            camera: Camera::default(),
            view_px: Vec2::new(1280.0, 720.0),
            structures: BTreeMap::new(),
            player: Inventory::from_counts(STARTING_ITEMS),
            belt,
            selection: SelectionOwner::None,
            held_whole_stack: false,
            open: None,
            research: Research::default(),
            pending: Vec::new(),
            pan_anchor: None,
            simulate_avg_ms: 0.0,
        }
    }

    fn popup_at(&mut self, pos: StructurePos, text: String) {
        let centre = self.camera.tile_center(pos);
        self.pending.push(SimEvent::PopupText {
            text,
            x: centre.x,
            y: centre.y,
        });
    }

    fn belt_item(&self, index: usize) -> Option<&str> {
        self.belt.get(index).and_then(|slot| slot.as_deref())
    }

    fn place_structure(&mut self, pos: StructurePos, kind: StructureKind) -> bool {
        if self.structures.contains_key(&pos) || self.player.remove(kind.item_name(), 1) == 0 {
            return false;
        }
        self.structures.insert(pos, Structure::new(kind));
        debug!(x = pos.x, y = pos.y, kind = ?kind, "structure_placed");
        self.pending.push(SimEvent::UpdatePlayerInventory);
        self.popup_at(pos, format!("-1 {}", kind.item_name()));
        true
    }

    fn pick_up_structure(&mut self, pos: StructurePos) -> bool {
        let Some(mut structure) = self.structures.remove(&pos) else {
            return false;
        };
        for (item, count) in structure.drain_all() {
            self.player.add(&item, count);
        }
        let name = structure.kind.item_name();
        self.player.add(name, 1);
        if matches!(self.selection, SelectionOwner::StructureItem { pos: held, .. } if held == pos)
        {
            self.selection = SelectionOwner::None;
        }
        if self.open == Some(pos) {
            self.open = None;
        }
        debug!(x = pos.x, y = pos.y, kind = ?structure.kind, "structure_removed");
        self.pending.push(SimEvent::UpdateStructureInventory(pos));
        self.pending.push(SimEvent::UpdatePlayerInventory);
        self.popup_at(pos, format!("+1 {name}"));
        true
    }

    fn mine(&mut self, pos: StructurePos) -> bool {
        let Some(ore) = terrain_at(pos).and_then(|terrain| terrain.ore_item()) else {
            return false;
        };
        self.player.add(ore, 1);
        self.pending.push(SimEvent::UpdatePlayerInventory);
        self.popup_at(pos, format!("+1 {ore}"));
        true
    }

    fn to_save_game(&self) -> SaveGame {
        SaveGame {
            save_version: SAVE_VERSION,
            camera: self.camera,
            player: self.player.clone(),
            belt: self.belt.clone(),
            structures: self
                .structures
                .iter()
                .map(|(pos, structure)| SavedStructure {
                    pos: *pos,
                    structure: structure.clone(),
                })
                .collect(),
            research: self.research.clone(),
        }
    }

    fn apply_save_game(&mut self, save: SaveGame) {
        self.camera = save.camera;
        self.player = save.player;
        self.belt = save.belt;
        self.structures = save
            .structures
            .into_iter()
            .map(|saved| (saved.pos, saved.structure))
            .collect();
        self.research = save.research;
        self.selection = SelectionOwner::None;
        self.held_whole_stack = false;
        self.open = None;
        self.pending.clear();
    }
}

fn moved_amount(available: u32, whole_stack: bool) -> u32 {
    if whole_stack {
        available
    } else {
        available.min(STACK_SIZE)
    }
}

impl Simulation for SandboxSimulation {
    fn tool_count(&self) -> usize {
        BELT_SLOTS
    }

    fn tool_label(&self, index: usize) -> Option<String> {
        let item = self.belt_item(index)?;
        Some(format!("{item} ({})", self.player.count_of(item)))
    }

    fn select_tool(&mut self, index: usize) -> ToolSelection {
        if index >= BELT_SLOTS {
            return ToolSelection::Rejected;
        }
        if let SelectionOwner::PlayerItem(item) = &self.selection {
            if StructureKind::from_item(item).is_none() {
                return ToolSelection::Rejected;
            }
            self.belt[index] = Some(item.clone());
            self.selection = SelectionOwner::None;
            return ToolSelection::AssignedToBelt;
        }
        if self.selection == SelectionOwner::Tool(index) {
            self.selection = SelectionOwner::None;
            return ToolSelection::Deselected;
        }
        if self.belt_item(index).is_none() {
            self.selection = SelectionOwner::None;
            return ToolSelection::OpenInventory;
        }
        self.selection = SelectionOwner::Tool(index);
        ToolSelection::Selected
    }

    fn render_tool(&self, index: usize, surface: &mut Surface) {
        let Some(item) = self.belt_item(index) else {
            return;
        };
        if let Some(icon) = self.assets.item_icon(item) {
            let size = surface.size();
            surface.blit_scaled(&icon, Rect::new(0.0, 0.0, size.x, size.y));
        }
    }

    fn current_selection(&self) -> SelectionOwner {
        self.selection.clone()
    }

    fn select_player_slot(&mut self, index: usize, whole_stack: bool) -> bool {
        let Some(line) = self.player.line_at(index) else {
            return false;
        };
        self.selection = SelectionOwner::PlayerItem(line.item_name);
        self.held_whole_stack = whole_stack;
        true
    }

    fn select_structure_slot(
        &mut self,
        pos: StructurePos,
        category: SlotCategory,
        index: usize,
        whole_stack: bool,
    ) -> bool {
        let line = self
            .structures
            .get(&pos)
            .and_then(|structure| structure.inventory(category))
            .and_then(|inventory| inventory.line_at(index));
        let Some(line) = line else {
            return false;
        };
        self.selection = SelectionOwner::StructureItem {
            pos,
            category,
            name: line.item_name,
        };
        self.held_whole_stack = whole_stack;
        true
    }

    fn deselect(&mut self) {
        self.selection = SelectionOwner::None;
    }

    fn held_item(&self) -> Option<InventoryLine> {
        let (inventory, name) = match &self.selection {
            SelectionOwner::PlayerItem(name) => (Some(&self.player), name),
            SelectionOwner::StructureItem {
                pos,
                category,
                name,
            } => (
                self.structures
                    .get(pos)
                    .and_then(|structure| structure.inventory(*category)),
                name,
            ),
            SelectionOwner::None | SelectionOwner::Tool(_) => return None,
        };
        let available = inventory?.count_of(name);
        (available > 0).then(|| {
            InventoryLine::new(name.clone(), moved_amount(available, self.held_whole_stack))
        })
    }

    fn open_structure(&mut self, pos: StructurePos) -> Option<StructureInfo> {
        let info = self.structures.get(&pos)?.kind.info();
        self.open = Some(pos);
        Some(info)
    }

    fn close_structure(&mut self) {
        self.open = None;
    }

    fn transfer(&mut self, request: &TransferRequest) -> TransferOutcome {
        let Some(structure) = self.structures.get_mut(&request.structure) else {
            return TransferOutcome::Rejected;
        };
        let item = request.item_name.as_str();
        match request.direction {
            TransferDirection::ToStructure => {
                let available = self.player.count_of(item);
                if available == 0 {
                    self.selection = SelectionOwner::None;
                    return TransferOutcome::RejectedAndCleared;
                }
                let amount = moved_amount(available, request.whole_stack);
                if structure.insert(request.category, item, amount).is_none() {
                    return TransferOutcome::Rejected;
                }
                self.player.remove(item, amount);
            }
            TransferDirection::ToPlayer => {
                let categories = match request.category {
                    Some(category) => vec![category],
                    None => structure.kind.categories().to_vec(),
                };
                let source = categories.into_iter().find(|category| {
                    structure
                        .inventory(*category)
                        .is_some_and(|inventory| inventory.count_of(item) > 0)
                });
                let Some(category) = source else {
                    self.selection = SelectionOwner::None;
                    return TransferOutcome::RejectedAndCleared;
                };
                let available = structure
                    .inventory(category)
                    .map_or(0, |inventory| inventory.count_of(item));
                let amount = moved_amount(available, request.whole_stack);
                let taken = structure.take(category, item, amount);
                self.player.add(item, taken);
            }
        }
        self.selection = SelectionOwner::None;
        TransferOutcome::Moved
    }

    fn transfer_all(&mut self, request: &MoveAllRequest) -> TransferOutcome {
        let Some(structure) = self.structures.get_mut(&request.structure) else {
            return TransferOutcome::Rejected;
        };
        let mut moved = false;
        match request.direction {
            TransferDirection::ToStructure => {
                let stacks = self.player.stacks().to_vec();
                for stack in stacks {
                    if structure.insert(request.category, &stack.item, stack.count).is_some() {
                        self.player.remove(&stack.item, stack.count);
                        moved = true;
                    }
                }
            }
            TransferDirection::ToPlayer => {
                let categories = match request.category {
                    Some(category) => vec![category],
                    None => structure.kind.categories().to_vec(),
                };
                for category in categories {
                    for (item, count) in structure.drain(category) {
                        self.player.add(&item, count);
                        moved = true;
                    }
                }
            }
        }
        if !moved {
            return TransferOutcome::Rejected;
        }
        self.selection = SelectionOwner::None;
        TransferOutcome::Moved
    }

    fn player_inventory(&self) -> InventorySnapshot {
        InventorySnapshot {
            lines: self.player.lines(),
            selected_item: match &self.selection {
                SelectionOwner::PlayerItem(name) => Some(name.clone()),
                _ => None,
            },
        }
    }

    fn structure_inventory(&self, pos: StructurePos, category: SlotCategory) -> InventorySnapshot {
        let lines = self
            .structures
            .get(&pos)
            .and_then(|structure| structure.inventory(category))
            .map(Inventory::lines)
            .unwrap_or_default();
        let selected_item = match &self.selection {
            SelectionOwner::StructureItem {
                pos: held_pos,
                category: held_category,
                name,
            } if *held_pos == pos && *held_category == category => Some(name.clone()),
            _ => None,
        };
        InventorySnapshot {
            lines,
            selected_item,
        }
    }

    fn recipes(&self, pos: StructurePos) -> Vec<RecipeEntry> {
        self.structures
            .get(&pos)
            .filter(|structure| structure.kind.recipes_enabled())
            .map(Structure::recipe_entries)
            .unwrap_or_default()
    }

    fn select_recipe(&mut self, pos: StructurePos, index: usize) -> bool {
        let Some(structure) = self.structures.get_mut(&pos) else {
            return false;
        };
        let selected = structure.select_recipe(index);
        if selected {
            debug!(x = pos.x, y = pos.y, recipe = index, "recipe_selected");
        }
        selected
    }

    fn research_list(&self) -> Vec<ResearchEntry> {
        self.research.entries()
    }

    fn select_research(&mut self, index: usize) -> bool {
        let selected = self.research.select(index);
        if selected {
            self.pending.push(SimEvent::UpdateResearch);
        }
        selected
    }

    fn simulate(&mut self, delta_seconds: f64) -> Vec<SimEvent> {
        let started = Instant::now();
        let mut research_changed = false;
        let mut popups = Vec::new();
        for (pos, structure) in &mut self.structures {
            let report = structure.step(delta_seconds, &mut self.research);
            if report.inventory_changed {
                self.pending.push(SimEvent::UpdateStructureInventory(*pos));
            }
            for (item, count) in report.produced {
                popups.push((*pos, format!("+{count} {item}")));
            }
            if let Some(label) = report.unlocked {
                info!(technology = label, "research_unlocked");
                popups.push((*pos, format!("Researched {label}")));
            }
            research_changed |= report.research_changed;
        }
        for (pos, text) in popups {
            self.popup_at(pos, text);
        }
        if research_changed {
            self.pending.push(SimEvent::UpdateResearch);
        }

        let elapsed_ms = started.elapsed().as_secs_f32() * 1000.0;
        self.simulate_avg_ms += (elapsed_ms - self.simulate_avg_ms) * SIMULATE_AVG_WEIGHT;
        std::mem::take(&mut self.pending)
    }

    fn render_world(&mut self, surface: &mut Surface) {
        self.view_px = surface.size();
        world::render_world(surface, &self.camera, &self.structures, &self.assets);
    }

    fn render_minimap(&mut self, surface: &mut Surface) {
        world::render_minimap(surface, &self.camera, self.view_px, &self.structures);
    }

    fn viewport_scale(&self) -> f32 {
        self.camera.scale
    }

    fn minimap_click(&mut self, offset: Vec2) {
        let half = MINIMAP_SIZE as f32 / 2.0;
        let centre = self.camera.center_tile(self.view_px);
        let target = Vec2::new(centre.x + offset.x - half, centre.y + offset.y - half);
        self.camera.center_on(target, self.view_px);
        debug!(x = target.x, y = target.y, "minimap_recentred");
    }

    fn mouse_down(&mut self, pos: Vec2, button: PointerButton) -> Option<UiCommand> {
        if button == PointerButton::Middle {
            self.pan_anchor = Some(pos);
            return None;
        }
        let tile = self.camera.tile_at(pos);
        if !in_bounds(tile) {
            return None;
        }
        match button {
            PointerButton::Primary => {
                if let Some(structure) = self.structures.get(&tile) {
                    return Some(UiCommand::ShowInventoryAt {
                        pos: tile,
                        recipes_enabled: structure.kind.recipes_enabled(),
                    });
                }
                let placing = self
                    .selection
                    .tool_index()
                    .and_then(|index| self.belt_item(index))
                    .and_then(StructureKind::from_item);
                match placing {
                    Some(kind) => {
                        self.place_structure(tile, kind);
                    }
                    None => {
                        self.mine(tile);
                    }
                }
            }
            PointerButton::Secondary => {
                self.pick_up_structure(tile);
            }
            PointerButton::Middle => {}
        }
        None
    }

    fn mouse_up(&mut self, _pos: Vec2, button: PointerButton) -> Option<UiCommand> {
        if button == PointerButton::Middle {
            self.pan_anchor = None;
        }
        None
    }

    fn mouse_move(&mut self, pos: Vec2) {
        if let Some(anchor) = self.pan_anchor {
            self.camera.pan(anchor.x - pos.x, anchor.y - pos.y);
            self.pan_anchor = Some(pos);
        }
    }

    fn mouse_leave(&mut self) {
        self.pan_anchor = None;
    }

    fn mouse_wheel(&mut self, delta: i32, pos: Vec2) {
        self.camera.zoom(delta, pos);
    }

    fn key_down(&mut self, key: Key) -> Option<UiCommand> {
        match key {
            Key::ArrowUp => self.camera.pan(0.0, -ARROW_PAN_PX),
            Key::ArrowDown => self.camera.pan(0.0, ARROW_PAN_PX),
            Key::ArrowLeft => self.camera.pan(-ARROW_PAN_PX, 0.0),
            Key::ArrowRight => self.camera.pan(ARROW_PAN_PX, 0.0),
            Key::Char('i') => return Some(UiCommand::ShowInventory),
            _ => {}
        }
        None
    }

    fn perf_labels(&self) -> Vec<String> {
        vec![
            format!("Simulate Avg: {:.3} ms", self.simulate_avg_ms),
            format!("Structures: {}", self.structures.len()),
        ]
    }

    fn serialize(&self) -> Option<String> {
        match encode_save(&self.to_save_game()) {
            Ok(raw) => Some(raw),
            Err(error) => {
                warn!(error = %error, "save_encode_failed");
                None
            }
        }
    }

    fn deserialize(&mut self, blob: &str) -> bool {
        match decode_save(blob) {
            Ok(save) => {
                self.apply_save_game(save);
                info!(structures = self.structures.len(), "save_applied");
                true
            }
            Err(error) => {
                warn!(error = %error, "save_load_failed");
                false
            }
        }
    }
}
