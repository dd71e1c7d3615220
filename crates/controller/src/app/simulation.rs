//! Contract between the shell and the simulation engine.
//!
//! The engine owns all game state. The shell only issues requests, renders the engine's
//! answers, and reacts to the events returned from [`Simulation::simulate`].

use serde::{Deserialize, Serialize};

use super::input::Key;
use super::layout::Vec2;
use super::rendering::Surface;
use super::selection::SelectionOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructurePos {
    pub x: i32,
    pub y: i32,
}

impl StructurePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotCategory {
    Input,
    Output,
    Storage,
    Burner,
}

impl SlotCategory {
    pub const ALL: [SlotCategory; 4] = [
        SlotCategory::Input,
        SlotCategory::Output,
        SlotCategory::Storage,
        SlotCategory::Burner,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SlotCategory::Input => "Input",
            SlotCategory::Output => "Output",
            SlotCategory::Storage => "Storage",
            SlotCategory::Burner => "Burner",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub item_name: String,
    pub count: u32,
}

impl InventoryLine {
    pub fn new(item_name: impl Into<String>, count: u32) -> Self {
        Self {
            item_name: item_name.into(),
            count,
        }
    }
}

/// Ordered item stacks of one inventory plus the engine's own idea of which one is held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub lines: Vec<InventoryLine>,
    pub selected_item: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureInfo {
    pub name: String,
    pub categories: Vec<SlotCategory>,
    pub recipes_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSelection {
    Selected,
    Deselected,
    /// The slot is empty; the engine asks for the inventory instead.
    OpenInventory,
    /// A held player item was placed on the belt; nothing stays selected.
    AssignedToBelt,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    ToPlayer,
    ToStructure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub structure: StructurePos,
    pub item_name: String,
    pub direction: TransferDirection,
    /// `None` lets the engine choose, for example fuel into the burner first.
    pub category: Option<SlotCategory>,
    pub whole_stack: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAllRequest {
    pub structure: StructurePos,
    pub direction: TransferDirection,
    pub category: Option<SlotCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Moved,
    Rejected,
    /// Rejected, and the engine dropped its own selection while refusing.
    RejectedAndCleared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeEntry {
    pub label: String,
    pub inputs: Vec<InventoryLine>,
    pub outputs: Vec<InventoryLine>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchEntry {
    pub label: String,
    pub progress: f32,
    pub unlocked: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    UpdateStructureInventory(StructurePos),
    UpdatePlayerInventory,
    ShowInventory,
    ShowInventoryAt {
        pos: StructurePos,
        recipes_enabled: bool,
    },
    UpdateResearch,
    PopupText {
        text: String,
        x: f32,
        y: f32,
    },
}

/// Follow-up requested by the engine in reply to a forwarded pointer or key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    ShowInventory,
    ShowInventoryAt {
        pos: StructurePos,
        recipes_enabled: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

pub trait Simulation {
    fn tool_count(&self) -> usize;
    fn tool_label(&self, _index: usize) -> Option<String> {
        None
    }
    fn select_tool(&mut self, index: usize) -> ToolSelection;
    fn render_tool(&self, _index: usize, _surface: &mut Surface) {}

    fn current_selection(&self) -> SelectionOwner;
    fn select_player_slot(&mut self, index: usize, whole_stack: bool) -> bool;
    fn select_structure_slot(
        &mut self,
        pos: StructurePos,
        category: SlotCategory,
        index: usize,
        whole_stack: bool,
    ) -> bool;
    fn deselect(&mut self);
    fn held_item(&self) -> Option<InventoryLine>;

    fn open_structure(&mut self, pos: StructurePos) -> Option<StructureInfo>;
    fn close_structure(&mut self) {}

    fn transfer(&mut self, request: &TransferRequest) -> TransferOutcome;
    fn transfer_all(&mut self, request: &MoveAllRequest) -> TransferOutcome;

    fn player_inventory(&self) -> InventorySnapshot;
    fn structure_inventory(&self, pos: StructurePos, category: SlotCategory) -> InventorySnapshot;

    fn recipes(&self, _pos: StructurePos) -> Vec<RecipeEntry> {
        Vec::new()
    }
    fn select_recipe(&mut self, _pos: StructurePos, _index: usize) -> bool {
        false
    }
    fn research_list(&self) -> Vec<ResearchEntry> {
        Vec::new()
    }
    fn select_research(&mut self, _index: usize) -> bool {
        false
    }

    fn simulate(&mut self, delta_seconds: f64) -> Vec<SimEvent>;

    fn render_world(&mut self, surface: &mut Surface);
    fn render_minimap(&mut self, _surface: &mut Surface) {}
    fn viewport_scale(&self) -> f32 {
        1.0
    }
    /// Primary click on the minimap; `offset` is in minimap pixels from its top-left corner.
    fn minimap_click(&mut self, _offset: Vec2) {}

    fn mouse_down(&mut self, _pos: Vec2, _button: PointerButton) -> Option<UiCommand> {
        None
    }
    fn mouse_up(&mut self, _pos: Vec2, _button: PointerButton) -> Option<UiCommand> {
        None
    }
    fn mouse_move(&mut self, _pos: Vec2) {}
    fn mouse_leave(&mut self) {}
    fn mouse_wheel(&mut self, _delta: i32, _pos: Vec2) {}
    fn key_down(&mut self, _key: Key) -> Option<UiCommand> {
        None
    }

    /// Per-phase timing lines, e.g. `"Simulate Avg: 0.412 ms"`.
    fn perf_labels(&self) -> Vec<String> {
        Vec::new()
    }

    fn serialize(&self) -> Option<String> {
        None
    }
    fn deserialize(&mut self, _blob: &str) -> bool {
        false
    }
}
