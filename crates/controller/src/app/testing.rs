use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use super::input::Key;
use super::layout::Vec2;
use super::rendering::Surface;
use super::selection::SelectionOwner;
use super::simulation::{
    InventoryLine, InventorySnapshot, MoveAllRequest, PointerButton, RecipeEntry, ResearchEntry,
    SimEvent, Simulation, SlotCategory, StructureInfo, StructurePos, ToolSelection,
    TransferOutcome, TransferRequest, UiCommand,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SelectTool(usize),
    SelectPlayerSlot(usize, bool),
    SelectStructureSlot(StructurePos, SlotCategory, usize, bool),
    Deselect,
    OpenStructure(StructurePos),
    CloseStructure,
    Transfer(TransferRequest),
    TransferAll(MoveAllRequest),
    PlayerInventory,
    StructureInventory(StructurePos, SlotCategory),
    SelectRecipe(StructurePos, usize),
    SelectResearch(usize),
    Simulate(f64),
    RenderWorld,
    RenderMinimap,
    MinimapClick(Vec2),
    MouseDown(PointerButton),
    MouseUp(PointerButton),
    MouseMove,
    MouseLeave,
    Wheel(i32),
    KeyDown(Key),
}

/// Scriptable engine that records every request the shell makes.
#[derive(Debug)]
pub(crate) struct FakeSimulation {
    calls: RefCell<Vec<Call>>,
    pub tools: usize,
    pub tool_answers: HashMap<usize, ToolSelection>,
    pub selection: SelectionOwner,
    pub player: Vec<InventoryLine>,
    pub structures: BTreeMap<(StructurePos, SlotCategory), Vec<InventoryLine>>,
    pub structure_info: HashMap<StructurePos, StructureInfo>,
    pub transfer_answer: TransferOutcome,
    pub pending_events: Vec<SimEvent>,
    pub mouse_down_answer: Option<UiCommand>,
    pub key_answer: Option<UiCommand>,
    pub recipes: Vec<RecipeEntry>,
    pub research: Vec<ResearchEntry>,
    pub labels: Vec<String>,
}

impl Default for FakeSimulation {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            tools: 10,
            tool_answers: HashMap::new(),
            selection: SelectionOwner::None,
            player: Vec::new(),
            structures: BTreeMap::new(),
            structure_info: HashMap::new(),
            transfer_answer: TransferOutcome::Moved,
            pending_events: Vec::new(),
            mouse_down_answer: None,
            key_answer: None,
            recipes: Vec::new(),
            research: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl FakeSimulation {
    pub(crate) fn with_player(lines: &[(&str, u32)]) -> Self {
        Self {
            player: to_lines(lines),
            ..Self::default()
        }
    }

    pub(crate) fn add_structure(
        &mut self,
        pos: StructurePos,
        name: &str,
        slots: &[(SlotCategory, &[(&str, u32)])],
    ) {
        let categories = slots.iter().map(|(category, _)| *category).collect();
        for (category, lines) in slots {
            self.structures.insert((pos, *category), to_lines(lines));
        }
        self.structure_info.insert(
            pos,
            StructureInfo {
                name: name.to_string(),
                categories,
                recipes_enabled: false,
            },
        );
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

fn to_lines(lines: &[(&str, u32)]) -> Vec<InventoryLine> {
    lines
        .iter()
        .map(|(name, count)| InventoryLine::new(*name, *count))
        .collect()
}

impl Simulation for FakeSimulation {
    fn tool_count(&self) -> usize {
        self.tools
    }

    fn tool_label(&self, index: usize) -> Option<String> {
        (index < self.tools).then(|| format!("Tool {index}"))
    }

    fn select_tool(&mut self, index: usize) -> ToolSelection {
        self.record(Call::SelectTool(index));
        let answer = self
            .tool_answers
            .get(&index)
            .copied()
            .unwrap_or(ToolSelection::Selected);
        match answer {
            ToolSelection::Selected if self.selection == SelectionOwner::Tool(index) => {
                self.selection = SelectionOwner::None;
                ToolSelection::Deselected
            }
            ToolSelection::Selected => {
                self.selection = SelectionOwner::Tool(index);
                ToolSelection::Selected
            }
            ToolSelection::Rejected => ToolSelection::Rejected,
            other => {
                self.selection = SelectionOwner::None;
                other
            }
        }
    }

    fn current_selection(&self) -> SelectionOwner {
        self.selection.clone()
    }

    fn select_player_slot(&mut self, index: usize, whole_stack: bool) -> bool {
        self.record(Call::SelectPlayerSlot(index, whole_stack));
        match self.player.get(index) {
            Some(line) => {
                self.selection = SelectionOwner::PlayerItem(line.item_name.clone());
                true
            }
            None => false,
        }
    }

    fn select_structure_slot(
        &mut self,
        pos: StructurePos,
        category: SlotCategory,
        index: usize,
        whole_stack: bool,
    ) -> bool {
        self.record(Call::SelectStructureSlot(pos, category, index, whole_stack));
        let name = self
            .structures
            .get(&(pos, category))
            .and_then(|lines| lines.get(index))
            .map(|line| line.item_name.clone());
        match name {
            Some(name) => {
                self.selection = SelectionOwner::StructureItem {
                    pos,
                    category,
                    name,
                };
                true
            }
            None => false,
        }
    }

    fn deselect(&mut self) {
        self.record(Call::Deselect);
        self.selection = SelectionOwner::None;
    }

    fn held_item(&self) -> Option<InventoryLine> {
        match &self.selection {
            SelectionOwner::PlayerItem(name) => self
                .player
                .iter()
                .find(|line| &line.item_name == name)
                .cloned(),
            SelectionOwner::StructureItem {
                pos,
                category,
                name,
            } => self
                .structures
                .get(&(*pos, *category))
                .and_then(|lines| lines.iter().find(|line| &line.item_name == name))
                .cloned(),
            _ => None,
        }
    }

    fn open_structure(&mut self, pos: StructurePos) -> Option<StructureInfo> {
        self.record(Call::OpenStructure(pos));
        self.structure_info.get(&pos).cloned()
    }

    fn close_structure(&mut self) {
        self.record(Call::CloseStructure);
    }

    fn transfer(&mut self, request: &TransferRequest) -> TransferOutcome {
        self.record(Call::Transfer(request.clone()));
        if self.transfer_answer != TransferOutcome::Rejected {
            self.selection = SelectionOwner::None;
        }
        self.transfer_answer
    }

    fn transfer_all(&mut self, request: &MoveAllRequest) -> TransferOutcome {
        self.record(Call::TransferAll(request.clone()));
        self.transfer_answer
    }

    fn player_inventory(&self) -> InventorySnapshot {
        self.record(Call::PlayerInventory);
        InventorySnapshot {
            lines: self.player.clone(),
            selected_item: self.selection.held_item_name().map(str::to_string),
        }
    }

    fn structure_inventory(&self, pos: StructurePos, category: SlotCategory) -> InventorySnapshot {
        self.record(Call::StructureInventory(pos, category));
        InventorySnapshot {
            lines: self
                .structures
                .get(&(pos, category))
                .cloned()
                .unwrap_or_default(),
            selected_item: None,
        }
    }

    fn recipes(&self, _pos: StructurePos) -> Vec<RecipeEntry> {
        self.recipes.clone()
    }

    fn select_recipe(&mut self, pos: StructurePos, index: usize) -> bool {
        self.record(Call::SelectRecipe(pos, index));
        index < self.recipes.len()
    }

    fn research_list(&self) -> Vec<ResearchEntry> {
        self.research.clone()
    }

    fn select_research(&mut self, index: usize) -> bool {
        self.record(Call::SelectResearch(index));
        index < self.research.len()
    }

    fn simulate(&mut self, delta_seconds: f64) -> Vec<SimEvent> {
        self.record(Call::Simulate(delta_seconds));
        std::mem::take(&mut self.pending_events)
    }

    fn render_world(&mut self, _surface: &mut Surface) {
        self.record(Call::RenderWorld);
    }

    fn render_minimap(&mut self, _surface: &mut Surface) {
        self.record(Call::RenderMinimap);
    }

    fn minimap_click(&mut self, offset: Vec2) {
        self.record(Call::MinimapClick(offset));
    }

    fn mouse_down(&mut self, _pos: Vec2, button: PointerButton) -> Option<UiCommand> {
        self.record(Call::MouseDown(button));
        self.mouse_down_answer.take()
    }

    fn mouse_up(&mut self, _pos: Vec2, button: PointerButton) -> Option<UiCommand> {
        self.record(Call::MouseUp(button));
        None
    }

    fn mouse_move(&mut self, _pos: Vec2) {
        self.record(Call::MouseMove);
    }

    fn mouse_leave(&mut self) {
        self.record(Call::MouseLeave);
    }

    fn mouse_wheel(&mut self, delta: i32, _pos: Vec2) {
        self.record(Call::Wheel(delta));
    }

    fn key_down(&mut self, key: Key) -> Option<UiCommand> {
        self.record(Call::KeyDown(key));
        self.key_answer.take()
    }

    fn perf_labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}
