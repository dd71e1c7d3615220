use tracing::debug;

use super::simulation::{InventoryLine, Simulation, SlotCategory, StructurePos, ToolSelection};

/// What the pointer currently holds. At most one owner exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionOwner {
    #[default]
    None,
    Tool(usize),
    PlayerItem(String),
    StructureItem {
        pos: StructurePos,
        category: SlotCategory,
        name: String,
    },
}

impl SelectionOwner {
    pub fn is_none(&self) -> bool {
        matches!(self, SelectionOwner::None)
    }

    pub fn holds_item(&self) -> bool {
        matches!(
            self,
            SelectionOwner::PlayerItem(_) | SelectionOwner::StructureItem { .. }
        )
    }

    pub fn held_item_name(&self) -> Option<&str> {
        match self {
            SelectionOwner::PlayerItem(name) => Some(name),
            SelectionOwner::StructureItem { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn tool_index(&self) -> Option<usize> {
        match self {
            SelectionOwner::Tool(index) => Some(*index),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Selected(usize),
    Cleared,
    /// Empty belt slot; the caller should open the inventory.
    OpenInventory,
    Unchanged,
}

/// Shell-side mirror of the engine's selection.
///
/// Every transition goes through the engine first; the local owner only changes once the
/// engine accepts. Cursor indicators are refreshed lazily: transitions mark them stale and
/// the shell flushes them once per handled input or frame.
#[derive(Debug, Default)]
pub struct SelectionMachine {
    owner: SelectionOwner,
    cursor_stale: bool,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> &SelectionOwner {
        &self.owner
    }

    pub fn select_tool<S: Simulation + ?Sized>(&mut self, sim: &mut S, index: usize) -> ToolOutcome {
        match sim.select_tool(index) {
            ToolSelection::Selected => {
                self.set_owner(SelectionOwner::Tool(index));
                ToolOutcome::Selected(index)
            }
            ToolSelection::Deselected | ToolSelection::AssignedToBelt => {
                self.set_owner(SelectionOwner::None);
                ToolOutcome::Cleared
            }
            ToolSelection::OpenInventory => {
                self.set_owner(SelectionOwner::None);
                ToolOutcome::OpenInventory
            }
            ToolSelection::Rejected => {
                debug!(index, "tool_selection_rejected");
                ToolOutcome::Unchanged
            }
        }
    }

    /// Picks up the stack at `index` of the player's inventory. Only legal from `None`.
    pub fn select_player_item<S: Simulation + ?Sized>(
        &mut self,
        sim: &mut S,
        lines: &[InventoryLine],
        index: usize,
        whole_stack: bool,
    ) -> bool {
        if !self.owner.is_none() {
            return false;
        }
        let Some(line) = lines.get(index) else {
            return false;
        };
        if !sim.select_player_slot(index, whole_stack) {
            debug!(index, item = %line.item_name, "player_selection_rejected");
            return false;
        }
        self.set_owner(SelectionOwner::PlayerItem(line.item_name.clone()));
        true
    }

    /// Picks up the stack at `index` of one structure category. Only legal from `None`.
    pub fn select_structure_item<S: Simulation + ?Sized>(
        &mut self,
        sim: &mut S,
        pos: StructurePos,
        category: SlotCategory,
        lines: &[InventoryLine],
        index: usize,
        whole_stack: bool,
    ) -> bool {
        if !self.owner.is_none() {
            return false;
        }
        let Some(line) = lines.get(index) else {
            return false;
        };
        if !sim.select_structure_slot(pos, category, index, whole_stack) {
            debug!(index, item = %line.item_name, "structure_selection_rejected");
            return false;
        }
        self.set_owner(SelectionOwner::StructureItem {
            pos,
            category,
            name: line.item_name.clone(),
        });
        true
    }

    pub fn deselect<S: Simulation + ?Sized>(&mut self, sim: &mut S) {
        sim.deselect();
        self.set_owner(SelectionOwner::None);
    }

    /// Adopts the engine's view after a forwarded event may have changed it.
    pub fn reconcile(&mut self, engine_owner: SelectionOwner) {
        if engine_owner != self.owner {
            self.set_owner(engine_owner);
        }
    }

    pub fn held_item_visible(&self) -> bool {
        self.owner.holds_item()
    }

    pub fn tool_highlight(&self) -> Option<usize> {
        self.owner.tool_index()
    }

    pub fn mark_cursor_stale(&mut self) {
        self.cursor_stale = true;
    }

    pub fn take_cursor_stale(&mut self) -> bool {
        std::mem::take(&mut self.cursor_stale)
    }

    fn set_owner(&mut self, owner: SelectionOwner) {
        if owner != self.owner {
            debug!(from = ?self.owner, to = ?owner, "selection_changed");
        }
        self.owner = owner;
        self.cursor_stale = true;
    }
}
