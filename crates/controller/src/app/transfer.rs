//! Moving items between the player's inventory and an open structure.
//!
//! Clicks and drags end in the same place: [`plan_transfer`] turns "item X from side A onto
//! side B" into one [`TransferRequest`], and [`Shell::request_transfer`] sends it and
//! refreshes or clears according to the engine's answer.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::input::Modifiers;
use super::layout::Vec2;
use super::selection::SelectionOwner;
use super::shell::Shell;
use super::simulation::{
    MoveAllRequest, Simulation, SlotCategory, StructurePos, TransferDirection, TransferOutcome,
    TransferRequest,
};
use super::windows::WindowKind;

pub const DRAG_PAYLOAD_TYPE: &str = "application/x-ironworks-item";
pub(crate) const DRAG_THRESHOLD_PX: f32 = 4.0;

/// Typed payload carried by an item drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub payload_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragToken {
    pub item_name: String,
    pub from_player: bool,
    pub slot_category: SlotCategory,
}

#[derive(Debug, Error)]
pub enum DragTokenError {
    #[error("unexpected drag payload type {0:?}")]
    PayloadType(String),
    #[error("malformed drag token: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to encode drag token: {0}")]
    Encode(#[source] serde_json::Error),
}

impl DragToken {
    pub fn encode(&self) -> Result<DragPayload, DragTokenError> {
        let data = serde_json::to_string(self).map_err(DragTokenError::Encode)?;
        Ok(DragPayload {
            payload_type: DRAG_PAYLOAD_TYPE.to_string(),
            data,
        })
    }

    pub fn decode(payload: &DragPayload) -> Result<Self, DragTokenError> {
        if payload.payload_type != DRAG_PAYLOAD_TYPE {
            return Err(DragTokenError::PayloadType(payload.payload_type.clone()));
        }
        serde_json::from_str(&payload.data).map_err(DragTokenError::Malformed)
    }
}

/// One inventory as seen by the transfer rules. Every structure category counts as its own
/// inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventorySide {
    Player,
    Structure(StructurePos, SlotCategory),
}

impl InventorySide {
    /// Side a token was dragged from. Structure tokens need the open structure to resolve.
    pub fn from_token(token: &DragToken, open_structure: Option<StructurePos>) -> Option<Self> {
        if token.from_player {
            Some(InventorySide::Player)
        } else {
            open_structure.map(|pos| InventorySide::Structure(pos, token.slot_category))
        }
    }

    fn category(self) -> SlotCategory {
        match self {
            InventorySide::Player => SlotCategory::Storage,
            InventorySide::Structure(_, category) => category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub side: InventorySide,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Move,
    None,
}

/// Preview shown while a payload hovers `target`.
pub fn drop_effect(payload: &DragPayload, target: Option<InventorySide>) -> DropEffect {
    if payload.payload_type == DRAG_PAYLOAD_TYPE && target.is_some() {
        DropEffect::Move
    } else {
        DropEffect::None
    }
}

/// The request moving `item_name` from `source` to `destination`, if the pair allows one.
/// Only player/structure pairs transfer; anything else has no request.
pub fn plan_transfer(
    item_name: &str,
    source: InventorySide,
    destination: InventorySide,
    whole_stack: bool,
) -> Option<TransferRequest> {
    let (structure, direction, category) = match (source, destination) {
        (InventorySide::Player, InventorySide::Structure(pos, category)) => {
            (pos, TransferDirection::ToStructure, category)
        }
        (InventorySide::Structure(pos, category), InventorySide::Player) => {
            (pos, TransferDirection::ToPlayer, category)
        }
        _ => return None,
    };
    Some(TransferRequest {
        structure,
        item_name: item_name.to_string(),
        direction,
        category: Some(category),
        whole_stack,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GesturePhase {
    Pressed,
    Dragging {
        payload: DragPayload,
        effect: DropEffect,
    },
}

/// Pointer pressed on an inventory slot. Becomes a drag once it travels past the threshold,
/// otherwise a click on release.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ItemGesture {
    pub slot: SlotRef,
    pub origin: Vec2,
    pub modifiers: Modifiers,
    pub item_name: Option<String>,
    pub phase: GesturePhase,
}

impl ItemGesture {
    pub(crate) fn pressed(
        slot: SlotRef,
        origin: Vec2,
        modifiers: Modifiers,
        item_name: Option<String>,
    ) -> Self {
        Self {
            slot,
            origin,
            modifiers,
            item_name,
            phase: GesturePhase::Pressed,
        }
    }

    pub(crate) fn drag_effect(&self) -> Option<DropEffect> {
        match &self.phase {
            GesturePhase::Dragging { effect, .. } => Some(*effect),
            GesturePhase::Pressed => None,
        }
    }
}

impl<S: Simulation> Shell<S> {
    pub fn click_slot(&mut self, slot: SlotRef) {
        let clicked = self
            .panels
            .lines(slot.side)
            .get(slot.index)
            .map(|line| line.item_name.clone());
        if self.selection.owner().tool_index().is_some() {
            self.selection.deselect(&mut self.sim);
        }

        match held_source(self.selection.owner()) {
            None => {
                self.select_slot(slot, false);
            }
            Some((source, held)) if source == slot.side => {
                self.selection.deselect(&mut self.sim);
                if clicked.as_deref() != Some(held.as_str()) {
                    self.select_slot(slot, false);
                }
            }
            Some((source, held)) => match plan_transfer(&held, source, slot.side, false) {
                Some(request) => self.request_transfer(request),
                None => {
                    self.selection.deselect(&mut self.sim);
                    self.select_slot(slot, false);
                }
            },
        }
    }

    pub fn ctrl_click_slot(&mut self, slot: SlotRef) {
        let open = self.panels.open_structure();
        let line = self.panels.lines(slot.side).get(slot.index).cloned();
        match (slot.side, line) {
            (InventorySide::Player, Some(line)) => {
                let Some(structure) = open else {
                    self.click_slot(slot);
                    return;
                };
                if !self.hold_whole_stack(slot, &line.item_name) {
                    return;
                }
                self.request_transfer(TransferRequest {
                    structure,
                    item_name: line.item_name,
                    direction: TransferDirection::ToStructure,
                    category: None,
                    whole_stack: true,
                });
            }
            (InventorySide::Structure(structure, category), Some(line)) => {
                if !self.hold_whole_stack(slot, &line.item_name) {
                    return;
                }
                self.request_transfer(TransferRequest {
                    structure,
                    item_name: line.item_name,
                    direction: TransferDirection::ToPlayer,
                    category: Some(category),
                    whole_stack: true,
                });
            }
            (InventorySide::Structure(structure, category), None) => {
                self.request_move_all(MoveAllRequest {
                    structure,
                    direction: TransferDirection::ToPlayer,
                    category: Some(category),
                });
            }
            (InventorySide::Player, None) => {
                if let Some(structure) = open {
                    self.request_move_all(MoveAllRequest {
                        structure,
                        direction: TransferDirection::ToStructure,
                        category: None,
                    });
                }
            }
        }
    }

    /// Sends one transfer and applies the engine's verdict. Counts are never adjusted
    /// locally; both inventories are re-read after a move.
    pub fn request_transfer(&mut self, request: TransferRequest) {
        match self.sim.transfer(&request) {
            TransferOutcome::Moved => {
                debug!(
                    item = %request.item_name,
                    direction = ?request.direction,
                    whole_stack = request.whole_stack,
                    "transfer_completed"
                );
                self.selection.deselect(&mut self.sim);
                self.refresh_player();
                self.refresh_structure();
            }
            TransferOutcome::Rejected => {
                debug!(item = %request.item_name, direction = ?request.direction, "transfer_rejected");
            }
            TransferOutcome::RejectedAndCleared => {
                debug!(
                    item = %request.item_name,
                    direction = ?request.direction,
                    "transfer_rejected_selection_cleared"
                );
                self.selection.deselect(&mut self.sim);
            }
        }
    }

    pub fn request_move_all(&mut self, request: MoveAllRequest) {
        match self.sim.transfer_all(&request) {
            TransferOutcome::Moved => {
                debug!(direction = ?request.direction, category = ?request.category, "move_all_completed");
                self.refresh_player();
                self.refresh_structure();
            }
            TransferOutcome::Rejected | TransferOutcome::RejectedAndCleared => {
                debug!(direction = ?request.direction, category = ?request.category, "move_all_rejected");
            }
        }
    }

    pub(crate) fn item_drag_motion(&mut self, pos: Vec2) {
        let target = self.drop_target_at(pos);
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        match &mut gesture.phase {
            GesturePhase::Dragging { payload, effect } => {
                *effect = drop_effect(payload, target);
                return;
            }
            GesturePhase::Pressed => {}
        }
        if gesture.origin.distance_squared(pos) <= DRAG_THRESHOLD_PX * DRAG_THRESHOLD_PX {
            return;
        }
        let Some(item_name) = gesture.item_name.clone() else {
            self.gesture = None;
            return;
        };
        let slot = gesture.slot;
        self.begin_item_drag(slot, item_name, target);
    }

    pub(crate) fn release_item_gesture(&mut self, gesture: ItemGesture, pos: Vec2) {
        match gesture.phase {
            GesturePhase::Pressed if gesture.modifiers.ctrl => self.ctrl_click_slot(gesture.slot),
            GesturePhase::Pressed => self.click_slot(gesture.slot),
            GesturePhase::Dragging { payload, .. } => {
                let target = self.drop_target_at(pos);
                self.drop_payload(&payload, target);
            }
        }
    }

    /// Completes a drag. Payloads from other sources, malformed tokens and drops back onto
    /// the source inventory are ignored.
    pub fn drop_payload(&mut self, payload: &DragPayload, target: Option<InventorySide>) {
        let Some(destination) = target else {
            trace!("item_drop_outside_inventory");
            return;
        };
        let token = match DragToken::decode(payload) {
            Ok(token) => token,
            Err(error) => {
                trace!(%error, "item_drop_ignored");
                return;
            }
        };
        let Some(source) = InventorySide::from_token(&token, self.panels.open_structure()) else {
            trace!(item = %token.item_name, "item_drop_without_structure");
            return;
        };
        if source == destination {
            trace!(item = %token.item_name, "item_drop_on_source");
            return;
        }
        match plan_transfer(&token.item_name, source, destination, false) {
            Some(request) => self.request_transfer(request),
            None => trace!(item = %token.item_name, "item_drop_not_transferable"),
        }
    }

    fn begin_item_drag(
        &mut self,
        slot: SlotRef,
        item_name: String,
        target: Option<InventorySide>,
    ) {
        if self.selection.owner().tool_index().is_some() {
            self.selection.deselect(&mut self.sim);
        }
        if self.selection.owner().is_none() {
            self.select_slot(slot, false);
        }
        let token = DragToken {
            item_name,
            from_player: slot.side == InventorySide::Player,
            slot_category: slot.side.category(),
        };
        match token.encode() {
            Ok(payload) => {
                debug!(item = %token.item_name, from_player = token.from_player, "item_drag_started");
                let effect = drop_effect(&payload, target);
                if let Some(gesture) = self.gesture.as_mut() {
                    gesture.phase = GesturePhase::Dragging { payload, effect };
                }
            }
            Err(error) => {
                debug!(%error, "item_drag_not_started");
                self.gesture = None;
            }
        }
    }

    fn select_slot(&mut self, slot: SlotRef, whole_stack: bool) -> bool {
        let lines = self.panels.lines(slot.side).to_vec();
        match slot.side {
            InventorySide::Player => {
                self.selection
                    .select_player_item(&mut self.sim, &lines, slot.index, whole_stack)
            }
            InventorySide::Structure(pos, category) => self.selection.select_structure_item(
                &mut self.sim,
                pos,
                category,
                &lines,
                slot.index,
                whole_stack,
            ),
        }
    }

    /// Makes `item_name` at `slot` the held item, replacing whatever else was held.
    fn hold_whole_stack(&mut self, slot: SlotRef, item_name: &str) -> bool {
        if let Some((source, held)) = held_source(self.selection.owner()) {
            if source == slot.side && held == item_name {
                return true;
            }
        }
        if !self.selection.owner().is_none() {
            self.selection.deselect(&mut self.sim);
        }
        self.select_slot(slot, true)
    }

    fn drop_target_at(&self, pos: Vec2) -> Option<InventorySide> {
        if self.windows.topmost_at(pos) != Some(WindowKind::Inventory) {
            return None;
        }
        let layout = self.inventory_layout()?;
        layout.grid_at(pos).map(|grid| grid.side)
    }
}

fn held_source(owner: &SelectionOwner) -> Option<(InventorySide, String)> {
    match owner {
        SelectionOwner::PlayerItem(name) => Some((InventorySide::Player, name.clone())),
        SelectionOwner::StructureItem {
            pos,
            category,
            name,
        } => Some((InventorySide::Structure(*pos, *category), name.clone())),
        SelectionOwner::None | SelectionOwner::Tool(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::shell::ShellOptions;
    use crate::app::simulation::PointerButton;
    use crate::app::testing::{Call, FakeSimulation};

    fn assembler() -> StructurePos {
        StructurePos::new(5, 2)
    }

    fn open_shell() -> Shell<FakeSimulation> {
        let mut sim = FakeSimulation::with_player(&[("Iron Plate", 20), ("Coal Ore", 5)]);
        sim.add_structure(
            assembler(),
            "Assembler",
            &[
                (SlotCategory::Input, &[("Copper Plate", 4)]),
                (SlotCategory::Output, &[("Gear", 3)]),
            ],
        );
        let mut shell = Shell::new(sim, ShellOptions::default());
        shell.open_structure_inventory(assembler(), false);
        shell.simulation().clear_calls();
        shell
    }

    fn click(shell: &mut Shell<FakeSimulation>, side: InventorySide, index: usize) {
        let pos = shell.slot_center(side, index).expect("slot on screen");
        shell.pointer_down(pos, PointerButton::Primary, Modifiers::default());
        shell.pointer_up(pos, PointerButton::Primary);
    }

    fn ctrl_click(shell: &mut Shell<FakeSimulation>, side: InventorySide, index: usize) {
        let pos = shell.slot_center(side, index).expect("slot on screen");
        let ctrl = Modifiers {
            ctrl: true,
            shift: false,
        };
        shell.pointer_down(pos, PointerButton::Primary, ctrl);
        shell.pointer_up(pos, PointerButton::Primary);
    }

    fn drag(shell: &mut Shell<FakeSimulation>, from: (InventorySide, usize), to: (InventorySide, usize)) {
        let start = shell.slot_center(from.0, from.1).expect("source slot");
        let end = shell.slot_center(to.0, to.1).expect("target slot");
        shell.pointer_down(start, PointerButton::Primary, Modifiers::default());
        shell.pointer_move(end);
        shell.pointer_up(end, PointerButton::Primary);
    }

    fn transfers(shell: &Shell<FakeSimulation>) -> Vec<TransferRequest> {
        shell
            .simulation()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Transfer(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    const INPUT: InventorySide = InventorySide::Structure(StructurePos::new(5, 2), SlotCategory::Input);
    const OUTPUT: InventorySide =
        InventorySide::Structure(StructurePos::new(5, 2), SlotCategory::Output);

    #[test]
    fn token_survives_encoding() {
        let token = DragToken {
            item_name: "Gear".to_string(),
            from_player: false,
            slot_category: SlotCategory::Output,
        };
        let payload = token.encode().expect("encode");

        assert_eq!(payload.payload_type, DRAG_PAYLOAD_TYPE);
        assert!(payload.data.contains("\"fromPlayer\":false"));
        assert_eq!(DragToken::decode(&payload).expect("decode"), token);
    }

    #[test]
    fn foreign_or_malformed_payloads_are_rejected() {
        let foreign = DragPayload {
            payload_type: "text/plain".to_string(),
            data: "Gear".to_string(),
        };
        assert!(matches!(
            DragToken::decode(&foreign),
            Err(DragTokenError::PayloadType(_))
        ));

        let malformed = DragPayload {
            payload_type: DRAG_PAYLOAD_TYPE.to_string(),
            data: "{\"itemName\":".to_string(),
        };
        assert!(matches!(
            DragToken::decode(&malformed),
            Err(DragTokenError::Malformed(_))
        ));
    }

    #[test]
    fn drop_effect_requires_matching_type_and_target() {
        let payload = DragToken {
            item_name: "Gear".to_string(),
            from_player: true,
            slot_category: SlotCategory::Storage,
        }
        .encode()
        .expect("encode");
        let foreign = DragPayload {
            payload_type: "text/plain".to_string(),
            data: String::new(),
        };

        assert_eq!(drop_effect(&payload, Some(INPUT)), DropEffect::Move);
        assert_eq!(drop_effect(&payload, None), DropEffect::None);
        assert_eq!(drop_effect(&foreign, Some(INPUT)), DropEffect::None);
    }

    #[test]
    fn plan_only_pairs_player_with_structure() {
        let to_structure = plan_transfer("Iron Plate", InventorySide::Player, INPUT, false)
            .expect("player to structure");
        assert_eq!(to_structure.direction, TransferDirection::ToStructure);
        assert_eq!(to_structure.category, Some(SlotCategory::Input));

        let to_player =
            plan_transfer("Gear", OUTPUT, InventorySide::Player, true).expect("structure to player");
        assert_eq!(to_player.direction, TransferDirection::ToPlayer);
        assert_eq!(to_player.category, Some(SlotCategory::Output));
        assert!(to_player.whole_stack);

        assert_eq!(plan_transfer("Gear", OUTPUT, INPUT, false), None);
        assert_eq!(
            plan_transfer("Gear", InventorySide::Player, InventorySide::Player, false),
            None
        );
    }

    #[test]
    fn click_then_click_other_inventory_transfers_and_refreshes() {
        let mut shell = open_shell();

        click(&mut shell, InventorySide::Player, 0);
        assert_eq!(
            shell.selection(),
            &SelectionOwner::PlayerItem("Iron Plate".to_string())
        );
        assert!(shell.cursor().held_item.is_some());

        shell.simulation().clear_calls();
        click(&mut shell, INPUT, 0);

        assert_eq!(
            transfers(&shell),
            vec![TransferRequest {
                structure: assembler(),
                item_name: "Iron Plate".to_string(),
                direction: TransferDirection::ToStructure,
                category: Some(SlotCategory::Input),
                whole_stack: false,
            }]
        );
        let calls = shell.simulation().calls();
        assert!(calls.contains(&Call::PlayerInventory));
        assert!(calls.contains(&Call::StructureInventory(assembler(), SlotCategory::Input)));
        assert!(shell.selection().is_none());
        assert!(shell.cursor().held_item.is_none());
    }

    #[test]
    fn rejected_transfer_keeps_selection() {
        let mut shell = open_shell();
        shell.simulation_mut().transfer_answer = TransferOutcome::Rejected;

        click(&mut shell, InventorySide::Player, 1);
        click(&mut shell, OUTPUT, 0);

        assert_eq!(transfers(&shell).len(), 1);
        assert_eq!(
            shell.selection(),
            &SelectionOwner::PlayerItem("Coal Ore".to_string())
        );
    }

    #[test]
    fn engine_cleared_rejection_drops_selection() {
        let mut shell = open_shell();
        shell.simulation_mut().transfer_answer = TransferOutcome::RejectedAndCleared;

        click(&mut shell, InventorySide::Player, 0);
        click(&mut shell, INPUT, 0);

        assert!(shell.selection().is_none());
        assert_eq!(
            shell
                .simulation()
                .count(|call| matches!(call, Call::PlayerInventory)),
            0
        );
    }

    #[test]
    fn same_inventory_click_toggles_or_reselects() {
        let mut shell = open_shell();

        click(&mut shell, InventorySide::Player, 0);
        click(&mut shell, InventorySide::Player, 0);
        assert!(shell.selection().is_none());

        click(&mut shell, InventorySide::Player, 0);
        click(&mut shell, InventorySide::Player, 1);
        assert_eq!(
            shell.selection(),
            &SelectionOwner::PlayerItem("Coal Ore".to_string())
        );
        assert!(transfers(&shell).is_empty());
    }

    #[test]
    fn held_tool_is_dropped_before_slot_selection() {
        let mut shell = open_shell();
        shell.select_tool_slot(3);
        assert_eq!(shell.cursor().tool_highlight, Some(3));

        click(&mut shell, InventorySide::Player, 0);

        assert_eq!(
            shell.selection(),
            &SelectionOwner::PlayerItem("Iron Plate".to_string())
        );
        assert_eq!(shell.cursor().tool_highlight, None);
    }

    #[test]
    fn drag_issues_the_same_request_as_clicks() {
        let mut clicked = open_shell();
        click(&mut clicked, OUTPUT, 0);
        click(&mut clicked, InventorySide::Player, 2);

        let mut dragged = open_shell();
        drag(&mut dragged, (OUTPUT, 0), (InventorySide::Player, 2));

        let expected = transfers(&clicked);
        assert_eq!(expected.len(), 1);
        assert_eq!(transfers(&dragged), expected);
        assert_eq!(expected[0].direction, TransferDirection::ToPlayer);
        assert!(dragged.selection().is_none());
    }

    #[test]
    fn drag_onto_source_inventory_is_ignored() {
        let mut shell = open_shell();
        drag(&mut shell, (InventorySide::Player, 0), (InventorySide::Player, 5));

        assert!(transfers(&shell).is_empty());
    }

    #[test]
    fn drag_hover_previews_move_over_inventory() {
        let mut shell = open_shell();
        let start = shell.slot_center(InventorySide::Player, 0).expect("slot");
        let over = shell.slot_center(INPUT, 1).expect("slot");
        shell.pointer_down(start, PointerButton::Primary, Modifiers::default());
        shell.pointer_move(over);

        let effect = shell.gesture.as_ref().and_then(ItemGesture::drag_effect);
        assert_eq!(effect, Some(DropEffect::Move));

        shell.pointer_leave();
        assert!(shell.gesture.is_none());
        assert!(transfers(&shell).is_empty());
    }

    #[test]
    fn malformed_drop_is_ignored() {
        let mut shell = open_shell();
        let payload = DragPayload {
            payload_type: DRAG_PAYLOAD_TYPE.to_string(),
            data: "not json".to_string(),
        };

        shell.drop_payload(&payload, Some(InventorySide::Player));

        assert!(shell.simulation().calls().is_empty());
    }

    #[test]
    fn ctrl_click_moves_whole_stack_to_structure() {
        let mut shell = open_shell();

        ctrl_click(&mut shell, InventorySide::Player, 1);

        assert!(shell
            .simulation()
            .calls()
            .contains(&Call::SelectPlayerSlot(1, true)));
        assert_eq!(
            transfers(&shell),
            vec![TransferRequest {
                structure: assembler(),
                item_name: "Coal Ore".to_string(),
                direction: TransferDirection::ToStructure,
                category: None,
                whole_stack: true,
            }]
        );
    }

    #[test]
    fn ctrl_click_past_end_moves_everything() {
        let mut shell = open_shell();

        ctrl_click(&mut shell, OUTPUT, 4);
        ctrl_click(&mut shell, InventorySide::Player, 7);

        let moves: Vec<_> = shell
            .simulation()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::TransferAll(request) => Some(request),
                _ => None,
            })
            .collect();
        assert_eq!(
            moves,
            vec![
                MoveAllRequest {
                    structure: assembler(),
                    direction: TransferDirection::ToPlayer,
                    category: Some(SlotCategory::Output),
                },
                MoveAllRequest {
                    structure: assembler(),
                    direction: TransferDirection::ToStructure,
                    category: None,
                },
            ]
        );
    }

    #[test]
    fn ctrl_click_without_structure_is_plain_select() {
        let sim = FakeSimulation::with_player(&[("Iron Plate", 20)]);
        let mut shell = Shell::new(sim, ShellOptions::default());
        shell.open_player_inventory();

        ctrl_click(&mut shell, InventorySide::Player, 0);

        assert_eq!(
            shell.selection(),
            &SelectionOwner::PlayerItem("Iron Plate".to_string())
        );
        assert!(transfers(&shell).is_empty());
    }
}
