mod frame;
mod input;
mod layout;
mod loop_runner;
mod perf;
mod popup;
mod rendering;
mod selection;
mod shell;
mod simulation;
#[cfg(test)]
mod testing;
mod tools;
mod transfer;
mod windows;

pub use frame::{FrameReport, FrameStage, RunState, StageSet, StepMode};
pub use input::{InputEvent, Key, Modifiers};
pub use layout::{
    inventory_layout, minimap_rect, minimap_viewport_rect, tool_belt_rect, tool_slot_rect,
    InventoryLayout, Rect, SlotGrid, Vec2, MINIMAP_SIZE, SLOT_SIZE, TILE_SIZE,
};
pub use loop_runner::{run_app, AppError, LoopConfig, STEP_MODE_ENV_VAR};
pub use perf::{LoopRateSnapshot, RollingMsStats};
pub use popup::{PopupEntry, PopupQueue, POPUP_LIFETIME_TICKS, POPUP_RISE_PER_TICK};
pub use rendering::{
    compose_frame, draw_text, draw_text_fitted, text_width_px, ImageRegion, Renderer, Rgba,
    Surface,
};
pub use selection::{SelectionMachine, SelectionOwner, ToolOutcome};
pub use shell::{CursorIndicators, MenuItem, PanelViews, Shell, ShellOptions, StructureView};
pub use simulation::{
    InventoryLine, InventorySnapshot, MoveAllRequest, PointerButton, RecipeEntry, ResearchEntry,
    SimEvent, Simulation, SlotCategory, StructureInfo, StructurePos, ToolSelection,
    TransferDirection, TransferOutcome, TransferRequest, UiCommand,
};
pub use transfer::{
    drop_effect, plan_transfer, DragPayload, DragToken, DragTokenError, DropEffect, InventorySide,
    SlotRef, DRAG_PAYLOAD_TYPE,
};
pub use windows::{TooltipOwner, WindowHandle, WindowKind, WindowStack, BASE_Z_ORDER};
