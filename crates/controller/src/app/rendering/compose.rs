use crate::app::frame::RunState;
use crate::app::layout::{
    close_button_rect, list_row_rect, minimap_rect, title_bar_rect, tool_belt_rect,
    tool_slot_rect, Rect, Vec2, SLOT_SIZE, TITLE_BAR_HEIGHT,
};
use crate::app::selection::SelectionOwner;
use crate::app::shell::Shell;
use crate::app::simulation::Simulation;
use crate::app::transfer::{DropEffect, InventorySide};
use crate::app::windows::{WindowHandle, WindowKind};
use crate::assets::AssetBundle;

use super::surface::{Rgba, Surface};
use super::text::{draw_text, draw_text_fitted, text_width_px, GLYPH_ADVANCE, LINE_ADVANCE};

const PANEL_BG: Rgba = [28, 31, 38, 236];
const PANEL_BORDER: Rgba = [92, 106, 126, 255];
const TITLE_BG: Rgba = [48, 56, 70, 255];
const TITLE_TEXT: Rgba = [236, 240, 246, 255];
const BODY_TEXT: Rgba = [214, 220, 228, 255];
const DIM_TEXT: Rgba = [150, 160, 176, 255];
const SLOT_BG: Rgba = [52, 56, 64, 255];
const SLOT_BORDER: Rgba = [80, 86, 98, 255];
const SELECTED_BORDER: Rgba = [255, 208, 64, 255];
const ROW_HOVER: Rgba = [64, 74, 92, 255];
const TOOLTIP_BG: Rgba = [12, 14, 18, 240];
const POPUP_TEXT: Rgba = [255, 244, 160, 255];
const PAUSED_TEXT: Rgba = [255, 120, 96, 255];
const DROP_MOVE: Rgba = [96, 220, 120, 255];
const DROP_NONE: Rgba = [220, 80, 80, 255];
const PERF_OVERLAY_ORIGIN: (i32, i32) = (8, 8);
const HELD_ITEM_OFFSET: f32 = 10.0;

/// Paints one full frame into `target`, resizing it to the world surface.
///
/// Layers, bottom to top: world, minimap, tool belt, floating windows in z order, drag
/// ghost, popups, held-item cursor, perf overlay.
pub fn compose_frame<S: Simulation>(
    shell: &Shell<S>,
    assets: Option<&AssetBundle>,
    target: &mut Surface,
) {
    let world = &shell.frame.surfaces.world;
    if target.width() != world.width() || target.height() != world.height() {
        target.resize(world.width(), world.height());
    }
    target.pixels_mut().copy_from_slice(world.pixels());
    let surface_size = target.size();

    let minimap = minimap_rect(surface_size);
    target.blit(
        &shell.frame.surfaces.minimap,
        minimap.x as i32,
        minimap.y as i32,
    );
    target.outline(minimap, PANEL_BORDER);

    draw_tool_belt(shell, target, surface_size);

    for handle in shell.windows.visible_in_order() {
        draw_window(shell, assets, target, handle);
    }

    draw_drag_ghost(shell, assets, target);

    for popup in shell.popups.entries() {
        draw_text(
            target,
            popup.position.x as i32,
            popup.position.y as i32,
            &popup.text,
            POPUP_TEXT,
        );
    }

    if let (Some(held), Some(pointer)) = (&shell.cursor.held_item, shell.pointer) {
        let rect = Rect::new(
            pointer.x + HELD_ITEM_OFFSET,
            pointer.y + HELD_ITEM_OFFSET,
            SLOT_SIZE,
            SLOT_SIZE,
        );
        draw_item(target, assets, &held.item_name, held.count, rect);
    }

    if shell.frame.perf_overlay {
        let (x, y) = PERF_OVERLAY_ORIGIN;
        target.blit(&shell.frame.surfaces.perf, x, y);
    }
    if shell.frame.run_state == RunState::Paused {
        let text = "PAUSED";
        let x = (surface_size.x as i32 - text_width_px(text.len())) / 2;
        draw_text(target, x, LINE_ADVANCE, text, PAUSED_TEXT);
    }
}

fn draw_tool_belt<S: Simulation>(shell: &Shell<S>, target: &mut Surface, surface_size: Vec2) {
    let count = shell.sim.tool_count();
    if count == 0 {
        return;
    }
    let belt = tool_belt_rect(surface_size, count);
    target.fill(belt, PANEL_BG);
    target.outline(belt, PANEL_BORDER);

    let mut icon = Surface::new(SLOT_SIZE as u32, SLOT_SIZE as u32);
    for index in 0..count {
        let slot = tool_slot_rect(belt, index);
        target.fill(slot, SLOT_BG);
        icon.clear([0, 0, 0, 0]);
        shell.sim.render_tool(index, &mut icon);
        target.blit(&icon, slot.x as i32, slot.y as i32);
        let border = if shell.cursor.tool_highlight == Some(index) {
            SELECTED_BORDER
        } else {
            SLOT_BORDER
        };
        target.outline(slot, border);
    }
}

fn draw_window<S: Simulation>(
    shell: &Shell<S>,
    assets: Option<&AssetBundle>,
    target: &mut Surface,
    handle: &WindowHandle,
) {
    let rect = handle.rect();
    if handle.kind() == WindowKind::Tooltip {
        target.fill(rect, TOOLTIP_BG);
        target.outline(rect, PANEL_BORDER);
        draw_text(
            target,
            rect.x as i32 + 6,
            rect.y as i32 + 6,
            &shell.panels.tooltip_text,
            BODY_TEXT,
        );
        return;
    }

    target.fill(rect, PANEL_BG);
    let title = title_bar_rect(rect);
    target.fill(title, TITLE_BG);
    draw_text_fitted(
        target,
        title.x as i32 + 6,
        title.y as i32 + (TITLE_BAR_HEIGHT as i32 - LINE_ADVANCE) / 2 + 2,
        window_title(shell, handle.kind()),
        title.width as i32 - 30,
        TITLE_TEXT,
    );
    let close = close_button_rect(rect);
    target.outline(close, PANEL_BORDER);
    draw_text(
        target,
        close.x as i32 + (close.width as i32 - GLYPH_ADVANCE) / 2 + 1,
        close.y as i32 + 2,
        "x",
        TITLE_TEXT,
    );
    target.outline(rect, PANEL_BORDER);

    match handle.kind() {
        WindowKind::Inventory => draw_inventory(shell, assets, target, rect),
        WindowKind::RecipeSelector | WindowKind::ResearchSelector | WindowKind::MainMenu => {
            draw_list(shell, target, handle.kind(), rect)
        }
        WindowKind::Tooltip => {}
    }
}

fn window_title<S: Simulation>(shell: &Shell<S>, kind: WindowKind) -> &str {
    match (kind, &shell.panels.structure) {
        (WindowKind::Inventory, Some(view)) => &view.info.name,
        _ => kind.title(),
    }
}

fn draw_inventory<S: Simulation>(
    shell: &Shell<S>,
    assets: Option<&AssetBundle>,
    target: &mut Surface,
    window: Rect,
) {
    let layout = shell.inventory_layout_at(window.origin());
    let held = shell.selection.owner().held_item_name();
    for grid in &layout.grids {
        draw_text(
            target,
            grid.label_origin.x as i32,
            grid.label_origin.y as i32,
            &grid.label,
            DIM_TEXT,
        );
        let lines = shell.panels.lines(grid.side);
        let held_here = held.filter(|_| held_side_matches(shell, grid.side));
        for index in 0..grid.slots {
            let slot = grid.slot_rect(index);
            target.fill(slot, SLOT_BG);
            let mut border = SLOT_BORDER;
            if let Some(line) = lines.get(index) {
                draw_item(target, assets, &line.item_name, line.count, slot);
                if held_here == Some(line.item_name.as_str()) {
                    border = SELECTED_BORDER;
                }
            }
            target.outline(slot, border);
        }
    }
    if let Some(button) = layout.recipe_button {
        target.fill(button, SLOT_BG);
        target.outline(button, PANEL_BORDER);
        draw_text(
            target,
            button.x as i32 + 6,
            button.y as i32 + 2,
            "Choose recipe",
            BODY_TEXT,
        );
    }
}

fn held_side_matches<S: Simulation>(shell: &Shell<S>, side: InventorySide) -> bool {
    match (shell.selection.owner(), side) {
        (SelectionOwner::PlayerItem(_), InventorySide::Player) => true,
        (
            SelectionOwner::StructureItem { pos, category, .. },
            InventorySide::Structure(grid_pos, grid_category),
        ) => *pos == grid_pos && *category == grid_category,
        _ => false,
    }
}

fn draw_list<S: Simulation>(shell: &Shell<S>, target: &mut Surface, kind: WindowKind, window: Rect) {
    let rows = shell.list_rows(kind);
    let hovered = shell
        .pointer
        .filter(|pointer| window.contains(*pointer))
        .and_then(|pointer| (0..rows.len()).find(|i| list_row_rect(window, *i).contains(pointer)));
    if rows.is_empty() {
        let first = list_row_rect(window, 0);
        draw_text(target, first.x as i32 + 4, first.y as i32 + 2, "(none)", DIM_TEXT);
        return;
    }
    for (index, row) in rows.iter().enumerate() {
        let rect = list_row_rect(window, index);
        if hovered == Some(index) {
            target.fill(rect, ROW_HOVER);
        }
        draw_text_fitted(
            target,
            rect.x as i32 + 4,
            rect.y as i32 + 2,
            row,
            rect.width as i32 - 8,
            BODY_TEXT,
        );
    }
}

fn draw_drag_ghost<S: Simulation>(
    shell: &Shell<S>,
    assets: Option<&AssetBundle>,
    target: &mut Surface,
) {
    let (Some(gesture), Some(pointer)) = (&shell.gesture, shell.pointer) else {
        return;
    };
    let (Some(effect), Some(name)) = (gesture.drag_effect(), &gesture.item_name) else {
        return;
    };
    let rect = Rect::new(
        pointer.x - SLOT_SIZE / 2.0,
        pointer.y - SLOT_SIZE / 2.0,
        SLOT_SIZE,
        SLOT_SIZE,
    );
    draw_item(target, assets, name, 0, rect);
    let border = match effect {
        DropEffect::Move => DROP_MOVE,
        DropEffect::None => DROP_NONE,
    };
    target.outline(rect, border);
}

/// Item artwork scaled into `rect`, or a coloured tile with initials for names without
/// artwork. A zero `count` draws no count.
fn draw_item(
    target: &mut Surface,
    assets: Option<&AssetBundle>,
    item_name: &str,
    count: u32,
    rect: Rect,
) {
    match assets.and_then(|bundle| bundle.item_icon(item_name)) {
        Some(icon) => target.blit_scaled(&icon, rect),
        None => {
            let inset = Rect::new(rect.x + 3.0, rect.y + 3.0, rect.width - 6.0, rect.height - 6.0);
            target.fill(inset, placeholder_color(item_name));
            draw_text(
                target,
                inset.x as i32 + 2,
                inset.y as i32 + 2,
                &initials(item_name),
                TITLE_TEXT,
            );
        }
    }
    if count > 0 {
        let text = count.to_string();
        let x = (rect.right() as i32) - text_width_px(text.chars().count()) - 1;
        let y = (rect.bottom() as i32) - LINE_ADVANCE + 3;
        draw_text(target, x, y, &text, TITLE_TEXT);
    }
}

fn initials(item_name: &str) -> String {
    item_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect()
}

fn placeholder_color(item_name: &str) -> Rgba {
    let hash = item_name
        .bytes()
        .fold(2166136261u32, |acc, byte| (acc ^ byte as u32).wrapping_mul(16777619));
    [
        64 + (hash & 0x7f) as u8,
        64 + ((hash >> 8) & 0x7f) as u8,
        64 + ((hash >> 16) & 0x7f) as u8,
        255,
    ]
}
