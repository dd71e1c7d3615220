//! Screen geometry shared by hit-testing and drawing.
//!
//! Every function here is pure: the shell asks "what is under this point" with the
//! same numbers the compositor uses to paint, so the two can never disagree.

use super::rendering::text_width_px;
use super::simulation::{SlotCategory, StructurePos};
use super::transfer::InventorySide;

pub const TILE_SIZE: f32 = 32.0;
pub const SLOT_SIZE: f32 = 32.0;
pub const SLOT_GAP: f32 = 2.0;
pub const TITLE_BAR_HEIGHT: f32 = 20.0;
pub const PANEL_PADDING: f32 = 8.0;
pub const SECTION_LABEL_HEIGHT: f32 = 14.0;
pub const LIST_ROW_HEIGHT: f32 = 18.0;
pub const INVENTORY_COLUMNS: usize = 10;
pub const MIN_PLAYER_ROWS: usize = 2;
pub const MINIMAP_SIZE: u32 = 200;
pub const MINIMAP_MARGIN: f32 = 8.0;
pub const TOOL_BELT_MARGIN: f32 = 8.0;
const CLOSE_BUTTON_SIZE: f32 = 14.0;
const RECIPE_BUTTON_HEIGHT: f32 = 18.0;
const MIN_LIST_WIDTH: f32 = 160.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

pub fn tool_belt_rect(surface: Vec2, tool_count: usize) -> Rect {
    let width = tool_count as f32 * (SLOT_SIZE + SLOT_GAP) + SLOT_GAP;
    let height = SLOT_SIZE + SLOT_GAP * 2.0;
    Rect::new(
        (surface.x - width) / 2.0,
        surface.y - height - TOOL_BELT_MARGIN,
        width,
        height,
    )
}

pub fn tool_slot_rect(belt: Rect, index: usize) -> Rect {
    Rect::new(
        belt.x + SLOT_GAP + index as f32 * (SLOT_SIZE + SLOT_GAP),
        belt.y + SLOT_GAP,
        SLOT_SIZE,
        SLOT_SIZE,
    )
}

pub fn tool_slot_at(surface: Vec2, tool_count: usize, point: Vec2) -> Option<usize> {
    let belt = tool_belt_rect(surface, tool_count);
    if !belt.contains(point) {
        return None;
    }
    (0..tool_count).find(|index| tool_slot_rect(belt, *index).contains(point))
}

pub fn minimap_rect(surface: Vec2) -> Rect {
    let size = MINIMAP_SIZE as f32;
    Rect::new(surface.x - size - MINIMAP_MARGIN, MINIMAP_MARGIN, size, size)
}

/// Rectangle, in minimap pixels, covering the tiles visible in the world view.
///
/// The minimap is always centred on the viewport, so the rectangle is centred too.
pub fn minimap_viewport_rect(world_px: Vec2, scale: f32, minimap_size: f32) -> Rect {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    let width = world_px.x / scale / TILE_SIZE;
    let height = world_px.y / scale / TILE_SIZE;
    Rect::new(
        (minimap_size - width) / 2.0,
        (minimap_size - height) / 2.0,
        width,
        height,
    )
}

pub fn title_bar_rect(window: Rect) -> Rect {
    Rect::new(window.x, window.y, window.width, TITLE_BAR_HEIGHT)
}

pub fn close_button_rect(window: Rect) -> Rect {
    let inset = (TITLE_BAR_HEIGHT - CLOSE_BUTTON_SIZE) / 2.0;
    Rect::new(
        window.right() - CLOSE_BUTTON_SIZE - inset,
        window.y + inset,
        CLOSE_BUTTON_SIZE,
        CLOSE_BUTTON_SIZE,
    )
}

pub fn content_origin(window: Rect) -> Vec2 {
    Vec2::new(
        window.x + PANEL_PADDING,
        window.y + TITLE_BAR_HEIGHT + PANEL_PADDING,
    )
}

/// Slots drawn for a list of `populated` stacks: always at least one empty slot, whole rows.
pub fn visible_slot_count(populated: usize) -> usize {
    let wanted = (populated + 1).max(INVENTORY_COLUMNS);
    wanted.div_ceil(INVENTORY_COLUMNS) * INVENTORY_COLUMNS
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotGrid {
    pub side: InventorySide,
    pub label: String,
    pub label_origin: Vec2,
    pub origin: Vec2,
    pub slots: usize,
}

impl SlotGrid {
    pub fn slot_rect(&self, index: usize) -> Rect {
        let column = index % INVENTORY_COLUMNS;
        let row = index / INVENTORY_COLUMNS;
        Rect::new(
            self.origin.x + column as f32 * (SLOT_SIZE + SLOT_GAP),
            self.origin.y + row as f32 * (SLOT_SIZE + SLOT_GAP),
            SLOT_SIZE,
            SLOT_SIZE,
        )
    }

    pub fn slot_at(&self, point: Vec2) -> Option<usize> {
        if !self.bounds().contains(point) {
            return None;
        }
        (0..self.slots).find(|index| self.slot_rect(*index).contains(point))
    }

    pub fn bounds(&self) -> Rect {
        let rows = self.slots.div_ceil(INVENTORY_COLUMNS);
        Rect::new(
            self.origin.x,
            self.origin.y,
            grid_width(),
            rows as f32 * (SLOT_SIZE + SLOT_GAP),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryLayout {
    pub grids: Vec<SlotGrid>,
    pub recipe_button: Option<Rect>,
    pub size: Vec2,
}

impl InventoryLayout {
    pub fn grid_at(&self, point: Vec2) -> Option<&SlotGrid> {
        self.grids.iter().find(|grid| grid.bounds().contains(point))
    }
}

/// Per-category slot counts of the structure shown next to the player grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSection<'a> {
    pub pos: StructurePos,
    pub name: &'a str,
    pub categories: Vec<(SlotCategory, usize)>,
    pub recipes_enabled: bool,
}

pub fn inventory_layout(
    window_origin: Vec2,
    player_populated: usize,
    structure: Option<&StructureSection<'_>>,
) -> InventoryLayout {
    let left = window_origin.x + PANEL_PADDING;
    let mut y = window_origin.y + TITLE_BAR_HEIGHT + PANEL_PADDING;
    let mut grids = Vec::new();
    let mut recipe_button = None;

    if let Some(section) = structure {
        for (category, populated) in &section.categories {
            let label_origin = Vec2::new(left, y);
            y += SECTION_LABEL_HEIGHT;
            let grid = SlotGrid {
                side: InventorySide::Structure(section.pos, *category),
                label: format!("{} {}", section.name, category.label()),
                label_origin,
                origin: Vec2::new(left, y),
                slots: visible_slot_count(*populated),
            };
            y += grid.bounds().height + PANEL_PADDING;
            grids.push(grid);
        }
        if section.recipes_enabled {
            recipe_button = Some(Rect::new(left, y, grid_width(), RECIPE_BUTTON_HEIGHT));
            y += RECIPE_BUTTON_HEIGHT + PANEL_PADDING;
        }
    }

    let label_origin = Vec2::new(left, y);
    y += SECTION_LABEL_HEIGHT;
    let player = SlotGrid {
        side: InventorySide::Player,
        label: "Player".to_string(),
        label_origin,
        origin: Vec2::new(left, y),
        slots: visible_slot_count(player_populated).max(MIN_PLAYER_ROWS * INVENTORY_COLUMNS),
    };
    y += player.bounds().height + PANEL_PADDING;
    grids.push(player);

    InventoryLayout {
        grids,
        recipe_button,
        size: Vec2::new(grid_width() + PANEL_PADDING * 2.0, y - window_origin.y),
    }
}

pub fn list_row_rect(window: Rect, index: usize) -> Rect {
    let origin = content_origin(window);
    Rect::new(
        origin.x,
        origin.y + index as f32 * LIST_ROW_HEIGHT,
        window.width - PANEL_PADDING * 2.0,
        LIST_ROW_HEIGHT,
    )
}

pub fn list_row_at(window: Rect, rows: usize, point: Vec2) -> Option<usize> {
    (0..rows).find(|index| list_row_rect(window, *index).contains(point))
}

pub fn list_window_size(rows: usize, longest_label_chars: usize) -> Vec2 {
    let width = (text_width_px(longest_label_chars) as f32 + PANEL_PADDING * 2.0).max(MIN_LIST_WIDTH);
    let height = TITLE_BAR_HEIGHT + PANEL_PADDING * 2.0 + rows.max(1) as f32 * LIST_ROW_HEIGHT;
    Vec2::new(width, height)
}

fn grid_width() -> f32 {
    INVENTORY_COLUMNS as f32 * (SLOT_SIZE + SLOT_GAP)
}
