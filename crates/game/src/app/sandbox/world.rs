use std::collections::BTreeMap;

use controller::{AssetBundle, ImageDescriptor, Rect, Rgba, StructurePos, Surface, Vec2, TILE_SIZE};
use serde::{Deserialize, Serialize};

use super::structures::{Structure, StructureKind};

pub(crate) const MAP_WIDTH: i32 = 96;
pub(crate) const MAP_HEIGHT: i32 = 64;

const MIN_SCALE: f32 = 0.5;
const MAX_SCALE: f32 = 2.0;
const ZOOM_STEP: f32 = 1.25;

const VOID_COLOR: Rgba = [8, 8, 10, 255];
const STRUCTURE_BORDER: Rgba = [20, 20, 24, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terrain {
    Dirt,
    IronOre,
    CopperOre,
    CoalOre,
    StoneOre,
}

// (kind, centre x, centre y, radius in tiles)
const ORE_PATCHES: &[(Terrain, i32, i32, i32)] = &[
    (Terrain::IronOre, 12, 10, 4),
    (Terrain::CopperOre, 26, 14, 3),
    (Terrain::CoalOre, 16, 22, 3),
    (Terrain::StoneOre, 34, 6, 2),
    (Terrain::IronOre, 70, 40, 6),
    (Terrain::CoalOre, 58, 48, 4),
];

impl Terrain {
    pub(crate) const fn ore_item(self) -> Option<&'static str> {
        match self {
            Terrain::Dirt => None,
            Terrain::IronOre => Some("Iron Ore"),
            Terrain::CopperOre => Some("Copper Ore"),
            Terrain::CoalOre => Some("Coal Ore"),
            Terrain::StoneOre => Some("Stone Ore"),
        }
    }

    const fn image_key(self) -> &'static str {
        match self {
            Terrain::Dirt => "dirt",
            Terrain::IronOre => "iron",
            Terrain::CopperOre => "copper",
            Terrain::CoalOre => "coal",
            Terrain::StoneOre => "stone",
        }
    }

    const fn color(self) -> Rgba {
        match self {
            Terrain::Dirt => [86, 66, 44, 255],
            Terrain::IronOre => [96, 112, 140, 255],
            Terrain::CopperOre => [176, 104, 64, 255],
            Terrain::CoalOre => [36, 36, 40, 255],
            Terrain::StoneOre => [150, 140, 120, 255],
        }
    }
}

pub(crate) fn in_bounds(pos: StructurePos) -> bool {
    (0..MAP_WIDTH).contains(&pos.x) && (0..MAP_HEIGHT).contains(&pos.y)
}

pub(crate) fn terrain_at(pos: StructurePos) -> Option<Terrain> {
    if !in_bounds(pos) {
        return None;
    }
    let ore = ORE_PATCHES.iter().find(|(_, x, y, radius)| {
        let dx = pos.x - x;
        let dy = pos.y - y;
        dx * dx + dy * dy <= radius * radius
    });
    Some(ore.map_or(Terrain::Dirt, |(terrain, ..)| *terrain))
}

const fn structure_color(kind: StructureKind) -> Rgba {
    match kind {
        StructureKind::Chest => [168, 120, 56, 255],
        StructureKind::Furnace => [120, 120, 128, 255],
        StructureKind::Assembler => [80, 120, 168, 255],
        StructureKind::Lab => [96, 168, 120, 255],
    }
}

/// Screen-to-world mapping. `x`/`y` is the world pixel at the top-left corner of the view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct Camera {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl Camera {
    pub(crate) fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(self.x + screen.x / self.scale, self.y + screen.y / self.scale)
    }

    pub(crate) fn tile_at(&self, screen: Vec2) -> StructurePos {
        let world = self.screen_to_world(screen);
        StructurePos::new(
            (world.x / TILE_SIZE).floor() as i32,
            (world.y / TILE_SIZE).floor() as i32,
        )
    }

    /// Screen position of the centre of `pos`.
    pub(crate) fn tile_center(&self, pos: StructurePos) -> Vec2 {
        let world_x = (pos.x as f32 + 0.5) * TILE_SIZE;
        let world_y = (pos.y as f32 + 0.5) * TILE_SIZE;
        Vec2::new(
            (world_x - self.x) * self.scale,
            (world_y - self.y) * self.scale,
        )
    }

    /// Moves the view by a screen-space delta.
    pub(crate) fn pan(&mut self, screen_dx: f32, screen_dy: f32) {
        self.x += screen_dx / self.scale;
        self.y += screen_dy / self.scale;
    }

    /// Zooms by `steps` wheel notches keeping the world point under `anchor` in place.
    pub(crate) fn zoom(&mut self, steps: i32, anchor: Vec2) {
        let before = self.screen_to_world(anchor);
        let factor = ZOOM_STEP.powi(steps);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.x = before.x - anchor.x / self.scale;
        self.y = before.y - anchor.y / self.scale;
    }

    /// Tile coordinate, fractional, at the centre of a view `view_px` wide and high.
    pub(crate) fn center_tile(&self, view_px: Vec2) -> Vec2 {
        let centre = self.screen_to_world(Vec2::new(view_px.x / 2.0, view_px.y / 2.0));
        Vec2::new(centre.x / TILE_SIZE, centre.y / TILE_SIZE)
    }

    /// Moves the view so the fractional tile coordinate `tile` sits at its centre.
    pub(crate) fn center_on(&mut self, tile: Vec2, view_px: Vec2) {
        self.x = tile.x * TILE_SIZE - view_px.x / 2.0 / self.scale;
        self.y = tile.y * TILE_SIZE - view_px.y / 2.0 / self.scale;
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (MIN_SCALE..=MAX_SCALE).contains(&self.scale)
    }
}

pub(crate) fn render_world(
    surface: &mut Surface,
    camera: &Camera,
    structures: &BTreeMap<StructurePos, Structure>,
    assets: &AssetBundle,
) {
    surface.clear(VOID_COLOR);
    let view = surface.size();
    let top_left = camera.tile_at(Vec2::ZERO);
    let bottom_right = camera.tile_at(view);
    let tile_px = TILE_SIZE * camera.scale;

    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            let pos = StructurePos::new(x, y);
            let Some(terrain) = terrain_at(pos) else {
                continue;
            };
            let centre = camera.tile_center(pos);
            let rect = Rect::new(
                centre.x - tile_px / 2.0,
                centre.y - tile_px / 2.0,
                tile_px,
                tile_px,
            );
            let descriptor = ImageDescriptor {
                key: terrain.image_key(),
                width_factor: 1,
                height_factor: 1,
            };
            match assets.get(descriptor.key) {
                Some(image) => surface.blit_scaled(&image.first_frame(&descriptor), rect),
                None => surface.fill(rect, terrain.color()),
            }
            if let Some(structure) = structures.get(&pos) {
                let name = structure.kind.item_name();
                match assets.item_icon(name) {
                    Some(icon) => surface.blit_scaled(&icon, rect),
                    None => surface.fill(rect, structure_color(structure.kind)),
                }
                surface.outline(rect, STRUCTURE_BORDER);
            }
        }
    }
}

/// One minimap pixel per tile, centred on the view.
pub(crate) fn render_minimap(
    surface: &mut Surface,
    camera: &Camera,
    view_px: Vec2,
    structures: &BTreeMap<StructurePos, Structure>,
) {
    surface.clear(VOID_COLOR);
    let centre = camera.center_tile(view_px);
    let half_w = surface.width() as f32 / 2.0;
    let half_h = surface.height() as f32 / 2.0;
    for my in 0..surface.height() {
        for mx in 0..surface.width() {
            let pos = StructurePos::new(
                (centre.x + mx as f32 - half_w).floor() as i32,
                (centre.y + my as f32 - half_h).floor() as i32,
            );
            let color = match structures.get(&pos) {
                Some(structure) => structure_color(structure.kind),
                None => match terrain_at(pos) {
                    Some(terrain) => terrain.color(),
                    None => continue,
                },
            };
            surface.blend_pixel(mx as i32, my as i32, color);
        }
    }
}
