//! Item and structure artwork.
//!
//! [`AssetRegistry`] maps a logical item name to the sprite sheet that draws it. Sheets for
//! multi-tile structures hold several frames side by side (or stacked), so each descriptor
//! carries width/height factors: the first frame is `width / width_factor` by
//! `height / height_factor` pixels. [`load_assets`] decodes every registered sheet up
//! front and fails on the first unreadable file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::app::ImageRegion;

/// `(key, file name)` of every image decoded at startup.
pub const REGISTERED_IMAGES: &[(&str, &str)] = &[
    ("dirt", "dirt.png"),
    ("backTiles", "back32.png"),
    ("weeds", "weeds.png"),
    ("iron", "iron.png"),
    ("coal", "coal.png"),
    ("copper", "copper.png"),
    ("stone", "stone.png"),
    ("transport", "transport.png"),
    ("undergroundBelt", "underbelt.png"),
    ("chest", "chest.png"),
    ("mine", "mine.png"),
    ("furnace", "furnace.png"),
    ("assembler", "assembler.png"),
    ("boiler", "boiler.png"),
    ("steamEngine", "steam-engine.png"),
    ("electPole", "elect-pole.png"),
    ("splitter", "splitter.png"),
    ("waterWell", "waterwell.png"),
    ("offshorePump", "offshore-pump.png"),
    ("pipe", "pipe.png"),
    ("pipeItem", "pipe-item.png"),
    ("inserter", "inserter-base.png"),
    ("direction", "direction.png"),
    ("ore", "ore.png"),
    ("coalOre", "coal-ore.png"),
    ("ironPlate", "metal.png"),
    ("steelPlate", "steel-plate.png"),
    ("copperOre", "copper-ore.png"),
    ("stoneOre", "stone-ore.png"),
    ("copperPlate", "copper-plate.png"),
    ("gear", "gear.png"),
    ("copperWire", "copper-wire.png"),
    ("circuit", "circuit.png"),
    ("undergroundBeltItem", "underground-belt-item.png"),
    ("time", "time.png"),
    ("smoke", "smoke.png"),
    ("fuelAlarm", "fuel-alarm.png"),
    ("electricityAlarm", "electricity-alarm.png"),
];

// (item name, image key, width factor, height factor)
const ITEM_IMAGES: &[(&str, &str, u32, u32)] = &[
    ("time", "time", 1, 1),
    ("Iron Ore", "ore", 1, 1),
    ("Iron Plate", "ironPlate", 1, 1),
    ("Steel Plate", "steelPlate", 1, 1),
    ("Copper Ore", "copperOre", 1, 1),
    ("Copper Plate", "copperPlate", 1, 1),
    ("Coal Ore", "coalOre", 1, 1),
    ("Stone Ore", "stoneOre", 1, 1),
    ("Gear", "gear", 1, 1),
    ("Copper Wire", "copperWire", 1, 1),
    ("Circuit", "circuit", 1, 1),
    ("Transport Belt", "transport", 1, 1),
    ("Underground Belt", "undergroundBeltItem", 1, 1),
    ("Splitter", "splitter", 1, 1),
    ("Inserter", "inserter", 2, 1),
    ("Chest", "chest", 1, 1),
    ("Ore Mine", "mine", 3, 1),
    ("Furnace", "furnace", 3, 1),
    ("Assembler", "assembler", 4, 1),
    ("Water Well", "waterWell", 1, 1),
    ("Offshore Pump", "offshorePump", 1, 1),
    ("Boiler", "boiler", 3, 1),
    ("Pipe", "pipeItem", 1, 1),
    ("Steam Engine", "steamEngine", 3, 1),
    ("Electric Pole", "electPole", 1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub key: &'static str,
    pub width_factor: u32,
    pub height_factor: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssetRegistry;

impl AssetRegistry {
    /// Unknown names have no artwork; callers draw a fallback.
    pub fn lookup(name: &str) -> Option<ImageDescriptor> {
        ITEM_IMAGES
            .iter()
            .find(|(item, ..)| *item == name)
            .map(|(_, key, width_factor, height_factor)| ImageDescriptor {
                key: *key,
                width_factor: *width_factor,
                height_factor: *height_factor,
            })
    }

    pub fn file_for_key(key: &str) -> Option<&'static str> {
        REGISTERED_IMAGES
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, file)| *file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn first_frame(&self, descriptor: &ImageDescriptor) -> ImageRegion<'_> {
        ImageRegion {
            pixels: &self.rgba,
            stride: self.width,
            x: 0,
            y: 0,
            width: self.width / descriptor.width_factor.max(1),
            height: self.height / descriptor.height_factor.max(1),
        }
    }
}

/// Every decoded sheet, keyed by image key. Shared with the engine after startup.
#[derive(Debug, Default)]
pub struct AssetBundle {
    images: HashMap<String, DecodedImage>,
}

impl AssetBundle {
    pub fn get(&self, key: &str) -> Option<&DecodedImage> {
        self.images.get(key)
    }

    /// First frame of the artwork registered for `item_name`.
    pub fn item_icon(&self, item_name: &str) -> Option<ImageRegion<'_>> {
        let descriptor = AssetRegistry::lookup(item_name)?;
        let image = self.images.get(descriptor.key)?;
        Some(image.first_frame(&descriptor))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, image: DecodedImage) {
        self.images.insert(key.into(), image);
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub fn load_assets(image_dir: &Path) -> Result<AssetBundle, AssetError> {
    load_assets_from(image_dir, REGISTERED_IMAGES)
}

pub fn load_assets_from(
    image_dir: &Path,
    entries: &[(&str, &str)],
) -> Result<AssetBundle, AssetError> {
    let mut bundle = AssetBundle::default();
    for (key, file) in entries {
        let path = image_dir.join(file);
        let image = decode_image(&path)?;
        debug!(key, width = image.width, height = image.height, "image_decoded");
        bundle.insert(*key, image);
    }
    Ok(bundle)
}

fn decode_image(path: &Path) -> Result<DecodedImage, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(DecodedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
