use std::collections::BTreeSet;

use controller::StructurePos;
use serde::{Deserialize, Serialize};

use super::inventory::Inventory;
use super::research::Research;
use super::structures::Structure;
use super::world::{in_bounds, Camera};
use super::BELT_SLOTS;

pub(crate) const SAVE_VERSION: u32 = 1;

pub(crate) type SaveLoadResult<T> = Result<T, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SaveGame {
    pub(crate) save_version: u32,
    pub(crate) camera: Camera,
    pub(crate) player: Inventory,
    pub(crate) belt: Vec<Option<String>>,
    pub(crate) structures: Vec<SavedStructure>,
    pub(crate) research: Research,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SavedStructure {
    pub(crate) pos: StructurePos,
    pub(crate) structure: Structure,
}

pub(crate) fn encode_save(save: &SaveGame) -> SaveLoadResult<String> {
    serde_json::to_string_pretty(save).map_err(|error| format!("encode save json: {error}"))
}

pub(crate) fn decode_save(raw: &str) -> SaveLoadResult<SaveGame> {
    let save = parse_save_game_json(raw)?;
    validate_save_game(&save)?;
    Ok(save)
}

fn parse_save_game_json(raw: &str) -> SaveLoadResult<SaveGame> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, SaveGame>(&mut deserializer) {
        Ok(save) => Ok(save),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse save json: {source}"))
            } else {
                Err(format!("parse save json at {path}: {source}"))
            }
        }
    }
}

fn validation_err(path: &str, message: impl Into<String>) -> String {
    format!("validation failed at {path}: {}", message.into())
}

fn validate_save_game(save: &SaveGame) -> SaveLoadResult<()> {
    if save.save_version != SAVE_VERSION {
        return Err(validation_err(
            "$.save_version",
            format!("expected {SAVE_VERSION}, found {}", save.save_version),
        ));
    }
    if !save.camera.is_valid() {
        return Err(validation_err("$.camera", "non-finite position or scale out of range"));
    }
    if save.belt.len() != BELT_SLOTS {
        return Err(validation_err(
            "$.belt",
            format!("expected {BELT_SLOTS} slots, found {}", save.belt.len()),
        ));
    }
    let mut seen = BTreeSet::new();
    for (index, saved) in save.structures.iter().enumerate() {
        let path = format!("$.structures[{index}]");
        if !in_bounds(saved.pos) {
            return Err(validation_err(&path, format!("{:?} is outside the map", saved.pos)));
        }
        if !seen.insert(saved.pos) {
            return Err(validation_err(&path, format!("duplicate position {:?}", saved.pos)));
        }
        saved
            .structure
            .validate()
            .map_err(|message| validation_err(&path, message))?;
    }
    save.research
        .validate()
        .map_err(|message| validation_err("$.research", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::sandbox::structures::StructureKind;

    fn sample_save() -> SaveGame {
        SaveGame {
            save_version: SAVE_VERSION,
            camera: Camera::default(),
            player: Inventory::from_counts(&[("Coal Ore", 12)]),
            belt: vec![None; BELT_SLOTS],
            structures: vec![SavedStructure {
                pos: StructurePos::new(3, 4),
                structure: Structure::new(StructureKind::Furnace),
            }],
            research: Research::default(),
        }
    }

    #[test]
    fn encoded_save_decodes_to_same_state() {
        let save = sample_save();
        let raw = encode_save(&save).expect("encode");
        assert_eq!(decode_save(&raw), Ok(save));
    }

    #[test]
    fn parse_error_names_the_offending_field() {
        let mut value: serde_json::Value =
            serde_json::from_str(&encode_save(&sample_save()).expect("encode")).expect("json");
        value["camera"]["scale"] = serde_json::Value::String("big".to_string());

        let error = decode_save(&value.to_string()).expect_err("bad scale");
        assert!(error.contains("camera.scale"), "{error}");
    }

    #[test]
    fn duplicate_structure_positions_are_rejected() {
        let mut save = sample_save();
        save.structures.push(save.structures[0].clone());

        let error = decode_save(&encode_save(&save).expect("encode")).expect_err("duplicate");
        assert!(error.contains("$.structures[1]"), "{error}");
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut save = sample_save();
        save.save_version = SAVE_VERSION + 1;

        let error = decode_save(&encode_save(&save).expect("encode")).expect_err("version");
        assert!(error.contains("save_version"), "{error}");
    }
}
