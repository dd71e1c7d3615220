use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod assets;
pub mod storage;

pub use app::{
    compose_frame, drop_effect, minimap_rect, plan_transfer, run_app, AppError, CursorIndicators,
    DragPayload, DragToken, DragTokenError, DropEffect, FrameReport, FrameStage, ImageRegion,
    InputEvent, InventoryLine, InventorySide, InventorySnapshot, Key, LoopConfig,
    LoopRateSnapshot, MenuItem, Modifiers, MoveAllRequest, PanelViews, PointerButton, PopupEntry,
    PopupQueue, RecipeEntry, Rect, ResearchEntry, Rgba, RunState, SelectionMachine,
    SelectionOwner, Shell, ShellOptions, SimEvent, Simulation, SlotCategory, SlotRef, StageSet,
    StepMode, StructureInfo, StructurePos, StructureView, Surface, ToolOutcome, ToolSelection,
    TooltipOwner, TransferDirection, TransferOutcome, TransferRequest, UiCommand, Vec2,
    WindowHandle, WindowKind, WindowStack, BASE_Z_ORDER, DRAG_PAYLOAD_TYPE, MINIMAP_SIZE,
    POPUP_LIFETIME_TICKS, POPUP_RISE_PER_TICK, SLOT_SIZE, STEP_MODE_ENV_VAR, TILE_SIZE,
};
pub use assets::{AssetBundle, AssetError, AssetRegistry, DecodedImage, ImageDescriptor};
pub use storage::{SaveStore, StorageError};

pub const ROOT_ENV_VAR: &str = "IRONWORKS_ROOT";
pub const SAVE_DIR_ENV_VAR: &str = "IRONWORKS_SAVE_DIR";

const IMAGE_SUBDIR: [&str; 2] = ["assets", "img"];
const SAVE_SUBDIR: &str = "saves";

/// Where the game reads its artwork and keeps its saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub image_dir: PathBuf,
    pub save_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("IRONWORKS_ROOT={path} has no assets/img directory")]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "no assets/img directory found above the working directory or the executable \
(searched {searched} directories); set IRONWORKS_ROOT to the game directory"
    )]
    AssetsNotFound { searched: usize },
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves the game directory and makes sure the save directory exists.
///
/// `IRONWORKS_ROOT` wins when set. Otherwise the first ancestor of the working directory,
/// then of the executable, that holds `assets/img` is used. `IRONWORKS_SAVE_DIR` moves the
/// saves out of `<root>/saves`.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = match read_env(ROOT_ENV_VAR)? {
        Some(value) => {
            let path = PathBuf::from(value);
            if !has_image_dir(&path) {
                return Err(StartupError::InvalidEnvRoot { path });
            }
            path
        }
        None => {
            let candidates = search_candidates();
            find_game_root(&candidates).ok_or(StartupError::AssetsNotFound {
                searched: candidates.len(),
            })?
        }
    };
    let save_dir = read_env(SAVE_DIR_ENV_VAR)?.map(PathBuf::from);
    let paths = app_paths_for(root, save_dir);

    fs::create_dir_all(&paths.save_dir).map_err(|source| StartupError::CreateSaveDir {
        path: paths.save_dir.clone(),
        source,
    })?;
    Ok(paths)
}

fn read_env(var: &'static str) -> Result<Option<String>, StartupError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn app_paths_for(root: PathBuf, save_dir: Option<PathBuf>) -> AppPaths {
    let image_dir = IMAGE_SUBDIR.iter().fold(root.clone(), |dir, part| dir.join(part));
    let save_dir = save_dir.unwrap_or_else(|| root.join(SAVE_SUBDIR));
    AppPaths {
        root,
        image_dir,
        save_dir,
    }
}

/// Working directory ancestors first, so `cargo run` from a checkout finds its own assets.
fn search_candidates() -> Vec<PathBuf> {
    let mut starts = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        starts.push(cwd);
    }
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        starts.push(exe_dir);
    }
    let mut candidates: Vec<PathBuf> = Vec::new();
    for start in &starts {
        for dir in start.ancestors() {
            if !candidates.iter().any(|seen| seen == dir) {
                candidates.push(dir.to_path_buf());
            }
        }
    }
    candidates
}

fn find_game_root(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| has_image_dir(dir))
        .cloned()
}

fn has_image_dir(dir: &Path) -> bool {
    IMAGE_SUBDIR
        .iter()
        .fold(dir.to_path_buf(), |path, part| path.join(part))
        .is_dir()
}
