use crate::scene::SceneState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Pretty JSON writer shared by scene, palette and settings files.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&json)?;
    Ok(value)
}

pub fn save_scene_to_file(scene: &SceneState, path: &Path) -> Result<()> {
    save_json(scene, path)
}

pub fn load_scene_from_file(path: &Path) -> Result<SceneState> {
    load_json(path)
}

#[cfg(test)]
pub(crate) fn temp_path(stem: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("{}_{}_{}.json", stem, std::process::id(), nonce));
    path
}
