//! Save and restore.
//!
//! A save is the serialized [`SimulationState`], gzip-compressed JSON.
//! Transient fields (pending messages, redraw bits, the save path itself)
//! are skipped and start empty on load; the RNG restarts from its seed.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::gameloop::SimulationState;

use super::errors::SaveError;

fn io_err(path: &Path, source: std::io::Error) -> SaveError {
    SaveError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Default save location: `<data dir>/emberfall/<name>.sav`.
pub fn default_save_path(name: &str) -> Result<PathBuf, SaveError> {
    let dir = dirs::data_dir()
        .ok_or(SaveError::NoSaveDir)?
        .join("emberfall");
    Ok(dir.join(format!("{}.sav", name)))
}

/// Write the game to `path`, creating parent directories as needed.
///
/// The previous save is kept as `<path>.bak` until the new one is fully
/// written.
pub fn save_game(state: &SimulationState, path: &Path) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    if path.exists() {
        let backup = path.with_extension("sav.bak");
        fs::copy(path, &backup).map_err(|e| io_err(&backup, e))?;
    }

    let json = serde_json::to_vec(state)?;
    let file = File::create(path).map_err(|e| io_err(path, e))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&json).map_err(|e| io_err(path, e))?;
    encoder.finish().map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Load a game from `path`.
pub fn load_game(path: &Path) -> Result<SimulationState, SaveError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut decoder = GzDecoder::new(file);
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| io_err(path, e))?;
    let state = serde_json::from_slice(&json)?;
    Ok(state)
}

/// A timestamp string for save-file annotations and wizard diagnostics.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::status::StatusKind;

    #[test]
    fn save_then_load_round_trip() {
        let dir = std::env::temp_dir().join("ef-save-test");
        let path = dir.join("roundtrip.sav");

        let mut state = SimulationState::new("saver", 123);
        state.player.chp = 7;
        state.player.statuses.set(StatusKind::Poisoned, 42);
        state.clock = crate::world::clock::WorldClock::from_turn(500);

        save_game(&state, &path).unwrap();
        let loaded = load_game(&path).unwrap();

        assert_eq!(loaded.player.chp, 7);
        assert_eq!(loaded.player.statuses.get(StatusKind::Poisoned), 42);
        assert_eq!(loaded.clock.turn(), 500);
        assert_eq!(loaded.rng.seed(), 123);
        assert!(loaded.messages.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_game(Path::new("/no/such/place.sav")).unwrap_err();
        assert!(err.to_string().contains("place.sav"));
    }
}
