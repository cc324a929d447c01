use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SaveError;
use crate::model::catalog::SessionParameters;
use crate::model::message::Message;
use crate::model::player_state::PlayerState;

pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Everything needed to resume a session: the frozen parameters, the
/// current state snapshot, and the transcript the prompts are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSave {
    pub version: u32,
    pub parameters: SessionParameters,
    pub state: PlayerState,
    pub messages: Vec<Message>,
}

impl SessionSave {
    pub fn new(parameters: SessionParameters, state: PlayerState, messages: Vec<Message>) -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            parameters,
            state,
            messages,
        }
    }
}

/// Default location for a named save: `<data_dir>/questloom/<name>.json`.
pub fn save_path(name: &str) -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("questloom");
    path.push(format!("{name}.json"));
    path
}

pub fn write_save(path: &Path, save: &SessionSave) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(save)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_save(path: &Path) -> Result<SessionSave, SaveError> {
    let raw = fs::read_to_string(path)?;
    let save: SessionSave = serde_json::from_str(&raw)?;
    if save.version != SAVE_FORMAT_VERSION {
        return Err(SaveError::Version {
            found: save.version,
            expected: SAVE_FORMAT_VERSION,
        });
    }
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_save() -> SessionSave {
        let mut state = PlayerState::default();
        state.inventory.push("💼 A small satchel of healing herbs and potions".into());
        state.turn_number = 3;
        SessionSave::new(
            SessionParameters::default(),
            state,
            vec![
                Message::Player("look around".into()),
                Message::Narrator("The temple is silent.".into()),
            ],
        )
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot_1.json");
        let save = sample_save();
        write_save(&path, &save).unwrap();
        let loaded = load_save(&path).unwrap();
        assert_eq!(loaded, save);
    }

    #[test]
    fn rejects_unknown_format_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot_1.json");
        let mut save = sample_save();
        save.version = 99;
        write_save(&path, &save).unwrap();
        assert!(matches!(
            load_save(&path),
            Err(SaveError::Version { found: 99, .. })
        ));
    }
}
