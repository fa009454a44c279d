//! Save/Load functionality for persisting simulation state
//!
//! Uses bincode for compact binary serialization of the whole
//! [`SimulationState`]. A save is a [`SaveData`] record: format version,
//! slot metadata, then the state. The engine only ever hands a state to a
//! [`SaveStore`] or receives one back; it never touches bytes itself.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use campus_logic::constants::calendar;
use campus_logic::SimulationState;

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

const SLOT_EXTENSION: &str = "sav";

/// Human-facing description of a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMeta {
    /// Seconds since the unix epoch.
    pub timestamp: u64,
    /// e.g. "2022-03 - School of Physics"
    pub summary: String,
}

impl SaveMeta {
    pub fn for_state(state: &SimulationState) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            timestamp,
            summary: state.summary(),
        }
    }
}

/// Serializable snapshot of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub meta: SaveMeta,
    pub state: SimulationState,
}

/// Leading fields of [`SaveData`], decodable without the state.
#[derive(Deserialize)]
struct SaveHeader {
    version: u32,
    meta: SaveMeta,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode save: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode save: {0}")]
    Decode(#[source] bincode::Error),
    #[error("save format version {found} is not supported (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("save data is corrupt: {0}")]
    Corrupt(String),
    #[error("invalid slot name {0:?}")]
    InvalidSlot(String),
}

// ── Encoding ────────────────────────────────────────────────────────────────

/// Write `state` with fresh metadata.
pub fn save_state_to<W: Write>(writer: W, state: &SimulationState) -> Result<(), SaveError> {
    let data = SaveData {
        version: SAVE_VERSION,
        meta: SaveMeta::for_state(state),
        state: state.clone(),
    };
    bincode::serialize_into(writer, &data).map_err(SaveError::Encode)
}

/// Read a full save, checking the version before decoding the state.
pub fn load_state_from<R: Read>(mut reader: R) -> Result<SaveData, SaveError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let version: u32 = bincode::deserialize(&bytes).map_err(SaveError::Decode)?;
    if version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: version,
        });
    }
    let data: SaveData = bincode::deserialize(&bytes).map_err(SaveError::Decode)?;
    check_state(&data.state)?;
    Ok(data)
}

/// Reject states no play session could have produced.
fn check_state(state: &SimulationState) -> Result<(), SaveError> {
    if !(1..=12).contains(&state.month) {
        return Err(SaveError::Corrupt(format!("month {}", state.month)));
    }
    if !(1..=calendar::FINAL_GRADE).contains(&state.grade) {
        return Err(SaveError::Corrupt(format!("grade {}", state.grade)));
    }
    if state.credit_plan.len() != calendar::SEMESTER_COUNT {
        return Err(SaveError::Corrupt(format!(
            "credit plan has {} semesters",
            state.credit_plan.len()
        )));
    }
    Ok(())
}

// ── Stores ──────────────────────────────────────────────────────────────────

/// The persistence collaborator.
pub trait SaveStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load_state(&mut self) -> Result<Option<SimulationState>, SaveError>;
    fn save_state(&mut self, state: &SimulationState) -> Result<(), SaveError>;
}

/// Keeps one encoded save in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    bytes: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with raw bytes, valid or not.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn load_state(&mut self) -> Result<Option<SimulationState>, SaveError> {
        match &self.bytes {
            Some(bytes) => load_state_from(bytes.as_slice()).map(|d| Some(d.state)),
            None => Ok(None),
        }
    }

    fn save_state(&mut self, state: &SimulationState) -> Result<(), SaveError> {
        let mut buf = Vec::new();
        save_state_to(&mut buf, state)?;
        self.bytes = Some(buf);
        Ok(())
    }
}

/// A directory of named slots, one file per slot. Loads and saves go to
/// the active slot.
#[derive(Debug, Clone)]
pub struct SlotStore {
    dir: PathBuf,
    active: String,
}

impl SlotStore {
    /// Open (creating if needed) `dir`, with `active` as the working slot.
    pub fn open(dir: impl AsRef<Path>, active: &str) -> Result<Self, SaveError> {
        check_slot(active)?;
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            active: active.to_string(),
        })
    }

    pub fn active_slot(&self) -> &str {
        &self.active
    }

    pub fn set_active_slot(&mut self, slot: &str) {
        self.active = slot.to_string();
    }

    fn path(&self, slot: &str) -> Result<PathBuf, SaveError> {
        check_slot(slot)?;
        Ok(self.dir.join(format!("{}.{}", slot, SLOT_EXTENSION)))
    }

    /// Metadata of `slot` without decoding its state.
    pub fn slot_info(&self, slot: &str) -> Result<Option<SaveMeta>, SaveError> {
        let path = self.path(slot)?;
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        let header: SaveHeader = bincode::deserialize_from(reader).map_err(SaveError::Decode)?;
        if header.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: header.version,
            });
        }
        Ok(Some(header.meta))
    }

    /// Remove `slot`. Returns whether it existed.
    pub fn delete(&self, slot: &str) -> Result<bool, SaveError> {
        let path = self.path(slot)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    /// Names of every slot in the directory, sorted.
    pub fn list_slots(&self) -> Result<Vec<String>, SaveError> {
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(SLOT_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    slots.push(stem.to_string());
                }
            }
        }
        slots.sort();
        Ok(slots)
    }
}

/// Slot names are plain file stems: no separators, no parent references.
fn check_slot(slot: &str) -> Result<(), SaveError> {
    let bad = slot.is_empty()
        || slot.contains("..")
        || slot.contains(|c: char| c == '/' || c == '\\' || c == '\0');
    if bad {
        return Err(SaveError::InvalidSlot(slot.to_string()));
    }
    Ok(())
}

impl SaveStore for SlotStore {
    fn load_state(&mut self) -> Result<Option<SimulationState>, SaveError> {
        let path = self.path(&self.active)?;
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        load_state_from(reader).map(|d| Some(d.state))
    }

    fn save_state(&mut self, state: &SimulationState) -> Result<(), SaveError> {
        let path = self.path(&self.active)?;
        let mut writer = BufWriter::new(File::create(path)?);
        save_state_to(&mut writer, state)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_logic::content::{self, Faculty};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rolled() -> SimulationState {
        let mut rng = StdRng::seed_from_u64(21);
        content::new_game(Faculty::Information, &mut rng)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load_state().unwrap().is_none());
        let state = rolled();
        store.save_state(&state).unwrap();
        assert_eq!(store.load_state().unwrap(), Some(state));
    }

    #[test]
    fn test_version_mismatch() {
        let mut buf = Vec::new();
        save_state_to(&mut buf, &rolled()).unwrap();
        buf[..4].copy_from_slice(&99u32.to_le_bytes());
        let err = load_state_from(buf.as_slice()).unwrap_err();
        assert!(matches!(err, SaveError::VersionMismatch { found: 99, .. }));
    }

    #[test]
    fn test_truncated_bytes_fail_to_decode() {
        let mut buf = Vec::new();
        save_state_to(&mut buf, &rolled()).unwrap();
        buf.truncate(buf.len() / 2);
        let mut store = MemoryStore::from_bytes(buf);
        assert!(matches!(store.load_state(), Err(SaveError::Decode(_))));
    }

    #[test]
    fn test_impossible_state_is_corrupt() {
        let mut state = rolled();
        state.month = 14;
        let mut buf = Vec::new();
        save_state_to(&mut buf, &state).unwrap();
        assert!(matches!(
            load_state_from(buf.as_slice()),
            Err(SaveError::Corrupt(_))
        ));
    }
}
