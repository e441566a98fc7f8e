use std::{fs, path::Path};

use anyhow::{Context, Result};
use fight_caves_core::Criteria;
use fight_caves_session::{load_criteria, SessionSnapshot, TransferError};

/// Reads a persisted snapshot; a missing or blank file yields `None`.
pub(crate) fn load_snapshot(path: &Path) -> Result<Option<SessionSnapshot>> {
    if !path.is_file() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot at {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    let snapshot = SessionSnapshot::decode(&contents)
        .with_context(|| format!("invalid snapshot at {}", path.display()))?;
    Ok(Some(snapshot))
}

/// Writes the snapshot as a single line, replacing any earlier contents.
pub(crate) fn save_snapshot(path: &Path, snapshot: &SessionSnapshot) -> Result<()> {
    let encoded = snapshot.encode()?;
    fs::write(path, format!("{encoded}\n"))
        .with_context(|| format!("failed to write snapshot to {}", path.display()))
}

/// Removes the snapshot file once the session has ended.
pub(crate) fn clear_snapshot(path: &Path) -> Result<()> {
    if path.is_file() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove snapshot at {}", path.display()))?;
    }
    Ok(())
}

/// Reads criteria from an encoded session or criteria string, or from a file
/// holding either.
pub(crate) fn decode_criteria(argument: &str) -> Result<Criteria> {
    let path = Path::new(argument);
    let encoded = if path.is_file() {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot at {}", path.display()))?
    } else {
        argument.to_owned()
    };

    match SessionSnapshot::decode(&encoded) {
        Ok(snapshot) => Ok(snapshot.criteria),
        Err(TransferError::UnexpectedKind { .. }) => Ok(load_criteria(&encoded)?),
        Err(error) => Err(error.into()),
    }
}
