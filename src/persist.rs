use std::{fs, path::Path};

use json_pretty_compact::PrettyCompactFormatter;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Serializer;

use crate::error::{Result, SpecialError};

// Writes next to the target and renames over it, so a crash never leaves a
// half-written file in place.
pub fn write_replace(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn to_json_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    Ok(data_bytes)
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let data_bytes = to_json_bytes(data)?;
    write_replace(path, &data_bytes)
}

/// Malformed content surfaces as a parse error, not a JSON error.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes = fs::read(path)?;
    serde_json::from_slice(&data_bytes)
        .map_err(|e| SpecialError::Parse(format!("{}: {}", path.display(), e)))
}

pub fn save_bytes(path: &Path, data: &[u8]) -> Result<()> {
    info!("Saving {} ({} bytes)", path.display(), data.len());
    write_replace(path, data)
}
