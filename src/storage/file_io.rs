//! File I/O utilities with content hashing and atomic writes
//!
//! Every read records the SHA-256 of the file contents so that a later save
//! can skip files whose serialized form did not change.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AccError, AccResult};

/// Lowercase hex SHA-256 of a byte slice
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest: [u8; 32] = hasher.finalize().into();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// A deserialized file together with the hash of its raw contents
#[derive(Debug, Clone, PartialEq)]
pub struct Hashed<T> {
    pub value: T,
    /// `None` when the file does not exist
    pub hash: Option<String>,
}

/// Read YAML from a file, returning a default value if the file doesn't exist
pub fn read_yaml<T, P>(path: P) -> AccResult<Hashed<T>>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Hashed {
            value: T::default(),
            hash: None,
        });
    }

    read_yaml_required(path)
}

/// Read YAML from a file, returning an error if the file doesn't exist
pub fn read_yaml_required<T, P>(path: P) -> AccResult<Hashed<T>>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let contents = fs::read(path)
        .map_err(|e| AccError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
    let hash = Some(sha256_hex(&contents));

    // An empty file is an empty collection
    if contents.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Hashed {
            value: T::default(),
            hash,
        });
    }

    let value = serde_yaml::from_slice(&contents).map_err(|e| AccError::parse_yaml(path, &e))?;
    Ok(Hashed { value, hash })
}

/// Serialize to the canonical YAML form written to disk
pub fn to_yaml_string<T: Serialize>(data: &T) -> AccResult<String> {
    serde_yaml::to_string(data).map_err(|e| AccError::Yaml(format!("Failed to serialize data: {}", e)))
}

/// Write contents to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> AccResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AccError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    // Temp file in the same directory keeps the rename atomic
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = std::path::PathBuf::from(temp_name);

    let file = File::create(&temp_path)
        .map_err(|e| AccError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .map_err(|e| AccError::Storage(format!("Failed to write data: {}", e)))?;
    writer
        .flush()
        .map_err(|e| AccError::Storage(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| AccError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        AccError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Write `contents` unless the file already holds exactly these bytes.
///
/// `known_hash` is the hash recorded when the file was last read or written.
/// Returns the new hash and whether the file was written.
pub fn write_if_changed<P: AsRef<Path>>(
    path: P,
    contents: &str,
    known_hash: Option<&str>,
) -> AccResult<(String, bool)> {
    let path = path.as_ref();
    let hash = sha256_hex(contents.as_bytes());
    if known_hash == Some(hash.as_str()) && path.exists() {
        return Ok((hash, false));
    }
    write_atomic(path, contents.as_bytes())?;
    Ok((hash, true))
}
