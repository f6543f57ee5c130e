use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persisted::{StoreEntry, StoreRecord, STORE_RECORD_VERSION};

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file yields an empty store; an
    /// unreadable or outdated record is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match decode_record(&bytes) {
                Ok(record) => record
                    .entries
                    .into_iter()
                    .map(|entry| (entry.key, entry.value))
                    .collect(),
                Err(err) => {
                    warn!(path = %path.display(), %err, "discarding unreadable store record");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "store opened");
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let record = StoreRecord {
            version: STORE_RECORD_VERSION,
            entries: self
                .entries
                .iter()
                .map(|(key, value)| StoreEntry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        };
        let bytes = encode_record(&record)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush()
    }
}

fn encode_record(record: &StoreRecord) -> Result<Vec<u8>, StoreError> {
    rkyv::to_bytes::<Error>(record)
        .map(|bytes| bytes.into_vec())
        .map_err(|_| StoreError::Encode)
}

fn decode_record(bytes: &[u8]) -> Result<StoreRecord, StoreError> {
    let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    let record =
        rkyv::from_bytes::<StoreRecord, Error>(&aligned).map_err(|_| StoreError::Decode)?;
    if record.version != STORE_RECORD_VERSION {
        return Err(StoreError::Decode);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        let nonce: u64 = rand::random();
        std::env::temp_dir().join(format!("cardroom-{tag}-{nonce:016x}.bin"))
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = temp_path("reopen");
        {
            let mut store = FileStore::open(&path).expect("open");
            store.set("a", "1").expect("set a");
            store.set("b", "2").expect("set b");
            store.remove("a").expect("remove a");
        }
        let store = FileStore::open(&path).expect("reopen");
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b").as_deref(), Some("2"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, b"definitely not a record").expect("write");
        let store = FileStore::open(&path).expect("open");
        assert_eq!(store.get("anything"), None);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.set("k", "v").expect("set");
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").expect("remove");
        assert_eq!(store.get("k"), None);
    }
}
