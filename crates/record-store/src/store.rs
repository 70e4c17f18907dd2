use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::{StoreError, StoreResult};
use crate::metrics;

/// How a load reacts to a backing file that does not parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    /// Treat the file as an empty collection. The unreadable bytes are copied
    /// aside before the next rewrite replaces them.
    #[default]
    Lenient,
    /// Surface [`StoreError::Corrupt`] to the caller.
    Strict,
}

impl FromStr for CorruptPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown corrupt policy '{other}'")),
        }
    }
}

impl fmt::Display for CorruptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => f.write_str("lenient"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Metadata about a backing file, as shown by the console manager.
#[derive(Clone, Debug, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// `None` when the file exists but does not parse.
    pub entries: Option<usize>,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
}

struct Loaded<T> {
    records: Vec<T>,
    corrupt: bool,
}

/// A JSON array on disk. The file is the collection: every mutation loads the
/// whole array and rewrites it.
pub struct JsonFileStore<T> {
    path: PathBuf,
    collection: String,
    policy: CorruptPolicy,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            collection: collection.into(),
            policy: CorruptPolicy::default(),
            write_lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn with_policy(mut self, policy: CorruptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn policy(&self) -> CorruptPolicy {
        self.policy
    }

    /// Missing and blank files load as an empty collection.
    pub fn load(&self) -> StoreResult<Vec<T>> {
        self.read().map(|loaded| loaded.records)
    }

    /// Replaces the backing file with `records`, pretty-printed.
    pub fn save(&self, records: &[T]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, err))?;

        let json = serde_json::to_vec_pretty(records)?;
        let mut staged = NamedTempFile::new_in(&dir).map_err(|err| StoreError::io(&dir, err))?;
        staged
            .write_all(&json)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|err| StoreError::io(staged.path(), err))?;
        staged
            .persist(&self.path)
            .map_err(|err| StoreError::io(&self.path, err.error))?;

        metrics::record_write(&self.collection);
        debug!(
            collection = %self.collection,
            path = %self.path.display(),
            records = records.len(),
            "collection rewritten"
        );
        Ok(())
    }

    /// Load, mutate and rewrite as one step. Nothing is written when `mutate`
    /// fails. Only serializes writers inside this process.
    pub fn update<R, F>(&self, mutate: F) -> StoreResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> StoreResult<R>,
    {
        let _guard = self.write_lock.lock();
        let Loaded {
            mut records,
            corrupt,
        } = self.read()?;
        let outcome = mutate(&mut records)?;
        if corrupt {
            self.preserve_corrupt_copy()?;
        }
        self.save(&records)?;
        Ok(outcome)
    }

    /// Empties the collection and returns how many records were dropped.
    pub fn clear(&self) -> StoreResult<usize> {
        self.update(|records| {
            let removed = records.len();
            records.clear();
            Ok(removed)
        })
    }

    pub fn file_info(&self) -> StoreResult<Option<FileInfo>> {
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        let modified = meta
            .modified()
            .map_err(|err| StoreError::io(&self.path, err))?;
        let created = meta.created().unwrap_or(modified);

        let bytes = fs::read(&self.path).map_err(|err| StoreError::io(&self.path, err))?;
        let entries = if is_blank(&bytes) {
            Some(0)
        } else {
            serde_json::from_slice::<Vec<T>>(&bytes)
                .ok()
                .map(|records| records.len())
        };

        Ok(Some(FileInfo {
            path: self.path.clone(),
            size_bytes: meta.len(),
            entries,
            created: DateTime::<Local>::from(created),
            modified: DateTime::<Local>::from(modified),
        }))
    }

    /// Where an unparseable file is copied before it gets overwritten.
    pub fn corrupt_copy_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn read(&self) -> StoreResult<Loaded<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Loaded {
                    records: Vec::new(),
                    corrupt: false,
                })
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        if is_blank(&bytes) {
            return Ok(Loaded {
                records: Vec::new(),
                corrupt: false,
            });
        }

        match serde_json::from_slice::<Vec<T>>(&bytes) {
            Ok(records) => Ok(Loaded {
                records,
                corrupt: false,
            }),
            Err(err) => {
                metrics::record_corrupt_load(&self.collection);
                match self.policy {
                    CorruptPolicy::Strict => Err(StoreError::Corrupt {
                        path: self.path.clone(),
                        reason: err.to_string(),
                    }),
                    CorruptPolicy::Lenient => {
                        warn!(
                            collection = %self.collection,
                            path = %self.path.display(),
                            error = %err,
                            "collection file does not parse; treating it as empty"
                        );
                        Ok(Loaded {
                            records: Vec::new(),
                            corrupt: true,
                        })
                    }
                }
            }
        }
    }

    fn preserve_corrupt_copy(&self) -> StoreResult<()> {
        let target = self.corrupt_copy_path();
        fs::copy(&self.path, &target).map_err(|err| StoreError::io(&target, err))?;
        warn!(
            collection = %self.collection,
            copy = %target.display(),
            "kept a copy of the unparseable collection before rewriting it"
        );
        Ok(())
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> JsonFileStore<Value> {
        JsonFileStore::new(dir.join("items.json"), "items")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.load().unwrap().is_empty());
        assert!(store.file_info().unwrap().is_none());
    }

    #[test]
    fn blank_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_preserves_content() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let records = vec![json!({"a": 1}), json!({"b": "two"})];
        store.save(&records).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, records);
        store.save(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), records);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("[\n"), "expected pretty output: {text}");
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store: JsonFileStore<Value> =
            JsonFileStore::new(dir.path().join("nested/deeper/items.json"), "items");
        store.save(&[json!(1)]).unwrap();
        assert_eq!(store.load().unwrap(), vec![json!(1)]);
    }

    #[test]
    fn lenient_policy_masks_invalid_json() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn strict_policy_reports_invalid_json() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path()).with_policy(CorruptPolicy::Strict);
        fs::write(store.path(), "{not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn update_keeps_copy_of_corrupt_file() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        store
            .update(|records| {
                records.push(json!("fresh"));
                Ok(())
            })
            .unwrap();

        assert_eq!(store.load().unwrap(), vec![json!("fresh")]);
        let copy = fs::read_to_string(store.corrupt_copy_path()).unwrap();
        assert_eq!(copy, "{not json");
    }

    #[test]
    fn failed_mutation_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&[json!(1)]).unwrap();

        let result: StoreResult<()> = store.update(|records| {
            records.clear();
            Err(StoreError::NotFound("x".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.load().unwrap(), vec![json!(1)]);
    }

    #[test]
    fn clear_reports_removed_count() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&[json!(1), json!(2), json!(3)]).unwrap();
        assert_eq!(store.clear().unwrap(), 3);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn file_info_counts_entries() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&[json!(1), json!(2)]).unwrap();
        let info = store.file_info().unwrap().expect("file exists");
        assert_eq!(info.entries, Some(2));
        assert!(info.size_bytes > 0);
        assert!(info.created <= Local::now());

        fs::write(store.path(), "garbage").unwrap();
        let info = store.file_info().unwrap().expect("file exists");
        assert_eq!(info.entries, None);
    }

    #[test]
    fn corrupt_policy_parses_from_text() {
        assert_eq!(
            "Strict".parse::<CorruptPolicy>().unwrap(),
            CorruptPolicy::Strict
        );
        assert_eq!(
            " lenient ".parse::<CorruptPolicy>().unwrap(),
            CorruptPolicy::Lenient
        );
        assert!("loud".parse::<CorruptPolicy>().is_err());
    }
}
