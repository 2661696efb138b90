use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Whole-value key-value storage. Values are opaque strings (JSON here).
pub trait KvStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
///
/// Writes go to `<key>.json.tmp`, are fsynced, then renamed over the live
/// file, so a crash mid-write leaves the previous value readable.
#[derive(Debug)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Open (creating if needed) the data directory.
    pub fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        // Keys are fixed by the store, but never let one escape the directory.
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("invalid key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&tmp_path, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("workboard_test_kv").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_set_get_remove() {
        let mut kv = MemoryKv::new();
        assert_eq!(kv.get("resources").unwrap(), None);
        kv.set("resources", "[]").unwrap();
        assert_eq!(kv.get("resources").unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.remove("resources").as_deref(), Some("[]"));
        assert_eq!(kv.get("resources").unwrap(), None);
    }

    #[test]
    fn file_missing_key_is_none() {
        let kv = FileKv::open(&tmp_dir("missing")).unwrap();
        assert_eq!(kv.get("assignments").unwrap(), None);
    }

    #[test]
    fn file_set_then_reopen() {
        let dir = tmp_dir("reopen");
        {
            let mut kv = FileKv::open(&dir).unwrap();
            kv.set("assignments", "[1,2,3]").unwrap();
            kv.set("assignments", "[4]").unwrap();
        }
        let kv = FileKv::open(&dir).unwrap();
        assert_eq!(kv.get("assignments").unwrap().as_deref(), Some("[4]"));
        assert!(!dir.join("assignments.json.tmp").exists());
    }

    #[test]
    fn file_rejects_path_like_keys() {
        let mut kv = FileKv::open(&tmp_dir("keys")).unwrap();
        assert!(kv.set("../escape", "x").is_err());
        assert!(kv.get("").is_err());
    }
}
