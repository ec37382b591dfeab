use std::fs::{File, create_dir_all};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Flat-file storage backend interface
///
/// Keys are relative paths such as `alice/credentials.json`: one directory
/// per identity key, one named file per record kind. Implementations decide
/// where the data actually lives, so the page logic never touches the
/// filesystem directly.
pub trait Store: Send + Sync {
    /// Check whether a record exists for the given key
    ///
    /// # Arguments
    /// * `key` - Relative record path, e.g. `alice/marks.csv`
    ///
    /// # Returns
    /// * `bool` - True when a record is stored under the key
    fn exists(&self, key: &str) -> bool;

    /// Read the record stored under a key
    ///
    /// # Arguments
    /// * `key` - Relative record path
    ///
    /// # Returns
    /// * `std::io::Result<Option<String>>` - The record contents, `None` when
    ///   absent, or an IO error
    fn get(&self, key: &str) -> std::io::Result<Option<String>>;

    /// Write a record under a key, overwriting any existing content
    ///
    /// # Arguments
    /// * `key` - Relative record path
    /// * `contents` - Full record contents to store
    ///
    /// # Returns
    /// * `std::io::Result<()>` - Success or an IO error
    fn put(&self, key: &str, contents: &str) -> std::io::Result<()>;
}

/// Filesystem-backed store
///
/// Roots every key under a data directory (`database` by default, created on
/// first use). Writing a record creates the key's directory on demand, the
/// same way the sign-up flow provisions a folder per user.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at the given data directory
    ///
    /// The directory itself is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    /// Root data directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Store for FsStore {
    fn exists(&self, key: &str) -> bool {
        self.resolve(key).exists()
    }

    fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        let path = self.resolve(key);
        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(Some(contents))
    }

    fn put(&self, key: &str, contents: &str) -> std::io::Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn put_then_get_returns_contents() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store.put("alice/credentials.json", "{}").unwrap();

        assert_eq!(
            store.get("alice/credentials.json").unwrap(),
            Some("{}".to_string())
        );
        assert!(store.exists("alice/credentials.json"));
    }

    #[test]
    fn get_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        assert_eq!(store.get("nobody/marks.csv").unwrap(), None);
        assert!(!store.exists("nobody/marks.csv"));
    }

    #[test]
    fn put_creates_key_directory() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store.put("bob/marks.csv", "Subject,Marks\n").unwrap();

        assert!(dir.path().join("bob").is_dir());
        assert!(fs::read_to_string(dir.path().join("bob/marks.csv")).is_ok());
    }

    #[test]
    fn put_overwrites_silently() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store.put("alice/credentials.json", "first").unwrap();
        store.put("alice/credentials.json", "second").unwrap();

        assert_eq!(
            store.get("alice/credentials.json").unwrap(),
            Some("second".to_string())
        );
    }
}
