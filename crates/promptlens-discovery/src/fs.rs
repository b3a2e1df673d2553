//! Filesystem capability used by discovery
//!
//! Production code talks to [`OsFileSystem`]; tests inject [`MemoryFileSystem`].
//! Both honour the same contract so scanning logic is exercised identically.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// Subset of file metadata discovery cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Entry kind
    pub kind: EntryKind,
    /// Modification time in nanoseconds since the Unix epoch (0 when unavailable)
    pub mtime: u64,
}

impl FileStat {
    /// Whether the entry is a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Whether the entry is a regular file
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Minimal async filesystem capability
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// List entry names of a directory, in a stable order
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Read a whole file as UTF-8
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Stat a path, following symlinks
    async fn stat(&self, path: &Path) -> io::Result<FileStat>;
}

/// Real filesystem backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

#[async_trait]
impl FileSystem for OsFileSystem {
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        // read_dir order is platform dependent
        names.sort();
        Ok(names)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = tokio::fs::metadata(path).await?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
        Ok(FileStat { kind, mtime })
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    File { content: String, mtime: u64 },
    Directory { mtime: u64 },
}

impl MemoryNode {
    fn stat(&self) -> FileStat {
        match self {
            MemoryNode::File { mtime, .. } => FileStat {
                kind: EntryKind::File,
                mtime: *mtime,
            },
            MemoryNode::Directory { mtime } => FileStat {
                kind: EntryKind::Directory,
                mtime: *mtime,
            },
        }
    }

    fn set_mtime(&mut self, value: u64) {
        match self {
            MemoryNode::File { mtime, .. } | MemoryNode::Directory { mtime } => *mtime = value,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: BTreeMap<String, MemoryNode>,
    /// Applied to `list_dir` only
    delays: HashMap<String, Duration>,
    /// Applied to every operation on the path
    errors: HashMap<String, io::ErrorKind>,
    reads: HashMap<String, usize>,
    clock: u64,
}

impl MemoryState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Create `key` and every missing ancestor as directories
    fn ensure_dirs(&mut self, key: &str) {
        let mut current = Some(key.to_string());
        while let Some(dir) = current {
            if self.nodes.contains_key(&dir) {
                break;
            }
            let mtime = self.tick();
            self.nodes
                .insert(dir.clone(), MemoryNode::Directory { mtime });
            current = parent_key(&dir);
        }
    }

    fn touch_parent(&mut self, key: &str) {
        if let Some(parent) = parent_key(key) {
            let mtime = self.tick();
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.set_mtime(mtime);
            }
        }
    }

    fn check_error(&self, key: &str) -> io::Result<()> {
        match self.errors.get(key) {
            Some(kind) => Err(io::Error::new(*kind, format!("simulated {kind:?}: {key}"))),
            None => Ok(()),
        }
    }
}

/// In-memory filesystem keyed by normalized path strings
///
/// Adding or removing an entry bumps the parent directory's mtime, the same way a
/// real filesystem does. Listings come back sorted by name.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: RwLock<MemoryState>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file, creating parent directories as needed
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let key = normalize_path(path.as_ref());
        let mut state = self.state.write();
        if let Some(parent) = parent_key(&key) {
            state.ensure_dirs(&parent);
        }
        let mtime = state.tick();
        state.nodes.insert(
            key.clone(),
            MemoryNode::File {
                content: content.into(),
                mtime,
            },
        );
        state.touch_parent(&key);
    }

    /// Add an empty directory, creating parents as needed
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let key = normalize_path(path.as_ref());
        let mut state = self.state.write();
        if !state.nodes.contains_key(&key) {
            state.ensure_dirs(&key);
            state.touch_parent(&key);
        }
    }

    /// Remove a file or a directory tree
    pub fn remove(&self, path: impl AsRef<Path>) {
        let key = normalize_path(path.as_ref());
        let prefix = child_prefix(&key);
        let mut state = self.state.write();
        state
            .nodes
            .retain(|k, _| k != &key && !k.starts_with(&prefix));
        state.touch_parent(&key);
    }

    /// Delay every `list_dir` call on `path`
    pub fn set_delay(&self, path: impl AsRef<Path>, delay: Duration) {
        let key = normalize_path(path.as_ref());
        self.state.write().delays.insert(key, delay);
    }

    /// Fail every operation on `path` with `kind`
    pub fn set_error(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        let key = normalize_path(path.as_ref());
        self.state.write().errors.insert(key, kind);
    }

    /// Force the modification time of an existing entry
    pub fn set_mtime(&self, path: impl AsRef<Path>, mtime: u64) {
        let key = normalize_path(path.as_ref());
        if let Some(node) = self.state.write().nodes.get_mut(&key) {
            node.set_mtime(mtime);
        }
    }

    /// Number of successful `read_to_string` calls on `path`
    #[must_use]
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        let key = normalize_path(path.as_ref());
        self.state.read().reads.get(&key).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let key = normalize_path(path);
        let delay = self.state.read().delays.get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read();
        state.check_error(&key)?;
        match state.nodes.get(&key) {
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {key}"),
            )),
            Some(MemoryNode::File { .. }) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {key}"),
            )),
            Some(MemoryNode::Directory { .. }) => {
                let prefix = child_prefix(&key);
                Ok(state
                    .nodes
                    .range(prefix.clone()..)
                    .map(|(k, _)| k)
                    .take_while(|k| k.starts_with(&prefix))
                    .filter_map(|k| k.strip_prefix(&prefix))
                    .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                    .map(str::to_string)
                    .collect())
            }
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let key = normalize_path(path);
        let mut state = self.state.write();
        state.check_error(&key)?;
        let content = match state.nodes.get(&key) {
            Some(MemoryNode::File { content, .. }) => content.clone(),
            Some(MemoryNode::Directory { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("is a directory: {key}"),
                ))
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {key}"),
                ))
            }
        };
        *state.reads.entry(key).or_insert(0) += 1;
        Ok(content)
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let key = normalize_path(path);
        let state = self.state.read();
        state.check_error(&key)?;
        state.nodes.get(&key).map(MemoryNode::stat).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {key}"))
        })
    }
}

/// Normalize a path into the key format used by [`MemoryFileSystem`] and the cache:
/// forward slashes, no trailing separator, no `.` components.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let absolute = raw.starts_with('/');
    let parts: Vec<&str> = raw
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn parent_key(key: &str) -> Option<String> {
    match key.rsplit_once('/') {
        Some(("", rest)) if !rest.is_empty() => Some("/".to_string()),
        Some((parent, _)) if !parent.is_empty() => Some(parent.to_string()),
        _ => None,
    }
}

fn child_prefix(key: &str) -> String {
    if key.ends_with('/') {
        key.to_string()
    } else {
        format!("{key}/")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/")), "/a/b");
        assert_eq!(normalize_path(Path::new("/a//./b")), "/a/b");
        assert_eq!(normalize_path(Path::new("C:\\proj\\x")), "C:/proj/x");
        assert_eq!(normalize_path(Path::new("/")), "/");
        assert_eq!(normalize_path(Path::new("./")), ".");
    }

    #[test]
    fn test_parent_key() {
        assert_eq!(parent_key("/a/b").as_deref(), Some("/a"));
        assert_eq!(parent_key("/a").as_deref(), Some("/"));
        assert_eq!(parent_key("/"), None);
        assert_eq!(parent_key("a"), None);
    }

    #[tokio::test]
    async fn test_memory_listing_is_direct_children_only() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/b.md", "b");
        fs.add_file("/root/a.md", "a");
        fs.add_file("/root/nested/c.md", "c");
        fs.add_file("/rootless/d.md", "d");

        let names = fs.list_dir(Path::new("/root")).await.unwrap();
        assert_eq!(names, vec!["a.md", "b.md", "nested"]);
    }

    #[tokio::test]
    async fn test_memory_errors() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/file.md", "x");

        let err = fs.list_dir(Path::new("/missing")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err = fs.list_dir(Path::new("/root/file.md")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);

        fs.set_error("/root", io::ErrorKind::PermissionDenied);
        let err = fs.list_dir(Path::new("/root")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_adding_file_bumps_parent_mtime() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/root");
        let before = fs.stat(Path::new("/root")).await.unwrap();
        assert!(before.is_dir());

        fs.add_file("/root/new.md", "x");
        let after = fs.stat(Path::new("/root")).await.unwrap();
        assert!(after.mtime > before.mtime);

        fs.remove("/root/new.md");
        let removed = fs.stat(Path::new("/root")).await.unwrap();
        assert!(removed.mtime > after.mtime);
        assert!(fs.list_dir(Path::new("/root")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_count() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/a.md", "hello");
        assert_eq!(fs.read_to_string(Path::new("/root/a.md")).await.unwrap(), "hello");
        assert_eq!(fs.read_count("/root/a.md"), 1);
        assert!(fs.read_to_string(Path::new("/root")).await.is_err());
    }

    #[tokio::test]
    async fn test_os_filesystem() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.md"), "b").unwrap();
        std::fs::write(temp.path().join("a.md"), "a").unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();

        let fs = OsFileSystem;
        let names = fs.list_dir(temp.path()).await.unwrap();
        assert_eq!(names, vec!["a.md", "b.md", "sub"]);

        let stat = fs.stat(&temp.path().join("sub")).await.unwrap();
        assert!(stat.is_dir());
        assert!(stat.mtime > 0);

        let content = fs.read_to_string(&temp.path().join("a.md")).await.unwrap();
        assert_eq!(content, "a");
    }
}
