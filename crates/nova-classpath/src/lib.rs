//! The classpath service consumed by the analyzer: raw class bytes and
//! resources looked up by name, from class directories, jars, jmods or memory.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Source of compiled classes.
///
/// Lookups never fail loudly: a missing or unreadable resource is `None`.
pub trait ClassProvider {
    /// Bytes of the resource at `path` (`java/lang/Object.class`).
    fn resource(&self, path: &str) -> Option<Vec<u8>>;

    fn has_resource(&self, path: &str) -> bool {
        self.resource(path).is_some()
    }

    /// Bytes of the class with the given binary name (`java.util.Map$Entry`).
    fn bytes_for_class(&self, binary_name: &str) -> Option<Vec<u8>> {
        self.resource(&class_resource_path(binary_name))
    }
}

impl<T: ClassProvider + ?Sized> ClassProvider for &T {
    fn resource(&self, path: &str) -> Option<Vec<u8>> {
        (**self).resource(path)
    }

    fn has_resource(&self, path: &str) -> bool {
        (**self).has_resource(path)
    }
}

impl<T: ClassProvider + ?Sized> ClassProvider for Arc<T> {
    fn resource(&self, path: &str) -> Option<Vec<u8>> {
        (**self).resource(path)
    }

    fn has_resource(&self, path: &str) -> bool {
        (**self).has_resource(path)
    }
}

/// `java.util.Map$Entry` -> `java/util/Map$Entry.class`
pub fn class_resource_path(binary_name: &str) -> String {
    format!("{}.class", binary_name.replace('.', "/"))
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
    Jmod(PathBuf),
}

impl ClasspathEntry {
    /// Picks the entry kind from the path: `.jar`/`.zip` and `.jmod` files are
    /// archives, anything else is a class directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip") => {
                ClasspathEntry::Jar(path)
            }
            Some(ext) if ext.eq_ignore_ascii_case("jmod") => ClasspathEntry::Jmod(path),
            _ => ClasspathEntry::ClassDir(path),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) | ClasspathEntry::Jmod(p) => p,
        }
    }

    pub fn open(&self) -> Result<OpenEntry, ClasspathError> {
        Ok(match self {
            ClasspathEntry::ClassDir(dir) => {
                if !dir.is_dir() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} is not a directory", dir.display()),
                    )
                    .into());
                }
                OpenEntry::Dir(dir.clone())
            }
            ClasspathEntry::Jar(path) => OpenEntry::Archive(Archive::open(path, "")?),
            // JMODs place class files under `classes/`.
            ClasspathEntry::Jmod(path) => OpenEntry::Archive(Archive::open(path, "classes/")?),
        })
    }
}

#[derive(Debug)]
pub enum OpenEntry {
    Dir(PathBuf),
    Archive(Archive),
}

impl ClassProvider for OpenEntry {
    fn resource(&self, path: &str) -> Option<Vec<u8>> {
        match self {
            OpenEntry::Dir(dir) => std::fs::read(dir.join(path)).ok(),
            OpenEntry::Archive(archive) => archive.read(path),
        }
    }

    fn has_resource(&self, path: &str) -> bool {
        match self {
            OpenEntry::Dir(dir) => dir.join(path).is_file(),
            OpenEntry::Archive(archive) => archive.contains(path),
        }
    }
}

/// A jar or jmod kept open for the lifetime of the classpath.
pub struct Archive {
    path: PathBuf,
    prefix: &'static str,
    /// Versions found under `META-INF/versions/`, highest first; empty unless
    /// the manifest declares `Multi-Release: true`.
    release_versions: Vec<u32>,
    zip: Mutex<zip::ZipArchive<File>>,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("release_versions", &self.release_versions)
            .finish_non_exhaustive()
    }
}

impl Archive {
    fn open(path: &Path, prefix: &'static str) -> Result<Self, ClasspathError> {
        let mut zip = zip::ZipArchive::new(File::open(path)?)?;
        let release_versions = if prefix.is_empty() && jar_is_multi_release(&mut zip) {
            let mut versions: Vec<u32> = zip
                .file_names()
                .filter_map(|name| name.strip_prefix("META-INF/versions/"))
                .filter_map(|rest| rest.split_once('/'))
                .filter_map(|(version, _)| version.parse().ok())
                .collect();
            versions.sort_unstable_by(|a, b| b.cmp(a));
            versions.dedup();
            versions
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            prefix,
            release_versions,
            zip: Mutex::new(zip),
        })
    }

    /// Base entries win over versioned ones; among versioned entries the
    /// highest release wins.
    fn candidates(&self, path: &str) -> impl Iterator<Item = String> + '_ {
        let base = format!("{}{path}", self.prefix);
        let path = path.to_string();
        std::iter::once(base).chain(
            self.release_versions
                .iter()
                .map(move |v| format!("META-INF/versions/{v}/{path}")),
        )
    }

    fn contains(&self, path: &str) -> bool {
        let zip = self.zip.lock();
        self.candidates(path)
            .any(|candidate| zip.file_names().any(|name| name == candidate))
    }

    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let mut zip = self.zip.lock();
        for candidate in self.candidates(path) {
            let mut file = match zip.by_name(&candidate) {
                Ok(file) => file,
                Err(zip::result::ZipError::FileNotFound) => continue,
                Err(err) => {
                    tracing::warn!(
                        target: "nova.classpath",
                        archive = %self.path.display(),
                        entry = candidate,
                        error = %err,
                        "failed to read archive entry"
                    );
                    return None;
                }
            };
            let mut bytes = Vec::with_capacity(file.size() as usize);
            if let Err(err) = file.read_to_end(&mut bytes) {
                tracing::warn!(
                    target: "nova.classpath",
                    archive = %self.path.display(),
                    entry = candidate,
                    error = %err,
                    "failed to read archive entry"
                );
                return None;
            }
            return Some(bytes);
        }
        None
    }
}

fn jar_is_multi_release(zip: &mut zip::ZipArchive<File>) -> bool {
    let Ok(mut manifest) = zip.by_name("META-INF/MANIFEST.MF") else {
        return false;
    };
    let mut text = String::new();
    if manifest.read_to_string(&mut text).is_err() {
        return false;
    }
    text.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("Multi-Release")
                && value.trim().eq_ignore_ascii_case("true")
        })
    })
}

/// Ordered classpath; the first entry holding a resource wins.
#[derive(Debug, Default)]
pub struct Classpath {
    entries: Vec<OpenEntry>,
}

impl Classpath {
    /// Opens every entry, skipping (and logging) the ones that cannot be read.
    pub fn open(entries: &[ClasspathEntry]) -> Self {
        let entries = entries
            .iter()
            .filter_map(|entry| match entry.open() {
                Ok(open) => Some(open),
                Err(err) => {
                    tracing::warn!(
                        target: "nova.classpath",
                        path = %entry.path().display(),
                        error = %err,
                        "skipping unreadable classpath entry"
                    );
                    None
                }
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClassProvider for Classpath {
    fn resource(&self, path: &str) -> Option<Vec<u8>> {
        self.entries.iter().find_map(|entry| entry.resource(path))
    }

    fn has_resource(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.has_resource(path))
    }
}

/// Classes held in memory, keyed by resource path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClasspath {
    resources: HashMap<String, Vec<u8>>,
}

impl InMemoryClasspath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_class(&mut self, binary_name: &str, bytes: Vec<u8>) -> &mut Self {
        self.resources
            .insert(class_resource_path(binary_name), bytes);
        self
    }

    pub fn insert_resource(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.resources.insert(path.into(), bytes);
        self
    }

    pub fn with_class(mut self, binary_name: &str, bytes: Vec<u8>) -> Self {
        self.insert_class(binary_name, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ClassProvider for InMemoryClasspath {
    fn resource(&self, path: &str) -> Option<Vec<u8>> {
        self.resources.get(path).cloned()
    }

    fn has_resource(&self, path: &str) -> bool {
        self.resources.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resource_path_keeps_nested_separator() {
        assert_eq!(class_resource_path("java.util.Map$Entry"), "java/util/Map$Entry.class");
        assert_eq!(class_resource_path("Foo"), "Foo.class");
    }

    #[test]
    fn entry_kind_from_extension() {
        assert_eq!(
            ClasspathEntry::from_path("/libs/guava.JAR"),
            ClasspathEntry::Jar(PathBuf::from("/libs/guava.JAR"))
        );
        assert_eq!(
            ClasspathEntry::from_path("/jdk/jmods/java.base.jmod"),
            ClasspathEntry::Jmod(PathBuf::from("/jdk/jmods/java.base.jmod"))
        );
        assert_eq!(
            ClasspathEntry::from_path("target/classes"),
            ClasspathEntry::ClassDir(PathBuf::from("target/classes"))
        );
    }

    #[test]
    fn in_memory_lookup() {
        let cp = InMemoryClasspath::new().with_class("a.B", vec![1, 2, 3]);
        assert_eq!(cp.bytes_for_class("a.B"), Some(vec![1, 2, 3]));
        assert!(cp.has_resource("a/B.class"));
        assert_eq!(cp.bytes_for_class("a.C"), None);
    }
}
