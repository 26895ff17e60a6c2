//! One search root, its factory table and its singleton cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::escalation::{Fault, FaultKind, Site};

/// Zero-argument constructor for a registered type.
pub type Factory<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;

/// Extension of the per-class marker files.
pub const CLASS_EXTENSION: &str = "class";

/// Which fault kinds a library reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub label: &'static str,
    pub file_missing: FaultKind,
    pub not_defined: FaultKind,
}

/// Business handlers under the application library.
pub const APP_METHODS: Namespace = Namespace {
    label: "method",
    file_missing: FaultKind::MethodFileNotFound,
    not_defined: FaultKind::MethodNotDefined,
};

/// Framework classes under the core library.
pub const CORE_CLASSES: Namespace = Namespace {
    label: "class",
    file_missing: FaultKind::ClassFileNotFound,
    not_defined: FaultKind::ClassNotDefined,
};

/// Explicit name → factory table, filled before bootstrap.
pub struct Factories<T: ?Sized> {
    table: HashMap<String, Factory<T>>,
}

impl<T: ?Sized> Default for Factories<T> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
        }
    }
}

impl<T: ?Sized> Factories<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under the lower-cased `name`. A later registration
    /// replaces an earlier one.
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.table.insert(name.to_lowercase(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    fn get(&self, normalized: &str) -> Option<&Factory<T>> {
        self.table.get(normalized)
    }
}

/// Result of a successful resolution.
pub enum Loaded<T: ?Sized> {
    /// Loaded without instantiating.
    Static,
    Instance(Arc<T>),
}

impl<T: ?Sized> Loaded<T> {
    pub fn instance(self) -> Option<Arc<T>> {
        match self {
            Loaded::Static => None,
            Loaded::Instance(instance) => Some(instance),
        }
    }
}

/// A single-root, exact-name library.
///
/// At most one instance per normalized name is ever constructed: creation
/// happens under the cache entry lock.
pub struct Library<T: ?Sized> {
    root: PathBuf,
    namespace: Namespace,
    factories: Factories<T>,
    instances: DashMap<String, Arc<T>>,
}

impl<T: ?Sized> Library<T> {
    pub fn new(root: impl Into<PathBuf>, namespace: Namespace, factories: Factories<T>) -> Self {
        Self {
            root: root.into(),
            namespace,
            factories,
            instances: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The one file a class may live in.
    pub fn class_file(&self, normalized: &str) -> PathBuf {
        self.root.join(format!("{}.{}", normalized, CLASS_EXTENSION))
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.instances.contains_key(&name.to_lowercase())
    }

    pub fn cached_count(&self) -> usize {
        self.instances.len()
    }

    /// Class names with a marker file on disk, sorted. A missing root lists nothing.
    pub fn scan(&self) -> std::io::Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CLASS_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_lowercase());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Names on disk that no factory is registered for.
    pub fn unregistered(&self) -> std::io::Result<Vec<String>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|name| !self.factories.contains(name))
            .collect())
    }

    /// Resolve `name`: probe its class file, then either stop
    /// (`instantiate == false`) or check a type is defined for it and return
    /// the singleton.
    pub fn load(&self, name: &str, instantiate: bool, caller: Site) -> Result<Loaded<T>, Fault> {
        let normalized = name.to_lowercase();
        let file = self.class_file(&normalized);

        if !file.is_file() || fs::File::open(&file).is_err() {
            return Err(Fault::new(
                self.namespace.file_missing,
                format!("class file {} not found", file.display()),
            )
            .called_by(caller));
        }

        if !instantiate {
            return Ok(Loaded::Static);
        }

        let Some(factory) = self.factories.get(&normalized) else {
            return Err(Fault::new(
                self.namespace.not_defined,
                format!("the class {} not found in {}", normalized, file.display()),
            )
            .called_by(caller));
        };

        let mut created = false;
        let instance = self
            .instances
            .entry(normalized.clone())
            .or_insert_with(|| {
                created = true;
                (**factory)()
            })
            .value()
            .clone();

        if created {
            tracing::debug!(namespace = self.namespace.label, name = %normalized, "Instance created");
        }
        Ok(Loaded::Instance(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter: Send + Sync {
        fn id(&self) -> usize;
    }

    struct Hello(usize);

    impl Greeter for Hello {
        fn id(&self) -> usize {
            self.0
        }
    }

    fn library(counter: Arc<AtomicUsize>) -> (tempfile::TempDir, Library<dyn Greeter>) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.class"), "").unwrap();
        fs::write(dir.path().join("orphan.class"), "").unwrap();

        let mut factories: Factories<dyn Greeter> = Factories::new();
        factories.register("Hello", move || {
            let id = counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Hello(id)) as Arc<dyn Greeter>
        });
        factories.register("ghost", || Arc::new(Hello(99)) as Arc<dyn Greeter>);

        let library = Library::new(dir.path(), APP_METHODS, factories);
        (dir, library)
    }

    #[test]
    fn second_resolution_returns_same_instance() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, lib) = library(counter.clone());

        let first = lib.load("hello", true, Site::unknown()).unwrap().instance().unwrap();
        let second = lib.load("HELLO", true, Site::unknown()).unwrap().instance().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(first.id(), 0);
    }

    #[test]
    fn missing_file_fails_and_caches_nothing() {
        let (_dir, lib) = library(Arc::new(AtomicUsize::new(0)));

        let err = lib.load("ghost", true, Site::unknown()).err().unwrap();
        assert_eq!(err.kind(), FaultKind::MethodFileNotFound);
        assert!(err.message().contains("ghost.class"));
        assert!(!lib.is_cached("ghost"));
    }

    #[test]
    fn file_without_factory_is_not_defined() {
        let (_dir, lib) = library(Arc::new(AtomicUsize::new(0)));
        let err = lib.load("orphan", true, Site::unknown()).err().unwrap();
        assert_eq!(err.kind(), FaultKind::MethodNotDefined);
        assert_eq!(err.code(), Some(35));
    }

    #[test]
    fn static_load_does_not_instantiate() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, lib) = library(counter.clone());

        assert!(matches!(lib.load("hello", false, Site::unknown()), Ok(Loaded::Static)));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!lib.is_cached("hello"));
    }

    #[test]
    fn static_load_needs_only_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sql.class"), "").unwrap();
        let lib: Library<dyn Greeter> = Library::new(dir.path(), CORE_CLASSES, Factories::new());

        assert!(matches!(lib.load("sql", false, Site::unknown()), Ok(Loaded::Static)));

        let err = lib.load("sql", true, Site::unknown()).err().unwrap();
        assert_eq!(err.kind(), FaultKind::ClassNotDefined);
        assert_eq!(err.code(), Some(3));
    }

    #[test]
    fn directory_named_like_a_class_is_not_a_class_file() {
        let (dir, lib) = library(Arc::new(AtomicUsize::new(0)));
        fs::create_dir(dir.path().join("folder.class")).unwrap();

        let err = lib.load("folder", false, Site::unknown()).err().unwrap();
        assert_eq!(err.kind(), FaultKind::MethodFileNotFound);
    }

    #[test]
    fn concurrent_first_resolution_builds_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, lib) = library(counter.clone());
        let lib = Arc::new(lib);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let lib = lib.clone();
                std::thread::spawn(move || lib.load("hello", true, Site::unknown()).unwrap().instance().unwrap())
            })
            .collect();
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn scan_lists_class_files() {
        let (dir, lib) = library(Arc::new(AtomicUsize::new(0)));
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(lib.scan().unwrap(), vec!["hello", "orphan"]);
        assert_eq!(lib.unregistered().unwrap(), vec!["orphan"]);
    }

    #[test]
    fn core_namespace_uses_its_own_codes() {
        let dir = tempfile::tempdir().unwrap();
        let lib: Library<dyn Greeter> = Library::new(dir.path(), CORE_CLASSES, Factories::new());
        let err = lib.load("dao", true, Site::unknown()).err().unwrap();
        assert_eq!(err.kind(), FaultKind::ClassFileNotFound);
        assert_eq!(err.code(), Some(3));
    }
}
