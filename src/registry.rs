use std::{
    collections::HashMap,
    fmt::{self, Display},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::logging::LogCore;

pub type CoreHandle = Arc<dyn LogCore>;

pub type CoreMap = HashMap<String, CoreHandle>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Log,
    Trace,
}

impl Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Log => write!(f, "log"),
            StreamKind::Trace => write!(f, "trace"),
        }
    }
}

/// Name to core mapping for one stream.
///
/// Entries are only ever added or replaced; a second registration under the
/// same name replaces the first one, so a sink module can register again
/// after reloading.
pub struct CoreRegistry {
    kind: StreamKind,
    cores: Mutex<CoreMap>,
}

impl CoreRegistry {
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            cores: Mutex::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Registers `core` under `name` and returns the core it replaced, if any.
    pub fn register(&self, name: impl Into<String>, core: CoreHandle) -> Option<CoreHandle> {
        let name = name.into();
        let previous = self.lock().insert(name.clone(), core);

        if previous.is_some() {
            tracing::warn!(stream = %self.kind, core = %name, "replaced registered log core");
        } else {
            tracing::debug!(stream = %self.kind, core = %name, "registered log core");
        }

        previous
    }

    /// Snapshot of every registered core.
    pub fn get_all(&self) -> CoreMap {
        self.lock().clone()
    }

    pub fn get(&self, name: &str) -> Option<CoreHandle> {
        self.lock().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock can't leave the map half written.
    fn lock(&self) -> MutexGuard<'_, CoreMap> {
        self.cores.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreRegistry")
            .field("kind", &self.kind)
            .field("cores", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{BufferCore, NullCore};
    use std::{io, panic};

    #[derive(Clone, Default)]
    struct CapturedOutput {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl CapturedOutput {
        fn lines(&self) -> Vec<String> {
            let buffer = self.buffer.lock().unwrap();
            String::from_utf8_lossy(&buffer)
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        (result, output.lines())
    }

    #[test]
    fn test_starts_empty() {
        let registry = CoreRegistry::new(StreamKind::Log);
        assert!(registry.is_empty());
        assert!(registry.get_all().is_empty());
        assert!(registry.get("file").is_none());
    }

    #[test]
    fn test_reregistration_keeps_last_handle() {
        let registry = CoreRegistry::new(StreamKind::Log);
        let first: CoreHandle = Arc::new(NullCore::new());
        let second: CoreHandle = Arc::new(BufferCore::new());

        assert!(registry.register("file", first.clone()).is_none());
        let replaced = registry.register("file", second.clone());

        assert!(Arc::ptr_eq(&replaced.unwrap(), &first));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get_all()["file"], &second));
    }

    #[test]
    fn test_distinct_names_are_kept() {
        let registry = CoreRegistry::new(StreamKind::Trace);
        registry.register("file", Arc::new(NullCore::new()));
        registry.register("syslog", Arc::new(NullCore::new()));

        assert_eq!(registry.names(), vec!["file", "syslog"]);
        assert_eq!(registry.get_all().len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_registrations() {
        let registry = CoreRegistry::new(StreamKind::Log);
        registry.register("file", Arc::new(NullCore::new()));

        let snapshot = registry.get_all();
        registry.register("network", Arc::new(NullCore::new()));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_overwrite_warns_with_stream_and_core() {
        let registry = CoreRegistry::new(StreamKind::Log);

        let (_, first) = capture(|| registry.register("file", Arc::new(NullCore::new())));
        assert!(first.iter().all(|line| !line.contains("WARN")));

        let (_, second) = capture(|| registry.register("file", Arc::new(NullCore::new())));
        let warnings: Vec<_> = second.iter().filter(|line| line.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("stream=log"));
        assert!(warnings[0].contains("core=file"));
    }

    #[test]
    fn test_registers_after_poisoned_lock() {
        let registry = CoreRegistry::new(StreamKind::Trace);
        registry.register("file", Arc::new(NullCore::new()));

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = registry.cores.lock().unwrap();
            panic!("sink module failed during registration");
        }));
        assert!(result.is_err());
        assert!(registry.cores.is_poisoned());

        registry.register("network", Arc::new(NullCore::new()));

        let cores = registry.get_all();
        assert_eq!(cores.len(), 2);
        assert!(cores.contains_key("network"));
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = CoreRegistry::new(StreamKind::Log);
        let count = 64;

        std::thread::scope(|scope| {
            for i in 0..count {
                let registry = &registry;
                scope.spawn(move || {
                    registry.register(format!("core-{}", i), Arc::new(NullCore::new()));
                });
            }
        });

        let cores = registry.get_all();
        assert_eq!(cores.len(), count);
        for i in 0..count {
            assert!(cores.contains_key(&format!("core-{}", i)));
        }
    }
}
