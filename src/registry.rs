//! The string accessor registry: named host-side callbacks the runtime
//! invokes to read dynamic string values (session tokens, network state)
//! after the configuration has been applied.
//!
//! The registry is the one piece of shared state in this crate. The
//! rendered document references accessors by name only; the callbacks
//! themselves live here, owned by the engine, and must support lookups from
//! runtime threads concurrently with (rare, startup-time) registrations. A
//! mutex around the map is sufficient at that access pattern. The registry
//! is an explicit object rather than a process-wide singleton so multiple
//! engines in one process stay independent and tests stay hermetic.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// A host-supplied callback returning the current value of a named dynamic
/// string on demand.
pub trait StringAccessor: Send + Sync {
    fn get(&self) -> String;
}

#[derive(Default)]
pub struct StringAccessorRegistry {
    entries: Mutex<HashMap<String, Arc<dyn StringAccessor>>>,
}

impl StringAccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accessor under `name`. Re-registering a name replaces
    /// the previous accessor.
    pub fn register(&self, name: &str, accessor: Arc<dyn StringAccessor>) {
        self.entries.lock().insert(name.to_string(), accessor);
    }

    /// Look up an accessor by name. Returns `None` for unregistered names;
    /// repeated lookups do not change the registration.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn StringAccessor>> {
        self.entries.lock().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAccessor {
        data: String,
        count: AtomicUsize,
    }

    impl CountingAccessor {
        fn new(data: &str) -> Self {
            Self {
                data: data.to_string(),
                count: AtomicUsize::new(0),
            }
        }

        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    impl StringAccessor for CountingAccessor {
        fn get(&self) -> String {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.data.clone()
        }
    }

    #[test]
    fn registered_accessor_is_found_and_counted() {
        let registry = StringAccessorRegistry::new();
        let accessor = Arc::new(CountingAccessor::new("dynamic value"));
        registry.register("accessor_name", accessor.clone());

        let found = registry.lookup("accessor_name").unwrap();
        assert_eq!(accessor.count(), 0);
        assert_eq!(found.get(), "dynamic value");
        assert_eq!(accessor.count(), 1);
        found.get();
        assert_eq!(accessor.count(), 2);
    }

    #[test]
    fn unregistered_name_is_not_found() {
        let registry = StringAccessorRegistry::new();
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn reregistration_replaces() {
        let registry = StringAccessorRegistry::new();
        registry.register("name", Arc::new(CountingAccessor::new("first")));
        registry.register("name", Arc::new(CountingAccessor::new("second")));
        assert_eq!(registry.lookup("name").unwrap().get(), "second");
    }

    #[test]
    fn lookup_does_not_consume_registration() {
        let registry = StringAccessorRegistry::new();
        registry.register("name", Arc::new(CountingAccessor::new("v")));
        assert!(registry.lookup("name").is_some());
        assert!(registry.lookup("name").is_some());
    }

    #[test]
    fn concurrent_lookups_and_registrations() {
        let registry = Arc::new(StringAccessorRegistry::new());
        registry.register("shared", Arc::new(CountingAccessor::new("v")));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if i == 0 {
                            registry
                                .register("shared", Arc::new(CountingAccessor::new("v")));
                        } else {
                            let _ = registry.lookup("shared");
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(registry.lookup("shared").is_some());
    }
}
