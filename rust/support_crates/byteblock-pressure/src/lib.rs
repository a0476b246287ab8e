//! Accounting of unmanaged memory held by byte blocks.
//!
//! Heap-backed blocks report their allocation size to a [`MemoryPressure`]
//! tracker for as long as the allocation is alive. The tracker is purely
//! informational: hosts may poll it to decide when to trim caches, but no
//! allocation is ever refused because of it.

use std::sync::{Arc, OnceLock};

use counter::Counter;

pub mod counter;

/// A shared tally of outstanding unmanaged bytes.
#[derive(Clone)]
pub struct MemoryPressure(Arc<Counter>);

impl MemoryPressure {
    /// Creates a new, independent tracker starting at zero.
    pub fn new() -> MemoryPressure {
        MemoryPressure(Arc::new(Counter::new(0)))
    }

    /// The process-wide tracker used by blocks that were not given one explicitly.
    pub fn global() -> &'static MemoryPressure {
        static GLOBAL: OnceLock<MemoryPressure> = OnceLock::new();
        GLOBAL.get_or_init(MemoryPressure::new)
    }

    /// Currently reported amount of unmanaged memory, in bytes.
    ///
    /// **Note**: intended for diagnostics; the value may be outdated in a concurrent
    /// environment.
    pub fn current(&self) -> u64 {
        self.0.read()
    }

    pub fn add(&self, bytes: u64) {
        self.0.deposit(bytes);
    }

    /// Removes `bytes` from the tally.
    ///
    /// Removing more than was added is a caller bug; the tally is left unchanged
    /// in that case.
    pub fn remove(&self, bytes: u64) {
        let withdrawn = self.0.withdraw(bytes);
        debug_assert!(withdrawn, "memory pressure underflow: {bytes}");
    }

    /// Adds `bytes` to the tally and returns a guard that removes them again
    /// when dropped.
    pub fn register(&self, bytes: u64) -> PressureGuard {
        self.add(bytes);
        PressureGuard {
            pressure: self.clone(),
            bytes,
        }
    }
}

impl Default for MemoryPressure {
    fn default() -> Self {
        MemoryPressure::new()
    }
}

impl std::fmt::Debug for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MemoryPressure").field(&self.current()).finish()
    }
}

/// Outstanding registration with a [`MemoryPressure`] tracker.
#[derive(Debug)]
pub struct PressureGuard {
    pressure: MemoryPressure,
    bytes: u64,
}

impl PressureGuard {
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl Drop for PressureGuard {
    fn drop(&mut self) {
        self.pressure.remove(self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryPressure;

    #[test]
    fn test_add_remove() {
        let pressure = MemoryPressure::new();
        pressure.add(100);
        pressure.add(20);
        assert_eq!(pressure.current(), 120);
        pressure.remove(100);
        assert_eq!(pressure.current(), 20);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let pressure = MemoryPressure::new();
        let a = pressure.register(4096);
        let b = pressure.clone().register(10);
        assert_eq!(a.bytes(), 4096);
        assert_eq!(pressure.current(), 4106);
        drop(a);
        assert_eq!(pressure.current(), 10);
        drop(b);
        assert_eq!(pressure.current(), 0);
    }

    #[test]
    fn test_global_is_shared() {
        let a = MemoryPressure::global() as *const MemoryPressure;
        let b = MemoryPressure::global() as *const MemoryPressure;
        assert_eq!(a, b);
    }
}
