use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe counter that supports deposits and all-or-nothing withdrawals,
/// keeping its value non-negative.
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new `Counter` with the given initial amount.
    pub fn new(amount: u64) -> Counter {
        Counter(AtomicU64::new(amount))
    }

    /// Attempts to withdraw the specified `amount` from the counter.
    ///
    /// If the current value is greater than or equal to `amount`, it is subtracted
    /// and `true` is returned. Otherwise the counter remains unchanged and `false`
    /// is returned.
    pub fn withdraw(&self, amount: u64) -> bool {
        let mut current = self.0.load(Ordering::Relaxed);
        while current >= amount {
            match self.0.compare_exchange_weak(
                current,
                current - amount,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated) => current = updated,
            }
        }
        false
    }

    /// Adds `amount` to the counter.
    pub fn deposit(&self, amount: u64) {
        self.0.fetch_add(amount, Ordering::Release);
    }

    /// Returns the counter value (most likely stale by the time it is observed by the caller).
    pub fn read(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_withdraw() {
        let counter = Counter::new(100);
        assert!(counter.withdraw(30));
        assert!(counter.withdraw(70));
        assert_eq!(counter.read(), 0);
        assert!(!counter.withdraw(1));
        assert_eq!(counter.read(), 0);
    }

    #[test]
    fn test_deposit() {
        let counter = Counter::new(0);
        counter.deposit(50);
        counter.deposit(25);
        assert_eq!(counter.read(), 75);
    }

    #[test]
    fn test_concurrent_deposit_withdraw() {
        let counter = Arc::new(Counter::new(0));
        let handles = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.deposit(3);
                        assert!(counter.withdraw(3));
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.read(), 0);
    }
}
