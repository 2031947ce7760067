//! Epoch-microsecond clocks

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds per millisecond
pub const MICROS_PER_MILLI: i64 = 1_000;

/// Source of epoch-microsecond timestamps.
///
/// Implementations must not block and must not fail.
pub trait Clock: Send + Sync + Debug {
    /// Current time in microseconds since the Unix epoch
    fn now_micros(&self) -> i64;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Shared handle to the system clock
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        elapsed.as_micros() as i64
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start_micros`
    pub fn new(start_micros: i64) -> Self {
        Self {
            micros: AtomicI64::new(start_micros),
        }
    }

    /// Set the absolute time
    pub fn set(&self, micros: i64) {
        self.micros.store(micros, Ordering::SeqCst);
    }

    /// Move forward by `delta` microseconds
    pub fn advance_micros(&self, delta: i64) {
        self.micros.fetch_add(delta, Ordering::SeqCst);
    }

    /// Move forward by `delta` milliseconds
    pub fn advance_millis(&self, delta: i64) {
        self.advance_micros(delta * MICROS_PER_MILLI);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> i64 {
        self.micros.load(Ordering::SeqCst)
    }
}
