// Shared test helpers: a scripted counter source with a predictable tick pattern.

#![allow(dead_code)]

use hoststat::models::{CoreTicks, LoadAverage, RawSnapshot};
use hoststat::source::{CounterSource, SourceError};
use hoststat::{Profile, ScheduledCollector};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Call k advances the single core by `k` user ticks and `100 - k` idle ticks, so the
/// delta against call k-1 is exactly k% user. `load.one` and `threads` report k.
pub struct FakeSource {
    delay: Duration,
    /// Held for a whole read when set, like the real sources' own state locks.
    gate: Option<Mutex<()>>,
    calls: AtomicU64,
    ticks: Mutex<[u64; 8]>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_call: AtomicU64,
    panic_call: AtomicU64,
    unavailable: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Self::build(delay, None)
    }

    /// A source meant to be shared by several collectors; reads never overlap.
    pub fn exclusive(delay: Duration) -> Arc<Self> {
        Self::build(delay, Some(Mutex::new(())))
    }

    fn build(delay: Duration, gate: Option<Mutex<()>>) -> Arc<Self> {
        Arc::new(Self {
            delay,
            gate,
            calls: AtomicU64::new(0),
            // Non-zero baseline so the core never looks offline.
            ticks: Mutex::new([0, 0, 0, 1_000, 0, 0, 0, 0]),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fail_call: AtomicU64::new(0),
            panic_call: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Makes call number `k` (1-based) fail with a transient error.
    pub fn fail_on_call(&self, k: u64) {
        self.fail_call.store(k, Ordering::SeqCst);
    }

    /// Makes call number `k` (1-based) panic after its ticks were counted.
    pub fn panic_on_call(&self, k: u64) {
        self.panic_call.store(k, Ordering::SeqCst);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl CounterSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn check_available(&self) -> Result<(), SourceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("fake target is gone".into()));
        }
        Ok(())
    }

    fn sample_now(&self) -> Result<RawSnapshot, SourceError> {
        self.check_available()?;
        let _gate = self.gate.as_ref().map(|gate| gate.lock().unwrap());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let k = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let ticks = {
            let mut ticks = self.ticks.lock().unwrap();
            ticks[0] += k;
            ticks[3] += 100 - k.min(100);
            *ticks
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_call.load(Ordering::SeqCst) == k {
            panic!("scripted panic on call {}", k);
        }

        if self.fail_call.load(Ordering::SeqCst) == k {
            return Err(SourceError::Failed(format!("scripted failure on call {}", k)));
        }

        let mut snapshot = RawSnapshot::now();
        snapshot.cpu_ticks = vec![CoreTicks::new(ticks)];
        snapshot.load = Some(LoadAverage {
            one: k as f64,
            five: 0.0,
            fifteen: 0.0,
        });
        snapshot.threads = Some(k);
        Ok(snapshot)
    }
}

pub fn server_collector(source: &Arc<FakeSource>) -> ScheduledCollector {
    ScheduledCollector::new(Profile::Server, source.clone())
}

pub const WINDOW: Duration = Duration::from_secs(3600);
