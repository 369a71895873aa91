// Counter sources: synchronous "sample now" readers of OS counters.
// Each source guards its own state with its own mutex, so one source can be shared
// (via Arc) by several collectors without sharing their cycle locks.

mod allocator;
mod host;
mod linux;
mod process;

pub use host::HostSource;
pub use process::ProcessSource;

use crate::models::RawSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The monitored target is absent or unreachable; callers may choose to back off.
    #[error("counter source unavailable: {0}")]
    Unavailable(String),

    /// One reading failed; the next cycle may succeed.
    #[error("counter source failed: {0}")]
    Failed(String),
}

/// Returns instantaneous counter values in a fixed-shape [`RawSnapshot`].
///
/// Calls are blocking and expected to return quickly; the collector runs them on the
/// blocking pool.
pub trait CounterSource: Send + Sync {
    /// Short name used in logs (e.g. `"server"`, `"process"`).
    fn name(&self) -> &str;

    /// Checks that the target can be sampled at all. Called by `start()`.
    fn check_available(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Captures one snapshot of all counters.
    fn sample_now(&self) -> Result<RawSnapshot, SourceError>;
}
