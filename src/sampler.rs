// Sampler: one counter read per call, CPU usage derived against the retained snapshot.

use crate::models::{RawSnapshot, Sample};
use crate::source::{CounterSource, SourceError};
use crate::usage::derive_cpu;
use std::sync::Arc;

pub struct Sampler {
    source: Arc<dyn CounterSource>,
    previous: Option<RawSnapshot>,
}

impl Sampler {
    pub fn new(source: Arc<dyn CounterSource>) -> Self {
        Self {
            source,
            previous: None,
        }
    }

    /// Reads the source once and derives a Sample. On error the previous snapshot is kept,
    /// so the next successful call still yields a real delta.
    pub fn sample(&mut self) -> Result<Sample, SourceError> {
        let current = self.source.sample_now()?;
        let cpu = derive_cpu(self.previous.as_ref(), &current);
        let sample = Sample::from_snapshot(&current, cpu);
        self.previous = Some(current);
        Ok(sample)
    }

    /// Forgets the previous snapshot; the next sample reports derived values as unknown.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
