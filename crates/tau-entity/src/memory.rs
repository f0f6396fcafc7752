//! Three-tier entity memory.
//!
//! - **Short-term**: the most recent records, bounded (default 20). The
//!   oldest record is evicted when the bound is exceeded.
//! - **Long-term**: curated records, unbounded, append-only.
//! - **Archeological**: foundational narrative strings, unbounded,
//!   append-only. Seeded with the entity's origin story at creation.
//!
//! Eviction from short-term is the only way anything ever leaves memory.

use std::collections::VecDeque;

use tau_types::{MemoryRecord, Stamped};
use tracing::debug;

/// Default short-term capacity.
pub const DEFAULT_SHORT_TERM_CAPACITY: usize = 20;

/// An entity's tiered memory.
#[derive(Debug, Clone)]
pub struct TieredMemory {
    short_term: VecDeque<Stamped<MemoryRecord>>,
    long_term: Vec<Stamped<MemoryRecord>>,
    archeological: Vec<String>,
    short_term_capacity: usize,
}

impl Default for TieredMemory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SHORT_TERM_CAPACITY)
    }
}

impl TieredMemory {
    /// Create an empty memory with the given short-term bound.
    pub fn with_capacity(short_term_capacity: usize) -> Self {
        Self {
            short_term: VecDeque::with_capacity(short_term_capacity.saturating_add(1)),
            long_term: Vec::new(),
            archeological: Vec::new(),
            short_term_capacity,
        }
    }

    /// Append to short-term, evicting the oldest entries beyond capacity.
    pub fn record_short_term(&mut self, record: MemoryRecord) {
        debug!(action = %record.action, "Short-term recorded");
        self.short_term.push_back(Stamped::now(record));
        while self.short_term.len() > self.short_term_capacity {
            self.short_term.pop_front();
        }
    }

    /// Append to long-term.
    pub fn record_long_term(&mut self, record: MemoryRecord) {
        debug!(action = %record.action, "Long-term recorded");
        self.long_term.push(Stamped::now(record));
    }

    /// Append one narrative segment to the archeological log.
    pub fn record_archeological(&mut self, segment: impl Into<String>) {
        self.archeological.push(segment.into());
    }

    /// Append several narrative segments, in order.
    pub fn extend_archeological<I, S>(&mut self, segments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.archeological
            .extend(segments.into_iter().map(Into::into));
    }

    /// Short-term records, oldest first.
    pub const fn short_term(&self) -> &VecDeque<Stamped<MemoryRecord>> {
        &self.short_term
    }

    /// Long-term records, oldest first.
    pub fn long_term(&self) -> &[Stamped<MemoryRecord>] {
        &self.long_term
    }

    /// Archeological narrative, oldest first.
    pub fn archeological(&self) -> &[String] {
        &self.archeological
    }

    /// The configured short-term bound.
    pub const fn short_term_capacity(&self) -> usize {
        self.short_term_capacity
    }

    /// The last `n` archeological segments (fewer if the log is shorter).
    pub fn archeological_tail(&self, n: usize) -> &[String] {
        let start = self.archeological.len().saturating_sub(n);
        self.archeological.get(start..).unwrap_or_default()
    }
}
