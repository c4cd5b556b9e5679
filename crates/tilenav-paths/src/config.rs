//! Tunables for the flow-field pathfinder.

use std::time::Duration;

/// Configuration for [`FlowFieldPathfinder`](crate::FlowFieldPathfinder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowFieldConfig {
    /// Longest stretch of expansion before a search hands an interim
    /// snapshot back to its caller.
    pub time_slice: Duration,
    /// Estimated bytes per sparse distance entry. A finished field is
    /// compacted into a one-byte-per-cell direction field when
    /// `width * height < entries * entry_bytes`. Zero never compacts.
    pub entry_bytes: usize,
}

impl Default for FlowFieldConfig {
    fn default() -> Self {
        Self {
            time_slice: Duration::from_millis(100),
            entry_bytes: 20,
        }
    }
}

impl FlowFieldConfig {
    pub fn with_time_slice(mut self, slice: Duration) -> Self {
        self.time_slice = slice;
        self
    }

    pub fn with_entry_bytes(mut self, bytes: usize) -> Self {
        self.entry_bytes = bytes;
        self
    }

    /// Whether a finished field with `entries` sparse entries should be
    /// compacted on a grid of `cells` cells.
    #[inline]
    pub fn should_compact(&self, cells: usize, entries: usize) -> bool {
        cells < entries.saturating_mul(self.entry_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = FlowFieldConfig::default();
        assert_eq!(c.time_slice, Duration::from_millis(100));
        assert_eq!(c.entry_bytes, 20);
    }

    #[test]
    fn compaction_threshold() {
        let c = FlowFieldConfig::default();
        // 10_000 cells are cheaper than 600 entries at 20 bytes each.
        assert!(c.should_compact(10_000, 600));
        assert!(!c.should_compact(10_000, 400));
        assert!(!c.with_entry_bytes(0).should_compact(1, usize::MAX));
        assert!(c.with_entry_bytes(usize::MAX).should_compact(1_000_000, 2));
    }
}
