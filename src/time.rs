//! Microsecond time ranges, the unit everything on a track is measured in.

use serde::{Deserialize, Serialize};

/// One second in draft time units.
pub const SEC: i64 = 1_000_000;

/// A span on the timeline: start offset plus duration, both in microseconds.
///
/// Values are carried as-is; nothing here clamps or rejects negative inputs.
/// The draft format only ever stores non-negative ranges, and consumers that
/// build ranges from untrusted data are expected to re-validate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timerange {
    /// Start offset in microseconds.
    pub start: i64,
    /// Duration in microseconds.
    pub duration: i64,
}

impl Timerange {
    /// Create a range from a start offset and duration, both in microseconds.
    pub fn new(start: i64, duration: i64) -> Self {
        Self { start, duration }
    }

    /// Create a range from seconds, for hand-written drafts.
    pub fn from_secs(start_secs: f64, duration_secs: f64) -> Self {
        Self {
            start: (start_secs * SEC as f64).round() as i64,
            duration: (duration_secs * SEC as f64).round() as i64,
        }
    }

    /// End offset (`start + duration`), microseconds.
    pub fn end(self) -> i64 {
        self.start + self.duration
    }

    /// Whether the open intervals of `self` and `other` intersect.
    pub fn overlaps(self, other: Timerange) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Whether one range ends exactly where the other begins.
    pub fn abuts(self, other: Timerange) -> bool {
        self.end() == other.start || other.end() == self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_start_plus_duration() {
        for (start, duration) in [(0, 0), (0, 1), (1_000, 5_000), (42, 0)] {
            assert_eq!(Timerange::new(start, duration).end(), start + duration);
        }
    }

    #[test]
    fn from_secs_rounds_to_microseconds() {
        let tr = Timerange::from_secs(1.5, 0.25);
        assert_eq!(tr.start, 1_500_000);
        assert_eq!(tr.duration, 250_000);
    }

    #[test]
    fn overlap_is_open_interval() {
        let a = Timerange::new(0, 100);
        let b = Timerange::new(100, 50);
        let c = Timerange::new(99, 50);
        assert!(!a.overlaps(b));
        assert!(a.abuts(b));
        assert!(a.overlaps(c));
        assert!(!a.overlaps(Timerange::new(200, 10)));
    }

    #[test]
    fn json_shape_matches_draft_schema() {
        let tr = Timerange::new(1_000, 5_000);
        let v = serde_json::to_value(tr).unwrap();
        assert_eq!(v, serde_json::json!({"start": 1_000, "duration": 5_000}));
        let back: Timerange = serde_json::from_value(v).unwrap();
        assert_eq!(back, tr);
    }
}
