//! Threshold crossing detection.

use std::collections::BTreeSet;

use wikigaia_core::config::MilestoneConfig;

/// Thresholds crossed when a count moves from `old` to `new`.
///
/// A threshold `t` is crossed iff `old < t <= new`. Decreases and unchanged
/// counts never cross anything.
pub fn detect(old: i64, new: i64, thresholds: &[i64]) -> BTreeSet<i64> {
    if new <= old {
        return BTreeSet::new();
    }
    thresholds
        .iter()
        .copied()
        .filter(|t| old < *t && new >= *t)
        .collect()
}

/// [`detect`] bound to the configured thresholds.
#[derive(Debug, Clone)]
pub struct MilestoneDetector {
    thresholds: Vec<i64>,
}

impl MilestoneDetector {
    /// Creates a detector from configuration.
    pub fn new(config: &MilestoneConfig) -> Self {
        let mut config = config.clone();
        config.normalize();
        Self {
            thresholds: config.thresholds,
        }
    }

    /// Thresholds crossed between `old` and `new`.
    pub fn detect(&self, old: i64, new: i64) -> BTreeSet<i64> {
        detect(old, new, &self.thresholds)
    }

    /// The top threshold, which also alerts admins.
    pub fn max_threshold(&self) -> Option<i64> {
        self.thresholds.last().copied()
    }

    /// Configured thresholds, ascending.
    pub fn thresholds(&self) -> &[i64] {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &[i64] = &[50, 75, 100];

    fn set(values: &[i64]) -> BTreeSet<i64> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_single_crossing() {
        assert_eq!(detect(49, 51, DEFAULT), set(&[50]));
        assert_eq!(detect(49, 50, DEFAULT), set(&[50]));
    }

    #[test]
    fn test_jump_crosses_everything_in_between() {
        assert_eq!(detect(40, 101, DEFAULT), set(&[50, 75, 100]));
    }

    #[test]
    fn test_no_change_or_decrease() {
        assert!(detect(60, 60, DEFAULT).is_empty());
        assert!(detect(51, 49, DEFAULT).is_empty());
        assert!(detect(50, 51, DEFAULT).is_empty());
    }

    #[test]
    fn test_detector_normalizes_config() {
        let detector = MilestoneDetector::new(&MilestoneConfig {
            thresholds: vec![100, 50, 75, 50],
        });
        assert_eq!(detector.thresholds(), &[50, 75, 100]);
        assert_eq!(detector.max_threshold(), Some(100));
        assert_eq!(detector.detect(74, 75), set(&[75]));
    }
}
