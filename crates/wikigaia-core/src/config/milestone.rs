//! Vote milestone thresholds.

use serde::{Deserialize, Serialize};

/// Vote-count thresholds that trigger milestone notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneConfig {
    /// Thresholds, ascending. The largest one also alerts admins.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<i64>,
}

impl MilestoneConfig {
    /// Sort ascending, drop duplicates and non-positive values.
    pub fn normalize(&mut self) {
        self.thresholds.retain(|t| *t > 0);
        self.thresholds.sort_unstable();
        self.thresholds.dedup();
    }

    /// The highest configured threshold.
    pub fn max_threshold(&self) -> Option<i64> {
        self.thresholds.iter().copied().max()
    }
}

impl Default for MilestoneConfig {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
        }
    }
}

fn default_thresholds() -> Vec<i64> {
    vec![50, 75, 100]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let mut config = MilestoneConfig {
            thresholds: vec![100, 50, 0, 75, 50, -3],
        };
        config.normalize();
        assert_eq!(config.thresholds, vec![50, 75, 100]);
        assert_eq!(config.max_threshold(), Some(100));
    }
}
