use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use trendscout_core::{QualificationPath, Tier};
use uuid::Uuid;

/// Counters for one pass of the scanner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub communities_checked: usize,
    pub communities_failed: usize,
    pub posts_observed: usize,
    pub duplicates_skipped: usize,
    pub posts_excluded: usize,
    pub comment_fetch_failures: usize,
    pub candidates_found: usize,
    pub candidates_scored: usize,
    /// Post ids the budget cut off, in rank order.
    pub unscored: Vec<String>,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub paths: BTreeMap<QualificationPath, usize>,
}

impl RunSummary {
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: None,
            communities_checked: 0,
            communities_failed: 0,
            posts_observed: 0,
            duplicates_skipped: 0,
            posts_excluded: 0,
            comment_fetch_failures: 0,
            candidates_found: 0,
            candidates_scored: 0,
            unscored: Vec::new(),
            high: 0,
            medium: 0,
            low: 0,
            notifications_sent: 0,
            notifications_failed: 0,
            paths: BTreeMap::new(),
        }
    }

    pub fn record_paths(&mut self, paths: &[QualificationPath]) {
        for path in paths {
            *self.paths.entry(*path).or_insert(0) += 1;
        }
    }

    pub fn record_tier(&mut self, tier: Tier) {
        match tier {
            Tier::High => self.high += 1,
            Tier::Medium => self.medium += 1,
            Tier::Low => self.low += 1,
        }
    }

    pub fn path_count(&self, path: QualificationPath) -> usize {
        self.paths.get(&path).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_json() {
        let mut summary = RunSummary::new(Uuid::new_v4(), Utc::now());
        summary.record_paths(&[
            QualificationPath::HighVelocity,
            QualificationPath::HighEngagement,
        ]);
        summary.record_paths(&[QualificationPath::HighVelocity]);
        summary.record_tier(Tier::High);
        summary.record_tier(Tier::Low);
        summary.record_tier(Tier::Low);

        assert_eq!(summary.path_count(QualificationPath::HighVelocity), 2);
        assert_eq!(summary.path_count(QualificationPath::BuyingSignal), 0);
        assert_eq!((summary.high, summary.medium, summary.low), (1, 0, 2));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["paths"]["high_velocity"], 2);
        assert_eq!(json["paths"]["high_engagement"], 1);
        assert!(json["finished_at"].is_null());
    }
}
