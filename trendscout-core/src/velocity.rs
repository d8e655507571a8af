use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Post;

/// Inclusive post-age window, in hours, inside which velocity is meaningful.
/// Younger posts are too noisy, older ones are stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityWindow {
    pub min_age_hours: f64,
    pub max_age_hours: f64,
}

impl Default for VelocityWindow {
    fn default() -> Self {
        Self {
            min_age_hours: 0.5,
            max_age_hours: 24.0,
        }
    }
}

impl VelocityWindow {
    pub fn contains(&self, age_hours: f64) -> bool {
        age_hours >= self.min_age_hours && age_hours <= self.max_age_hours
    }
}

pub fn age_hours(post: &Post, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(post.created_at);
    elapsed.num_milliseconds() as f64 / 3_600_000.0
}

/// Popularity gained per hour since creation, or 0 outside the window.
pub fn estimate(post: &Post, now: DateTime<Utc>, window: &VelocityWindow) -> f64 {
    let age = age_hours(post, now);
    if age <= 0.0 || !window.contains(age) {
        return 0.0;
    }
    post.score as f64 / age
}
