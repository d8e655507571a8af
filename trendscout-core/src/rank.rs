use crate::types::Candidate;

pub const DEFAULT_BUYING_SIGNAL_BONUS: f64 = 1000.0;

pub fn priority_weight(velocity: f64, buying_signal_count: usize, bonus: f64) -> f64 {
    if buying_signal_count > 0 {
        velocity + bonus
    } else {
        velocity
    }
}

/// Assigns priority weights and orders the pool highest first. The sort is
/// stable, so equal weights keep discovery order.
pub fn rank(mut candidates: Vec<Candidate>, bonus: f64) -> Vec<Candidate> {
    for candidate in &mut candidates {
        candidate.priority =
            priority_weight(candidate.velocity, candidate.buying_signal_count(), bonus);
    }
    candidates.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    candidates
}
