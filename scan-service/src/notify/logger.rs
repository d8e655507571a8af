use tracing::info;
use trendscout_core::CoreError;

use super::{clip, Alert, Notifier};

/// Writes alerts to the log only. Used when no push channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), CoreError> {
        info!(
            post_id = %alert.post_id,
            community = %alert.community,
            score = alert.result.score,
            tier = %alert.tier,
            velocity = alert.velocity,
            url = %alert.post_url(),
            "HIGH SCORE ALERT: {}",
            clip(&alert.title, 80)
        );
        Ok(())
    }
}
