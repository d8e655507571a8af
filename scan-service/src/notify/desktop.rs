use notify_rust::{Notification, Timeout};
use tracing::debug;
use trendscout_core::{CoreError, NotifyError};

use super::{clip, Alert, Notifier};

const APP_NAME: &str = "Trendscout";

/// Local desktop notification through the platform notification service.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    timeout_ms: u32,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self { timeout_ms: 10_000 }
    }

    pub fn summary(alert: &Alert) -> String {
        format!(
            "🔥 {}/10 in r/{}: {}",
            alert.result.score,
            alert.community,
            clip(&alert.title, 60)
        )
    }

    pub fn body(alert: &Alert) -> String {
        let mut body = format!(
            "{:.0} upvotes/hour. {}",
            alert.velocity,
            clip(&alert.result.rationale, 200)
        );
        if !alert.result.variations.is_empty() {
            body.push_str("\nTry: ");
            body.push_str(&clip(&alert.result.variations, 120));
        }
        body.push('\n');
        body.push_str(&alert.post_url());
        body
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), CoreError> {
        let summary = Self::summary(alert);
        let body = Self::body(alert);
        let timeout = Timeout::Milliseconds(self.timeout_ms);

        // The D-Bus call blocks.
        let shown = tokio::task::spawn_blocking(move || {
            Notification::new()
                .appname(APP_NAME)
                .summary(&summary)
                .body(&body)
                .timeout(timeout)
                .show()
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| CoreError::Internal {
            message: format!("Desktop notification task failed: {}", e),
        })?;

        shown.map_err(|reason| NotifyError::Desktop { reason })?;
        debug!(post_id = %alert.post_id, "Desktop notification shown");
        Ok(())
    }
}
