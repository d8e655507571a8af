use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Sleeps the full `delay` before every call to [`Pacer::wait`] except the
/// first, so each remote call is followed by a pause however long it took.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    pub async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            debug!(delay_ms = self.delay.as_millis() as u64, "Pacing");
            sleep(self.delay).await;
        }
        self.started = true;
    }
}
