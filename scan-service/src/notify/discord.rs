use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};
use trendscout_core::{CoreError, NotifyError};

use super::{clip, Alert, Notifier};

const EMBED_COLOR: u32 = 0x00FF00;

/// Discord incoming webhook, one embed per alert.
pub struct DiscordWebhook {
    webhook_url: String,
    http: Client,
}

impl DiscordWebhook {
    pub fn new(webhook_url: String) -> Result<Self, CoreError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { webhook_url, http })
    }

    pub fn payload(alert: &Alert) -> Value {
        let result = &alert.result;
        let mut fields = vec![
            json!({"name": "T-Shirt Score", "value": format!("**{}/10**", result.score), "inline": true}),
            json!({"name": "Velocity", "value": format!("{:.0}/hour", alert.velocity), "inline": true}),
            json!({"name": "Upvotes", "value": thousands(alert.upvotes), "inline": true}),
            json!({"name": "Analysis", "value": clip(&result.rationale, 300), "inline": false}),
        ];

        if alert.buying_signal_count > 0 {
            fields.push(json!({
                "name": "🛒 Buying Signals",
                "value": format!("{} comment(s) asking for it", alert.buying_signal_count),
                "inline": true,
            }));
        }
        if !result.variations.is_empty() {
            fields.push(json!({
                "name": "💡 Better Variations",
                "value": clip(&result.variations, 300),
                "inline": false,
            }));
        }
        if !result.target.is_empty() {
            fields.push(json!({
                "name": "🎯 Target Buyers",
                "value": clip(&result.target, 200),
                "inline": false,
            }));
        }
        if !result.angle.is_empty() {
            fields.push(json!({
                "name": "🎨 Angle",
                "value": clip(&result.angle, 200),
                "inline": false,
            }));
        }
        fields.push(json!({
            "name": "Source",
            "value": format!("[View on Reddit]({})", alert.post_url()),
            "inline": false,
        }));

        json!({
            "embeds": [{
                "title": format!("🔥 HIGH POTENTIAL: {}", clip(&alert.title, 100)),
                "color": EMBED_COLOR,
                "fields": fields,
                "footer": {"text": format!("r/{} • Act within 24 hours", alert.community)},
            }]
        })
    }
}

impl Notifier for DiscordWebhook {
    async fn send(&self, alert: &Alert) -> Result<(), CoreError> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&Self::payload(alert))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Discord webhook returned non-success");
            return Err(NotifyError::WebhookRejected {
                status_code: status.as_u16(),
            }
            .into());
        }

        info!(
            post_id = %alert.post_id,
            score = alert.result.score,
            "High score alert sent: {}",
            clip(&alert.title, 50)
        );
        Ok(())
    }
}

/// `1234567` → `"1,234,567"`.
fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}
