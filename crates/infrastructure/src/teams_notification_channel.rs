use async_trait::async_trait;
use remedy_application::{DispatchNotification, NotificationChannel, NotificationDelivery};
use remedy_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;

use crate::slack_notification_channel::{NOTIFICATION_TIMEOUT, default_notify_on};

const TEAMS_THEME_COLOR: &str = "0076D7";

/// Microsoft Teams incoming-webhook settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamsSettings {
    /// Whether the channel sends anything.
    #[serde(default)]
    pub enabled: bool,
    /// Incoming webhook URL.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Statuses that trigger a message.
    #[serde(default = "default_notify_on")]
    pub notify_on: Vec<String>,
}

impl Default for TeamsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            notify_on: default_notify_on(),
        }
    }
}

/// Notification channel posting message cards to a Teams webhook.
#[derive(Debug, Clone)]
pub struct TeamsNotificationChannel {
    http_client: reqwest::Client,
    settings: TeamsSettings,
}

impl TeamsNotificationChannel {
    /// Creates a Teams channel.
    #[must_use]
    pub fn new(http_client: reqwest::Client, settings: TeamsSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    fn message_text(notification: &DispatchNotification) -> String {
        let mut text = format!(
            "**Remediation Notification**\n**Action:** `{}`\n**Controller:** `{}`\n**User:** `{}`\n**Status:** `{}`",
            notification.action,
            notification.controller,
            notification.user,
            notification.status.as_str().to_uppercase()
        );
        if let Some(details) = &notification.details {
            text.push_str(&format!("\n**Details:** {details}"));
        }
        text
    }
}

#[async_trait]
impl NotificationChannel for TeamsNotificationChannel {
    fn channel_name(&self) -> &'static str {
        "teams"
    }

    async fn send(&self, notification: &DispatchNotification) -> AppResult<NotificationDelivery> {
        let Some(webhook_url) = self
            .settings
            .webhook_url
            .as_deref()
            .filter(|_| self.settings.enabled)
        else {
            return Ok(NotificationDelivery::Skipped);
        };
        if !self
            .settings
            .notify_on
            .iter()
            .any(|status| status == notification.status.as_str())
        {
            return Ok(NotificationDelivery::Skipped);
        }

        let payload = json!({
            "@type": "MessageCard",
            "@context": "https://schema.org/extensions",
            "themeColor": TEAMS_THEME_COLOR,
            "summary": format!("{} {}", notification.action, notification.status.as_str()),
            "sections": [{ "text": Self::message_text(notification) }],
        });

        let response = self
            .http_client
            .post(webhook_url)
            .timeout(NOTIFICATION_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("teams webhook transport error: {error}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "teams webhook responded with status {}",
                response.status()
            )));
        }

        Ok(NotificationDelivery::Delivered)
    }
}
