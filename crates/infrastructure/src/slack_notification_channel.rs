use std::time::Duration;

use async_trait::async_trait;
use remedy_application::{
    DispatchNotification, NotificationChannel, NotificationDelivery, NotificationStatus,
};
use remedy_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;

/// Request timeout applied to chat webhooks.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

const SLACK_COLOR: &str = "#439FE0";

pub(crate) fn default_notify_on() -> Vec<String> {
    vec![
        NotificationStatus::Success.as_str().to_owned(),
        NotificationStatus::Failure.as_str().to_owned(),
    ]
}

fn default_username() -> String {
    "RemedyBot".to_owned()
}

/// Slack incoming-webhook settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlackSettings {
    /// Whether the channel sends anything.
    #[serde(default)]
    pub enabled: bool,
    /// Incoming webhook URL.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Target channel override.
    #[serde(default)]
    pub channel: Option<String>,
    /// Display name of the bot.
    #[serde(default = "default_username")]
    pub username: String,
    /// Statuses that trigger a message.
    #[serde(default = "default_notify_on")]
    pub notify_on: Vec<String>,
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            channel: None,
            username: default_username(),
            notify_on: default_notify_on(),
        }
    }
}

/// Notification channel posting attachments to a Slack webhook.
#[derive(Debug, Clone)]
pub struct SlackNotificationChannel {
    http_client: reqwest::Client,
    settings: SlackSettings,
}

impl SlackNotificationChannel {
    /// Creates a Slack channel.
    #[must_use]
    pub fn new(http_client: reqwest::Client, settings: SlackSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    fn message_text(notification: &DispatchNotification) -> String {
        let mut text = format!(
            "*Remediation Notification*\n*Action:* `{}`\n*Controller:* `{}`\n*User:* `{}`\n*Status:* `{}`",
            notification.action,
            notification.controller,
            notification.user,
            notification.status.as_str().to_uppercase()
        );
        if let Some(details) = &notification.details {
            text.push_str(&format!("\n*Details:* {details}"));
        }
        text
    }
}

#[async_trait]
impl NotificationChannel for SlackNotificationChannel {
    fn channel_name(&self) -> &'static str {
        "slack"
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
            "channel": self.settings.channel,
            "username": self.settings.username,
            "attachments": [{
                "color": SLACK_COLOR,
                "text": Self::message_text(notification),
                "mrkdwn_in": ["text"],
            }],
        });

        let response = self
            .http_client
            .post(webhook_url)
            .timeout(NOTIFICATION_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("slack webhook transport error: {error}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "slack webhook responded with status {}",
                response.status()
            )));
        }

        Ok(NotificationDelivery::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use remedy_application::{
        DispatchNotification, NotificationChannel, NotificationDelivery, NotificationStatus,
    };
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{SlackNotificationChannel, SlackSettings};

    fn notification(status: NotificationStatus) -> DispatchNotification {
        DispatchNotification {
            action: "restart_service".to_owned(),
            controller: "ansible_local".to_owned(),
            user: "admin-key".to_owned(),
            status,
            details: Some("service restarted".to_owned()),
        }
    }

    fn settings(url: String) -> SlackSettings {
        SlackSettings {
            enabled: true,
            webhook_url: Some(url),
            channel: Some("#ops".to_owned()),
            ..SlackSettings::default()
        }
    }

    #[tokio::test]
    async fn posts_attachment_to_webhook() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/slack"))
            .and(body_partial_json(json!({
                "channel": "#ops",
                "username": "RemedyBot",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let channel = SlackNotificationChannel::new(
            reqwest::Client::new(),
            settings(format!("{}/hooks/slack", mock_server.uri())),
        );

        let delivery = channel.send(&notification(NotificationStatus::Success)).await;

        assert!(matches!(delivery, Ok(NotificationDelivery::Delivered)));
        let requests = mock_server
            .received_requests()
            .await
            .unwrap_or_default();
        let body: serde_json::Value =
            serde_json::from_slice(&requests[0].body).unwrap_or_else(|_| unreachable!());
        let text = body["attachments"][0]["text"].as_str().unwrap_or_default();
        assert!(text.contains("*Status:* `SUCCESS`"));
        assert!(text.contains("*Details:* service restarted"));
    }

    #[tokio::test]
    async fn filtered_status_is_skipped_without_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let channel = SlackNotificationChannel::new(
            reqwest::Client::new(),
            SlackSettings {
                notify_on: vec!["failure".to_owned()],
                ..settings(mock_server.uri())
            },
        );

        let delivery = channel.send(&notification(NotificationStatus::Success)).await;

        assert!(matches!(delivery, Ok(NotificationDelivery::Skipped)));
    }

    #[tokio::test]
    async fn disabled_channel_is_skipped() {
        let channel = SlackNotificationChannel::new(
            reqwest::Client::new(),
            SlackSettings {
                enabled: false,
                webhook_url: Some("http://127.0.0.1:9/unused".to_owned()),
                ..SlackSettings::default()
            },
        );

        let delivery = channel.send(&notification(NotificationStatus::Failure)).await;

        assert!(matches!(delivery, Ok(NotificationDelivery::Skipped)));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let channel =
            SlackNotificationChannel::new(reqwest::Client::new(), settings(mock_server.uri()));

        let delivery = channel.send(&notification(NotificationStatus::Failure)).await;

        assert!(delivery.is_err());
    }
}
