use async_trait::async_trait;
use remedy_core::AppResult;
use remedy_domain::ExecutionResult;

/// Coarse outcome reported to chat channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    /// Execution succeeded.
    Success,
    /// Execution failed or did not complete.
    Failure,
}

impl NotificationStatus {
    /// Returns stable status value used by channel filters.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Message describing one finished dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchNotification {
    /// Action name.
    pub action: String,
    /// Controller that ran the action.
    pub controller: String,
    /// Actor credential.
    pub user: String,
    /// Coarse status.
    pub status: NotificationStatus,
    /// Stdout on success, error text otherwise.
    pub details: Option<String>,
}

impl DispatchNotification {
    /// Builds a notification from an execution outcome.
    #[must_use]
    pub fn from_result(action: &str, controller: &str, user: &str, result: &ExecutionResult) -> Self {
        let status = if result.success() {
            NotificationStatus::Success
        } else {
            NotificationStatus::Failure
        };

        Self {
            action: action.to_owned(),
            controller: controller.to_owned(),
            user: user.to_owned(),
            status,
            details: result.detail().map(str::to_owned),
        }
    }
}

/// Result of one channel delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDelivery {
    /// Channel accepted the message.
    Delivered,
    /// Channel is disabled or filters this status.
    Skipped,
}

/// Port for one configured chat-webhook channel.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Returns stable channel label for logs.
    fn channel_name(&self) -> &'static str;

    /// Sends one notification.
    async fn send(&self, notification: &DispatchNotification) -> AppResult<NotificationDelivery>;
}
