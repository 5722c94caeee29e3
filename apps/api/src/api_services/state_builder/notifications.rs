use std::sync::Arc;

use remedy_application::NotificationChannel;
use remedy_core::AppError;
use remedy_infrastructure::{
    NOTIFICATION_TIMEOUT, NotificationSettings, SlackNotificationChannel, TeamsNotificationChannel,
};

pub(super) fn build_notification_channels(
    settings: &NotificationSettings,
) -> Result<Vec<Arc<dyn NotificationChannel>>, AppError> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();
    if !settings.slack.enabled && !settings.teams.enabled {
        return Ok(channels);
    }

    let http_client = reqwest::Client::builder()
        .timeout(NOTIFICATION_TIMEOUT)
        .build()
        .map_err(|error| {
            AppError::Internal(format!("failed to build notification http client: {error}"))
        })?;

    if settings.slack.enabled {
        channels.push(Arc::new(SlackNotificationChannel::new(
            http_client.clone(),
            settings.slack.clone(),
        )));
    }
    if settings.teams.enabled {
        channels.push(Arc::new(TeamsNotificationChannel::new(
            http_client,
            settings.teams.clone(),
        )));
    }

    Ok(channels)
}
