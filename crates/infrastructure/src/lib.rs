//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod filesystem_action_discovery;
mod in_memory_approval_queue;
mod json_lines_audit_log;
mod process_action_executor;
mod slack_notification_channel;
mod teams_notification_channel;
mod yaml_config;

pub use filesystem_action_discovery::FilesystemActionDiscovery;
pub use in_memory_approval_queue::InMemoryApprovalQueue;
pub use json_lines_audit_log::JsonLinesAuditLog;
pub use process_action_executor::{
    ProcessActionExecutor, REMOTE_NOT_IMPLEMENTED, script_arguments,
};
pub use slack_notification_channel::{
    NOTIFICATION_TIMEOUT, SlackNotificationChannel, SlackSettings,
};
pub use teams_notification_channel::{TeamsNotificationChannel, TeamsSettings};
pub use yaml_config::{DispatcherConfig, NotificationSettings, load_config_dir};
