use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::Path;

use remedy_core::{AppError, AppResult};
use remedy_domain::{
    ActionDefinition, ActionKind, ControllerDefinition, ControllerType, ParameterMap,
    PermissionEntry, RoleDefinition,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::slack_notification_channel::SlackSettings;
use crate::teams_notification_channel::TeamsSettings;

#[derive(Debug, Deserialize)]
struct ActionsFile {
    #[serde(default)]
    actions: BTreeMap<String, ActionEntry>,
}

#[derive(Debug, Deserialize)]
struct ActionEntry {
    #[serde(default)]
    playbook: Option<String>,
    #[serde(default)]
    script: Option<String>,
    default_controller: String,
    #[serde(default)]
    parameters: Option<ParameterMap>,
}

#[derive(Debug, Deserialize)]
struct ControllersFile {
    #[serde(default)]
    controllers: BTreeMap<String, ControllerEntry>,
}

#[derive(Debug, Deserialize)]
struct ControllerEntry {
    #[serde(rename = "type")]
    controller_type: ControllerType,
    #[serde(flatten)]
    settings: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AuthFile {
    #[serde(default)]
    api_keys: HashMap<String, String>,
    #[serde(default)]
    roles: BTreeMap<String, RoleEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct RoleEntry {
    #[serde(default)]
    permissions: Vec<PermissionEntry>,
}

/// Chat channel settings from `notifications.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotificationSettings {
    /// Slack settings.
    #[serde(default)]
    pub slack: SlackSettings,
    /// Teams settings.
    #[serde(default)]
    pub teams: TeamsSettings,
}

/// Static configuration loaded from the config directory.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Configured actions.
    pub actions: Vec<ActionDefinition>,
    /// Configured controllers.
    pub controllers: Vec<ControllerDefinition>,
    /// API key to role name table.
    pub api_keys: HashMap<String, String>,
    /// Role definitions.
    pub roles: Vec<RoleDefinition>,
    /// Notification channel settings.
    pub notifications: NotificationSettings,
}

/// Loads `actions.yaml`, `controllers.yaml`, `auth.yaml` and the optional
/// `notifications.yaml` from `config_dir`.
pub async fn load_config_dir(config_dir: &Path) -> AppResult<DispatcherConfig> {
    let actions_file: ActionsFile = read_yaml(&config_dir.join("actions.yaml")).await?;
    let controllers_file: ControllersFile =
        read_yaml(&config_dir.join("controllers.yaml")).await?;
    let auth_file: AuthFile = read_yaml(&config_dir.join("auth.yaml")).await?;
    let notifications = read_optional_yaml(&config_dir.join("notifications.yaml"))
        .await?
        .unwrap_or_default();

    Ok(DispatcherConfig {
        actions: actions_file
            .actions
            .into_iter()
            .map(|(name, entry)| action_from_entry(name, entry))
            .collect::<AppResult<_>>()?,
        controllers: controllers_file
            .controllers
            .into_iter()
            .map(|(name, entry)| {
                ControllerDefinition::new(name, entry.controller_type, Value::Object(entry.settings))
            })
            .collect::<AppResult<_>>()?,
        api_keys: auth_file.api_keys,
        roles: auth_file
            .roles
            .into_iter()
            .map(|(name, entry)| RoleDefinition::new(name, entry.permissions))
            .collect::<AppResult<_>>()?,
        notifications,
    })
}

fn action_from_entry(name: String, entry: ActionEntry) -> AppResult<ActionDefinition> {
    let kind = match (entry.playbook, entry.script) {
        (Some(reference), None) => ActionKind::Playbook { reference },
        (None, Some(reference)) => ActionKind::Script { reference },
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(format!(
                "action '{name}' must declare either a playbook or a script, not both"
            )));
        }
        (None, None) => {
            return Err(AppError::Validation(format!(
                "action '{name}' must declare a playbook or a script"
            )));
        }
    };

    ActionDefinition::new(
        name,
        kind,
        entry.default_controller,
        entry.parameters.unwrap_or_default(),
    )
}

async fn read_yaml<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    read_optional_yaml(path).await?.ok_or_else(|| {
        AppError::Validation(format!("config file '{}' does not exist", path.display()))
    })
}

async fn read_optional_yaml<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(AppError::Internal(format!(
                "failed to read config file '{}': {error}",
                path.display()
            )));
        }
    };

    serde_yaml::from_str(&contents).map(Some).map_err(|error| {
        AppError::Validation(format!("invalid config file '{}': {error}", path.display()))
    })
}
