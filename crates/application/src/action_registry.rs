use std::collections::HashMap;

use remedy_core::{AppError, AppResult};
use remedy_domain::{
    ActionDefinition, ActionKind, ControllerDefinition, DISCOVERED_PLAYBOOK_CONTROLLER,
    DISCOVERED_SCRIPT_CONTROLLER, ParameterMap,
};

/// Kind of artifact found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Playbook file under the playbooks directory.
    Playbook,
    /// Executable script under the scripts directory.
    Script,
}

/// One artifact reported by filesystem discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredArtifact {
    /// Action name derived from the file stem.
    pub name: String,
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Path relative to the service root, e.g. `playbooks/restart.yml`.
    pub reference: String,
}

impl DiscoveredArtifact {
    fn into_action(self) -> AppResult<ActionDefinition> {
        let (kind, default_controller) = match self.kind {
            ArtifactKind::Playbook => (
                ActionKind::Playbook {
                    reference: self.reference,
                },
                DISCOVERED_PLAYBOOK_CONTROLLER,
            ),
            ArtifactKind::Script => (
                ActionKind::Script {
                    reference: self.reference,
                },
                DISCOVERED_SCRIPT_CONTROLLER,
            ),
        };

        ActionDefinition::new(self.name, kind, default_controller, ParameterMap::new())
    }
}

/// Registry together with the non-fatal findings produced while merging.
#[derive(Debug)]
pub struct RegistryBuild {
    /// Merged registry.
    pub registry: ActionRegistry,
    /// Warnings to log at startup.
    pub warnings: Vec<String>,
}

/// Immutable catalog of actions and controllers.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionDefinition>,
    controllers: HashMap<String, ControllerDefinition>,
}

impl ActionRegistry {
    /// Merges discovered artifacts with configured actions and controllers.
    ///
    /// Discovered artifacts are applied in a fixed order (playbooks before
    /// scripts, then by reference) so a script replaces a playbook sharing its
    /// stem. Configured actions always win over discovered ones.
    pub fn build(
        discovered: Vec<DiscoveredArtifact>,
        configured_actions: Vec<ActionDefinition>,
        controllers: Vec<ControllerDefinition>,
    ) -> AppResult<RegistryBuild> {
        let mut warnings = Vec::new();

        let mut controller_map = HashMap::new();
        for controller in controllers {
            let name = controller.name().to_owned();
            if controller_map.insert(name.clone(), controller).is_some() {
                return Err(AppError::Validation(format!(
                    "controller '{name}' is defined more than once"
                )));
            }
        }

        let mut configured = HashMap::new();
        for action in configured_actions {
            let name = action.name().to_owned();
            if configured.insert(name.clone(), action).is_some() {
                return Err(AppError::Validation(format!(
                    "action '{name}' is defined more than once"
                )));
            }
        }

        let mut discovered = discovered;
        discovered.sort_by(|left, right| {
            left.kind
                .cmp(&right.kind)
                .then_with(|| left.reference.cmp(&right.reference))
        });

        let mut actions: HashMap<String, ActionDefinition> = HashMap::new();
        for artifact in discovered {
            if configured.contains_key(&artifact.name) {
                continue;
            }

            let reference = artifact.reference.clone();
            let action = artifact.into_action()?;
            if let Some(previous) = actions.get(action.name()) {
                warnings.push(format!(
                    "discovered action '{}' from '{}' replaces '{}'",
                    action.name(),
                    reference,
                    previous.kind().reference()
                ));
            }
            actions.insert(action.name().to_owned(), action);
        }
        actions.extend(configured);

        let mut unresolved: Vec<&ActionDefinition> = actions
            .values()
            .filter(|action| !controller_map.contains_key(action.default_controller()))
            .collect();
        unresolved.sort_by(|left, right| left.name().cmp(right.name()));
        for action in unresolved {
            warnings.push(format!(
                "action '{}' defaults to unknown controller '{}'",
                action.name(),
                action.default_controller()
            ));
        }

        Ok(RegistryBuild {
            registry: Self {
                actions,
                controllers: controller_map,
            },
            warnings,
        })
    }

    /// Finds an action by name.
    #[must_use]
    pub fn resolve_action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    /// Finds a controller by name.
    #[must_use]
    pub fn resolve_controller(&self, name: &str) -> Option<&ControllerDefinition> {
        self.controllers.get(name)
    }

    /// Returns action names in lexical order.
    #[must_use]
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns controller names in lexical order.
    #[must_use]
    pub fn controller_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns whether no action is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
