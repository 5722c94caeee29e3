use std::collections::HashMap;
use std::sync::Arc;

use remedy_core::{AppError, AppResult, Principal};
use remedy_domain::{Permission, RoleDefinition};

#[derive(Debug, Default)]
struct AccessPolicy {
    api_keys: HashMap<String, String>,
    roles: HashMap<String, RoleDefinition>,
}

/// Application service resolving API keys to roles and role permissions.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationService {
    policy: Arc<AccessPolicy>,
}

impl AuthorizationService {
    /// Creates an authorization service from the key table and role table.
    pub fn new(api_keys: HashMap<String, String>, roles: Vec<RoleDefinition>) -> AppResult<Self> {
        let mut role_map = HashMap::new();
        for role in roles {
            let name = role.name().to_owned();
            if role_map.insert(name.clone(), role).is_some() {
                return Err(AppError::Validation(format!(
                    "role '{name}' is defined more than once"
                )));
            }
        }

        if api_keys.keys().any(|key| key.trim().is_empty()) {
            return Err(AppError::Validation(
                "api keys must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            policy: Arc::new(AccessPolicy {
                api_keys,
                roles: role_map,
            }),
        })
    }

    /// Returns the role bound to a credential.
    #[must_use]
    pub fn role_for(&self, credential: &str) -> Option<&str> {
        self.policy.api_keys.get(credential).map(String::as_str)
    }

    /// Resolves a presented credential into an authenticated principal.
    pub fn authenticate(&self, credential: Option<&str>) -> AppResult<Principal> {
        let credential = credential
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing API key".to_owned()))?;

        let role = self
            .role_for(credential)
            .ok_or_else(|| AppError::Unauthorized("invalid API key".to_owned()))?;

        Ok(Principal::new(credential, role))
    }

    /// Returns whether a role grants a permission given by its configured name.
    ///
    /// Unknown roles and unknown permission names are never granted.
    #[must_use]
    pub fn permitted(&self, role: &str, permission_name: &str) -> bool {
        self.policy
            .roles
            .get(role)
            .is_some_and(|definition| definition.grants(permission_name))
    }

    /// Returns whether a role grants a typed permission.
    #[must_use]
    pub fn has_permission(&self, role: &str, permission: Permission) -> bool {
        self.permitted(role, permission.as_str())
    }

    /// Returns role names bound to credentials that have no role definition.
    #[must_use]
    pub fn undefined_roles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .policy
            .api_keys
            .values()
            .map(String::as_str)
            .filter(|role| !self.policy.roles.contains_key(*role))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests;
