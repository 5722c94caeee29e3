use std::collections::{BTreeMap, HashMap};

use remedy_core::AppError;
use remedy_domain::{Permission, PermissionEntry, RoleDefinition};

use super::AuthorizationService;

fn service() -> AuthorizationService {
    let api_keys = HashMap::from([
        ("admin-key".to_owned(), "admin".to_owned()),
        ("operator-key".to_owned(), "operator".to_owned()),
        ("readonly-key".to_owned(), "readonly".to_owned()),
        ("ghost-key".to_owned(), "ghost".to_owned()),
    ]);
    let roles = vec![
        RoleDefinition::new(
            "admin",
            vec![PermissionEntry::Granted("controller_override".to_owned())],
        )
        .unwrap_or_else(|_| unreachable!()),
        RoleDefinition::new(
            "operator",
            vec![PermissionEntry::Flags(BTreeMap::from([(
                "controller_override".to_owned(),
                false,
            )]))],
        )
        .unwrap_or_else(|_| unreachable!()),
        RoleDefinition::new("readonly", Vec::new()).unwrap_or_else(|_| unreachable!()),
    ];

    AuthorizationService::new(api_keys, roles).unwrap_or_else(|_| unreachable!())
}

#[test]
fn known_key_resolves_to_role() {
    let service = service();

    assert_eq!(service.role_for("admin-key"), Some("admin"));
    assert_eq!(service.role_for("nope"), None);

    let principal = service.authenticate(Some("operator-key"));
    assert!(matches!(
        principal,
        Ok(ref principal) if principal.role() == "operator" && principal.credential() == "operator-key"
    ));
}

#[test]
fn missing_or_unknown_key_is_unauthorized() {
    let service = service();

    assert!(matches!(
        service.authenticate(None),
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        service.authenticate(Some("")),
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        service.authenticate(Some("stolen-key")),
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn permission_grants_follow_role_table() {
    let service = service();

    assert!(service.has_permission("admin", Permission::ControllerOverride));
    assert!(!service.has_permission("operator", Permission::ControllerOverride));
    assert!(!service.has_permission("readonly", Permission::ControllerOverride));
    assert!(!service.permitted("admin", "delete_everything"));
}

#[test]
fn undefined_role_has_no_permissions() {
    let service = service();

    assert!(!service.has_permission("ghost", Permission::ControllerOverride));
    assert_eq!(service.undefined_roles(), vec!["ghost"]);
}

#[test]
fn duplicate_roles_are_rejected() {
    let roles = vec![
        RoleDefinition::new("admin", Vec::new()).unwrap_or_else(|_| unreachable!()),
        RoleDefinition::new("admin", Vec::new()).unwrap_or_else(|_| unreachable!()),
    ];

    assert!(AuthorizationService::new(HashMap::new(), roles).is_err());
}
