//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod action;
mod approval;
mod audit;
mod controller;
mod execution;
mod security;

pub use action::{
    ActionDefinition, ActionKind, DISCOVERED_PLAYBOOK_CONTROLLER, DISCOVERED_SCRIPT_CONTROLLER,
    ParameterMap,
};
pub use approval::{ApprovalDecision, ApprovalEntry, ApprovalId, ApprovalStatus, ApprovalSummary};
pub use audit::{AuditFilter, AuditRecord};
pub use controller::{ControllerDefinition, ControllerType};
pub use execution::{
    ExecutionPlan, ExecutionRequest, ExecutionResult, ExecutionTarget, SENTINEL_EXIT_CODE,
};
pub use security::{Permission, PermissionEntry, RoleDefinition};
