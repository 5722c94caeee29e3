//! Application services and ports.

#![forbid(unsafe_code)]

mod action_registry;
mod authorization_service;
mod dispatch_ports;
mod dispatch_service;

pub use action_registry::{ActionRegistry, ArtifactKind, DiscoveredArtifact, RegistryBuild};
pub use authorization_service::AuthorizationService;
pub use dispatch_ports::{
    ActionExecutor, ApprovalQueue, AuditRecorder, DispatchNotification, NotificationChannel,
    NotificationDelivery, NotificationStatus,
};
pub use dispatch_service::{
    ApprovalResolution, DEFAULT_AUDIT_LIMIT, DEFAULT_EXECUTION_TIMEOUT, DispatchOutcome,
    DispatchService, ExecutionReport, REJECTED_BY_APPROVER,
};
