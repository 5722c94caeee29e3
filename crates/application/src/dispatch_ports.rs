mod approval_queue;
mod audit;
mod executor;
mod notification;

pub use approval_queue::ApprovalQueue;
pub use audit::AuditRecorder;
pub use executor::ActionExecutor;
pub use notification::{
    DispatchNotification, NotificationChannel, NotificationDelivery, NotificationStatus,
};
