//! Service layer: the operations the API, CLI and scheduler call.

pub mod notification_service;
pub mod task_service;
pub mod user_service;

pub use notification_service::NotificationService;
pub use task_service::TaskService;
pub use user_service::UserService;
