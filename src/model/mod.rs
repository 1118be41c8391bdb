//! Core data model.
//!
//! Users own tasks; task lifecycle events produce notifications for the
//! owning user. All identifiers are random UUIDs wrapped in newtypes so a
//! task id can't be passed where a user id is expected.

// Defined before the submodules so they see it in textual scope.
/// Declare a UUID newtype id with the conversions every id needs.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::Error;

            fn from_str(s: &str) -> crate::error::Result<Self> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| crate::error::Error::Validation(format!("invalid id: {s}")))
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }
    };
}

pub mod event;
pub mod notification;
pub mod task;
pub mod user;

pub use event::{TaskEvent, TaskEventType};
pub use notification::{Notification, NotificationId};
pub use task::{NewTask, Task, TaskId};
pub use user::{NewUser, User, UserId};
