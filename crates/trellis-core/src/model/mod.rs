//! Plain data types shared by the store and the service.

pub mod task;
pub mod user;

pub use task::{NewTask, ParseEnumError, Task, TaskId, TaskStatus, UserId};
pub use user::{User, UserRole};
