pub mod authentication;
pub mod authorization;

pub use authentication::auth_middleware;
pub use authorization::{permission_layer, require_elevated};
