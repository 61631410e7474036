// Public API
pub mod auth_service;
pub mod defaults;
pub mod error;
pub mod models;
pub mod password;
pub mod perm_cache;
pub mod permission_service;
pub mod repository;
pub mod sled_repository;
pub mod user_service;

// Re-export commonly used types
pub use auth_service::AuthService;
pub use error::AuthError;
pub use models::{Action, ActionSet, ElevatedRoles, ModuleKey, PermissionRecord, RoleName, User};
pub use perm_cache::{DEFAULT_PERMISSION_TTL, MAX_PERMISSION_TTL, PermissionResolver};
pub use permission_service::PermissionService;
pub use repository::{PermissionRepository, UserRepository};
pub use sled_repository::{SledPermissionRepository, SledUserRepository};
pub use user_service::UserService;
