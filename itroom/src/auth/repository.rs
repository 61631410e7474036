use super::error::AuthError;
use super::models::{ModuleKey, PermissionRecord, RoleName, User};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// List all users
    async fn list_all(&self) -> Result<Vec<User>, AuthError>;

    /// Delete a user by ID
    async fn delete(&self, id: &str) -> Result<(), AuthError>;

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, AuthError>;
}

/// Backing store of permission records, at most one per (role, module key).
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Find the record for a (role, module key) pair
    async fn find(
        &self,
        role: &RoleName,
        module_key: &ModuleKey,
    ) -> Result<Option<PermissionRecord>, AuthError>;

    /// Insert or replace the record for its (role, module key) pair
    async fn upsert(&self, record: PermissionRecord) -> Result<PermissionRecord, AuthError>;

    /// Delete the record for a pair, returning whether one existed
    async fn delete(&self, role: &RoleName, module_key: &ModuleKey) -> Result<bool, AuthError>;

    /// List every record
    async fn list_all(&self) -> Result<Vec<PermissionRecord>, AuthError>;

    /// List the records of one role
    async fn list_by_role(&self, role: &RoleName) -> Result<Vec<PermissionRecord>, AuthError>;
}
