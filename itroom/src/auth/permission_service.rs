use super::defaults::default_permission_records;
use super::error::AuthError;
use super::models::{ActionSet, ElevatedRoles, ModuleKey, PermissionRecord, RoleName};
use super::perm_cache::PermissionResolver;
use super::repository::PermissionRepository;
use std::sync::Arc;
use tracing::info;

/// Write path for permission records.
///
/// Every mutation invalidates the resolver before returning, so a caller that
/// has been acknowledged never races a stale cached answer.
pub struct PermissionService {
    permission_repo: Arc<dyn PermissionRepository>,
    resolver: Arc<PermissionResolver>,
    elevated: ElevatedRoles,
}

impl PermissionService {
    pub fn new(
        permission_repo: Arc<dyn PermissionRepository>,
        resolver: Arc<PermissionResolver>,
        elevated: ElevatedRoles,
    ) -> Self {
        Self {
            permission_repo,
            resolver,
            elevated,
        }
    }

    /// Replace the actions a role may perform on a module
    pub async fn set_actions(
        &self,
        role: RoleName,
        module_key: ModuleKey,
        actions: ActionSet,
    ) -> Result<PermissionRecord, AuthError> {
        // Elevated roles bypass the records entirely
        if self.elevated.contains(&role) {
            return Err(AuthError::ElevatedRolePermissions);
        }

        let record = self
            .permission_repo
            .upsert(PermissionRecord::new(role, module_key, actions))
            .await?;
        self.resolver.invalidate(Some(&record.module_key));

        info!(
            role = %record.role,
            module = %record.module_key,
            actions = ?record.actions,
            "permission record updated"
        );

        Ok(record)
    }

    /// Remove the record of a pair, leaving the role with no actions on the module
    pub async fn remove(&self, role: &RoleName, module_key: &ModuleKey) -> Result<(), AuthError> {
        let removed = self.permission_repo.delete(role, module_key).await?;
        self.resolver.invalidate(Some(module_key));

        if !removed {
            return Err(AuthError::PermissionRecordNotFound);
        }

        info!(role = %role, module = %module_key, "permission record removed");
        Ok(())
    }

    /// Get the record of a pair
    pub async fn get(
        &self,
        role: &RoleName,
        module_key: &ModuleKey,
    ) -> Result<PermissionRecord, AuthError> {
        self.permission_repo
            .find(role, module_key)
            .await?
            .ok_or(AuthError::PermissionRecordNotFound)
    }

    /// List all records
    pub async fn list_records(&self) -> Result<Vec<PermissionRecord>, AuthError> {
        self.permission_repo.list_all().await
    }

    /// List the records of a role
    pub async fn list_for_role(&self, role: &RoleName) -> Result<Vec<PermissionRecord>, AuthError> {
        self.permission_repo.list_by_role(role).await
    }

    /// Drop every cached answer, e.g. after records were changed outside this service
    pub fn reload(&self) {
        self.resolver.invalidate(None);
        info!("permission cache reloaded");
    }

    /// Seed the default records for pairs that have none
    pub async fn initialize_default_permissions(
        &self,
    ) -> Result<Vec<PermissionRecord>, AuthError> {
        let mut created = Vec::new();

        for record in default_permission_records() {
            if self.elevated.contains(&record.role) {
                continue;
            }
            if self
                .permission_repo
                .find(&record.role, &record.module_key)
                .await?
                .is_none()
            {
                created.push(self.permission_repo.upsert(record).await?);
            }
        }

        if !created.is_empty() {
            self.resolver.invalidate(None);
        }

        Ok(created)
    }
}
