use super::error::AuthError;
use super::models::{Action, ActionSet, ElevatedRoles, ModuleKey, User};
use super::password::verify_password;
use super::perm_cache::PermissionResolver;
use super::repository::UserRepository;
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    resolver: Arc<PermissionResolver>,
    elevated: ElevatedRoles,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        resolver: Arc<PermissionResolver>,
        elevated: ElevatedRoles,
    ) -> Self {
        Self {
            user_repo,
            resolver,
            elevated,
        }
    }

    /// Authenticate a user by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Whether the user's role bypasses permission records
    pub fn is_elevated(&self, user: &User) -> bool {
        self.elevated.contains(&user.role)
    }

    /// Check that the user may perform `action` on `module_key`.
    ///
    /// Elevated roles are allowed without touching the cache or the store.
    /// A store failure is returned as-is, never as `PermissionDenied`.
    pub async fn authorize(
        &self,
        user: &User,
        module_key: &ModuleKey,
        action: &Action,
    ) -> Result<(), AuthError> {
        if self.is_elevated(user) {
            return Ok(());
        }

        let actions = self.resolver.resolve(&user.role, module_key).await?;

        if actions.contains(action) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied)
        }
    }

    /// Actions shown to clients for a module.
    ///
    /// For an elevated role this is the standard read/create/update/delete list
    /// only; `authorize` allows such a role every action, custom ones included.
    pub async fn effective_actions(
        &self,
        user: &User,
        module_key: &ModuleKey,
    ) -> Result<Arc<ActionSet>, AuthError> {
        if self.is_elevated(user) {
            return Ok(Arc::new(Action::standard()));
        }

        self.resolver.resolve(&user.role, module_key).await
    }
}
