use super::error::AuthError;
use super::models::{ElevatedRoles, RoleName, User};
use super::password::hash_password;
use super::repository::UserRepository;
use std::sync::Arc;
use tracing::warn;

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    elevated: ElevatedRoles,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, elevated: ElevatedRoles) -> Self {
        Self {
            user_repo,
            elevated,
        }
    }

    /// Create a user on behalf of `requested_by`.
    ///
    /// Only an elevated requester may create an account with an elevated role.
    pub async fn create_user(
        &self,
        username: String,
        password: String,
        role: RoleName,
        requested_by: &User,
    ) -> Result<User, AuthError> {
        self.check_may_manage(&role, requested_by)?;
        self.seed_user(username, password, role).await
    }

    /// Create a user without a requester, for startup seeding
    pub async fn seed_user(
        &self,
        username: String,
        password: String,
        role: RoleName,
    ) -> Result<User, AuthError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AuthError::InvalidKey("username must not be empty".into()));
        }

        if self.user_repo.username_exists(&username).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&password)?;

        self.user_repo
            .create(User::new(username, password_hash, role))
            .await
    }

    /// Get a user by username
    pub async fn get_user(&self, username: &str) -> Result<User, AuthError> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        self.user_repo.list_all().await
    }

    /// Delete a user by username; nobody can delete their own account and
    /// only an elevated requester can delete an elevated account
    pub async fn delete_user(&self, username: &str, requested_by: &User) -> Result<(), AuthError> {
        let user = self.get_user(username).await?;

        if user.id == requested_by.id {
            return Err(AuthError::CannotDeleteSelf);
        }
        self.check_may_manage(&user.role, requested_by)?;

        self.user_repo.delete(&user.id).await
    }

    fn check_may_manage(&self, role: &RoleName, requested_by: &User) -> Result<(), AuthError> {
        if self.elevated.contains(role) && !self.elevated.contains(&requested_by.role) {
            warn!(
                user = %requested_by.username,
                role = %requested_by.role,
                target_role = %role,
                "elevated account management refused"
            );
            return Err(AuthError::PermissionDenied);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::sled_repository::SledUserRepository;
    use tempfile::TempDir;

    fn user_service(temp_dir: &TempDir) -> UserService {
        let user_repo =
            Arc::new(SledUserRepository::new(temp_dir.path().join("users.sled")).unwrap())
                as Arc<dyn UserRepository>;
        UserService::new(user_repo, ElevatedRoles::default())
    }

    #[tokio::test]
    async fn test_create_user() {
        let temp_dir = TempDir::new().unwrap();
        let user_service = user_service(&temp_dir);
        let admin = user_service
            .seed_user("root".to_string(), "rootpass1".to_string(), RoleName::admin())
            .await
            .unwrap();

        let user = user_service
            .create_user(
                " clerk ".to_string(),
                "clerk2024".to_string(),
                RoleName::staff(),
                &admin,
            )
            .await
            .unwrap();

        assert_eq!(user.username, "clerk");
        assert_eq!(user.role, RoleName::staff());
        assert_ne!(user.password_hash, "clerk2024");

        assert!(matches!(
            user_service
                .create_user(
                    "clerk".to_string(),
                    "clerk2024".to_string(),
                    RoleName::staff(),
                    &admin,
                )
                .await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_input() {
        let temp_dir = TempDir::new().unwrap();
        let user_service = user_service(&temp_dir);

        assert!(matches!(
            user_service
                .seed_user("  ".to_string(), "clerk2024".to_string(), RoleName::staff())
                .await,
            Err(AuthError::InvalidKey(_))
        ));
        assert!(matches!(
            user_service
                .seed_user("clerk".to_string(), "short".to_string(), RoleName::staff())
                .await,
            Err(AuthError::WeakPassword)
        ));
        assert!(user_service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_elevated_requesters_manage_elevated_accounts() {
        let temp_dir = TempDir::new().unwrap();
        let user_service = user_service(&temp_dir);
        let admin = user_service
            .seed_user("root".to_string(), "rootpass1".to_string(), RoleName::admin())
            .await
            .unwrap();
        let clerk = user_service
            .seed_user("clerk".to_string(), "clerk2024".to_string(), RoleName::staff())
            .await
            .unwrap();

        assert!(matches!(
            user_service
                .create_user(
                    "evil".to_string(),
                    "evil2024".to_string(),
                    RoleName::admin(),
                    &clerk,
                )
                .await,
            Err(AuthError::PermissionDenied)
        ));
        assert!(matches!(
            user_service.get_user("evil").await,
            Err(AuthError::UserNotFound)
        ));

        assert!(matches!(
            user_service.delete_user("root", &clerk).await,
            Err(AuthError::PermissionDenied)
        ));
        assert!(user_service.get_user("root").await.is_ok());

        // Non-elevated accounts stay manageable by non-elevated requesters
        user_service
            .create_user(
                "tech".to_string(),
                "tech2024".to_string(),
                RoleName::staff(),
                &clerk,
            )
            .await
            .unwrap();
        user_service.delete_user("tech", &clerk).await.unwrap();

        user_service
            .create_user(
                "root2".to_string(),
                "rootpass2".to_string(),
                RoleName::admin(),
                &admin,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_user() {
        let temp_dir = TempDir::new().unwrap();
        let user_service = user_service(&temp_dir);

        let admin = user_service
            .seed_user("root".to_string(), "rootpass1".to_string(), RoleName::admin())
            .await
            .unwrap();
        user_service
            .seed_user("clerk".to_string(), "clerk2024".to_string(), RoleName::staff())
            .await
            .unwrap();

        assert!(matches!(
            user_service.delete_user("root", &admin).await,
            Err(AuthError::CannotDeleteSelf)
        ));

        user_service.delete_user("clerk", &admin).await.unwrap();
        assert!(matches!(
            user_service.get_user("clerk").await,
            Err(AuthError::UserNotFound)
        ));
        assert_eq!(user_service.list_users().await.unwrap().len(), 1);
    }
}
