use itroom::auth::{
    AuthError, AuthService, ElevatedRoles, PermissionRepository, PermissionResolver,
    PermissionService, SledPermissionRepository, SledUserRepository, UserRepository, UserService,
};
use shared::config::Config;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub permission_service: Arc<PermissionService>,
    pub resolver: Arc<PermissionResolver>,
}

impl AppState {
    /// Wire the services around one shared resolver
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        permission_repo: Arc<dyn PermissionRepository>,
        permission_ttl: Duration,
        elevated: ElevatedRoles,
    ) -> Self {
        let resolver = Arc::new(PermissionResolver::new(permission_repo.clone(), permission_ttl));

        let auth_service = Arc::new(AuthService::new(
            user_repo.clone(),
            resolver.clone(),
            elevated.clone(),
        ));
        let user_service = Arc::new(UserService::new(user_repo, elevated.clone()));
        let permission_service = Arc::new(PermissionService::new(
            permission_repo,
            resolver.clone(),
            elevated,
        ));

        Self {
            auth_service,
            user_service,
            permission_service,
            resolver,
        }
    }

    /// Open the sled stores under `<data_dir>/.itroom` and build the state from config
    pub fn open(config: &Config) -> Result<Self, AuthError> {
        let base_path = Path::new(&config.data_dir).join(".itroom");
        std::fs::create_dir_all(&base_path)
            .map_err(|e| AuthError::StoreUnavailable(format!("Failed to create {:?}: {}", base_path, e)))?;

        let user_repo = Arc::new(SledUserRepository::new(base_path.join("users.sled"))?);
        let permission_repo =
            Arc::new(SledPermissionRepository::new(base_path.join("permissions.sled"))?);
        let elevated = ElevatedRoles::from_names(&config.elevated_roles)?;

        Ok(Self::new(
            user_repo,
            permission_repo,
            config.permission_cache_ttl,
            elevated,
        ))
    }
}
