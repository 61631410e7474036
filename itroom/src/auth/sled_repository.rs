use super::error::AuthError;
use super::models::{ModuleKey, PermissionRecord, RoleName, User};
use super::repository::{PermissionRepository, UserRepository};
use async_trait::async_trait;
use sled::Db;
use sled::Transactional;
use sled::transaction::abort;
use std::path::Path;

const USERS_TREE: &str = "users";
const USERS_BY_USERNAME_TREE: &str = "users_by_username";
const PERMISSIONS_TREE: &str = "permissions";

// ':' is outside the identifier grammar, so these keys cannot collide.
const KEY_SEPARATOR: char = ':';

#[derive(Clone)]
pub struct SledUserRepository {
    db: Db,
}

impl SledUserRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn users_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(USERS_TREE)?)
    }

    fn users_by_username_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(USERS_BY_USERNAME_TREE)?)
    }
}

#[async_trait]
impl UserRepository for SledUserRepository {
    async fn create(&self, user: User) -> Result<User, AuthError> {
        let users_tree = self.users_tree()?;
        let username_tree = self.users_by_username_tree()?;

        let user_json = serde_json::to_vec(&user)?;

        // Index check and both writes commit together or not at all
        (&users_tree, &username_tree).transaction(|(users, usernames)| {
            if usernames.get(user.username.as_bytes())?.is_some() {
                return abort(AuthError::UserAlreadyExists);
            }
            users.insert(user.id.as_bytes(), user_json.as_slice())?;
            usernames.insert(user.username.as_bytes(), user.id.as_bytes())?;
            Ok(())
        })?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let username_tree = self.users_by_username_tree()?;
        let users_tree = self.users_tree()?;

        if let Some(user_id) = username_tree.get(username.as_bytes())? {
            if let Some(user_data) = users_tree.get(&user_id)? {
                let user: User = serde_json::from_slice(&user_data)?;
                return Ok(Some(user));
            }
        }

        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<User>, AuthError> {
        let users_tree = self.users_tree()?;
        let mut users = Vec::new();

        for item in users_tree.iter() {
            let (_, user_data) = item?;
            let user: User = serde_json::from_slice(&user_data)?;
            users.push(user);
        }

        Ok(users)
    }

    async fn delete(&self, id: &str) -> Result<(), AuthError> {
        let users_tree = self.users_tree()?;
        let username_tree = self.users_by_username_tree()?;

        (&users_tree, &username_tree).transaction(|(users, usernames)| {
            let Some(user_data) = users.remove(id.as_bytes())? else {
                return abort(AuthError::UserNotFound);
            };
            let user: User = match serde_json::from_slice(&user_data) {
                Ok(user) => user,
                Err(e) => return abort(AuthError::from(e)),
            };
            usernames.remove(user.username.as_bytes())?;
            Ok(())
        })?;

        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let username_tree = self.users_by_username_tree()?;
        Ok(username_tree.contains_key(username.as_bytes())?)
    }
}

/// Sled-backed permission store keyed by `role:module_key`
#[derive(Clone)]
pub struct SledPermissionRepository {
    db: Db,
}

impl SledPermissionRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn permissions_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(PERMISSIONS_TREE)?)
    }

    fn record_key(role: &RoleName, module_key: &ModuleKey) -> String {
        format!("{}{}{}", role, KEY_SEPARATOR, module_key)
    }

    fn decode_all<I>(items: I) -> Result<Vec<PermissionRecord>, AuthError>
    where
        I: Iterator<Item = sled::Result<(sled::IVec, sled::IVec)>>,
    {
        let mut records = Vec::new();
        for item in items {
            let (_, data) = item?;
            records.push(serde_json::from_slice(&data)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl PermissionRepository for SledPermissionRepository {
    async fn find(
        &self,
        role: &RoleName,
        module_key: &ModuleKey,
    ) -> Result<Option<PermissionRecord>, AuthError> {
        let tree = self.permissions_tree()?;

        match tree.get(Self::record_key(role, module_key).as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: PermissionRecord) -> Result<PermissionRecord, AuthError> {
        let tree = self.permissions_tree()?;
        let key = Self::record_key(&record.role, &record.module_key);

        tree.insert(key.as_bytes(), serde_json::to_vec(&record)?)?;
        tree.flush_async().await?;

        Ok(record)
    }

    async fn delete(&self, role: &RoleName, module_key: &ModuleKey) -> Result<bool, AuthError> {
        let tree = self.permissions_tree()?;

        let removed = tree
            .remove(Self::record_key(role, module_key).as_bytes())?
            .is_some();
        tree.flush_async().await?;

        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<PermissionRecord>, AuthError> {
        let tree = self.permissions_tree()?;
        Self::decode_all(tree.iter())
    }

    async fn list_by_role(&self, role: &RoleName) -> Result<Vec<PermissionRecord>, AuthError> {
        let tree = self.permissions_tree()?;
        let prefix = format!("{}{}", role, KEY_SEPARATOR);
        Self::decode_all(tree.scan_prefix(prefix.as_bytes()))
    }
}
