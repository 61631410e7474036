//! Time-bounded cache of the actions each role may perform on each module.
//!
//! The resolver sits on the authorization path of every request. A live entry
//! answers without touching the store; a missing or expired entry is re-read
//! from the [`PermissionRepository`] and kept for the configured TTL. Write
//! paths call [`PermissionResolver::invalidate`] so that an update is visible
//! to the next check instead of after the TTL.

use super::error::AuthError;
use super::models::{ActionSet, ModuleKey, RoleName};
use super::repository::PermissionRepository;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_PERMISSION_TTL: Duration = Duration::from_secs(30);

/// Longer TTLs are clamped to this.
pub const MAX_PERMISSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    role: RoleName,
    module_key: ModuleKey,
}

/// Snapshot of a record's actions; replaced as a whole, never edited in place.
#[derive(Debug, Clone)]
struct CacheEntry {
    actions: Arc<ActionSet>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct PermissionResolver {
    store: Arc<dyn PermissionRepository>,
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    // Bumped by every invalidation; lets a miss detect that it raced one.
    epoch: AtomicU64,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn PermissionRepository>, ttl: Duration) -> Self {
        if ttl > MAX_PERMISSION_TTL {
            warn!(
                "Permission cache TTL of {}s clamped to {}s",
                ttl.as_secs(),
                MAX_PERMISSION_TTL.as_secs()
            );
        }

        Self {
            store,
            entries: DashMap::new(),
            ttl: ttl.min(MAX_PERMISSION_TTL),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn with_default_ttl(store: Arc<dyn PermissionRepository>) -> Self {
        Self::new(store, DEFAULT_PERMISSION_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held, live or expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Actions `role` may perform on `module_key`.
    ///
    /// A pair without a permission record resolves to the empty set. Store
    /// failures are returned as errors and are never cached, so callers can
    /// tell an outage apart from a policy that grants nothing.
    pub async fn resolve(
        &self,
        role: &RoleName,
        module_key: &ModuleKey,
    ) -> Result<Arc<ActionSet>, AuthError> {
        let key = CacheKey {
            role: role.clone(),
            module_key: module_key.clone(),
        };
        let now = Instant::now();

        // The map guard must be released before the store read below.
        if let Some(actions) = self.live_actions(&key, now) {
            return Ok(actions);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);

        debug!(role = %role, module = %module_key, "permission cache miss");
        let record = self.store.find(role, module_key).await?;
        let actions = Arc::new(record.map(|r| r.actions).unwrap_or_default());

        // Unrepresentable expiry: answer without caching.
        let Some(expires_at) = now.checked_add(self.ttl) else {
            return Ok(actions);
        };

        self.entries.insert(
            key.clone(),
            CacheEntry {
                actions: Arc::clone(&actions),
                expires_at,
            },
        );

        // An invalidation that ran while the store was being read may have
        // missed the entry inserted above; drop it so it cannot outlive it.
        if self.epoch.load(Ordering::SeqCst) != epoch {
            self.entries.remove(&key);
        }

        Ok(actions)
    }

    /// Drop the entries of every role for `module_key`, or everything when `None`.
    pub fn invalidate(&self, module_key: Option<&ModuleKey>) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        match module_key {
            Some(module_key) => {
                self.entries.retain(|key, _| &key.module_key != module_key);
                debug!(module = %module_key, "permission cache invalidated");
            }
            None => {
                self.entries.clear();
                debug!("permission cache cleared");
            }
        }
    }

    fn live_actions(&self, key: &CacheKey, now: Instant) -> Option<Arc<ActionSet>> {
        let entry = self.entries.get(key)?;
        entry.is_live(now).then(|| Arc::clone(&entry.actions))
    }
}
