use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::{
    credentials::HasherState,
    error::{AppError, Result},
    models::{Role, User},
};

/// IdentityStore
///
/// Owns `User` and `Role` records and guarantees username and role-name uniqueness under
/// concurrent callers. Implementations must make each check-then-insert atomic per key.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Returns the role called `name`, creating exactly one record if none exists yet.
    async fn find_or_create_role(&self, name: &str) -> Arc<Role>;

    /// Registers `username` with the digest of `secret` and the single role `role_name`.
    /// Fails with `DuplicateUsername` if the name is taken at commit time.
    async fn register(&self, username: &str, secret: &str, role_name: &str) -> Result<User>;

    async fn find_by_username(&self, username: &str) -> Option<User>;

    /// Every role currently in the registry, ordered by id.
    async fn roles(&self) -> Vec<Arc<Role>>;
}

/// IdentityState
///
/// The shared handle to the identity store held in the application state.
pub type IdentityState = Arc<dyn IdentityStore>;

/// InMemoryIdentityStore
///
/// Username and role-name indexes are `DashMap`s: the entry API holds the shard lock for
/// the key across the existence check and the insert, which serializes same-name callers
/// without blocking unrelated names.
pub struct InMemoryIdentityStore {
    users: DashMap<String, User>,
    roles: DashMap<String, Arc<Role>>,
    last_user_id: AtomicI64,
    last_role_id: AtomicI64,
    hasher: HasherState,
}

impl InMemoryIdentityStore {
    pub fn new(hasher: HasherState) -> Self {
        Self {
            users: DashMap::new(),
            roles: DashMap::new(),
            last_user_id: AtomicI64::new(0),
            last_role_id: AtomicI64::new(0),
            hasher,
        }
    }

    fn resolve_role(&self, name: &str) -> Arc<Role> {
        if let Some(role) = self.roles.get(name) {
            return Arc::clone(&role);
        }

        let role = self.roles.entry(name.to_string()).or_insert_with(|| {
            let id = self.last_role_id.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(role_id = id, role = %name, "role created");
            Arc::new(Role {
                id,
                name: name.to_string(),
            })
        });
        Arc::clone(&role)
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_or_create_role(&self, name: &str) -> Arc<Role> {
        self.resolve_role(name)
    }

    async fn register(&self, username: &str, secret: &str, role_name: &str) -> Result<User> {
        // Cheap rejection before paying for the hash. The entry below is authoritative.
        if self.users.contains_key(username) {
            tracing::warn!(username = %username, "registration rejected: username taken");
            return Err(AppError::DuplicateUsername(username.to_string()));
        }

        let credential_digest = self.hasher.hash(secret)?;

        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => {
                tracing::warn!(username = %username, "registration rejected: username taken");
                Err(AppError::DuplicateUsername(username.to_string()))
            }
            Entry::Vacant(slot) => {
                let role = self.resolve_role(role_name);
                let user = User {
                    id: self.last_user_id.fetch_add(1, Ordering::SeqCst) + 1,
                    username: username.to_string(),
                    credential_digest,
                    roles: vec![role],
                };
                slot.insert(user.clone());

                tracing::info!(user_id = user.id, username = %username, role = %role_name, "user registered");
                Ok(user)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Option<User> {
        let found = self.users.get(username).map(|user| user.clone());
        tracing::debug!(username = %username, found = found.is_some(), "user lookup");
        found
    }

    async fn roles(&self) -> Vec<Arc<Role>> {
        let mut roles: Vec<Arc<Role>> = self.roles.iter().map(|entry| Arc::clone(entry.value())).collect();
        roles.sort_by_key(|role| role.id);
        roles
    }
}
