// ============================================================================
// CMS Core - User Service
// File: crates/cms-core/src/services/user_service.rs
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use cms_security::{PasswordError, PasswordService};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{User, UserWithRoles};
use crate::error::DomainError;
use crate::repositories::{RoleRepository, UserRepository};

pub const CURRENT_PASSWORD_INCORRECT: &str = "Current password is incorrect";

fn hash_password(password: &str) -> Result<String, DomainError> {
    PasswordService::hash(password).map_err(|e| match e {
        PasswordError::TooShort(min) => {
            DomainError::validation("password", format!("The password must be at least {} characters.", min))
        }
        PasswordError::HashError(msg) => DomainError::InternalError(msg),
    })
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { users, roles }
    }

    pub async fn list(&self, search: Option<String>) -> Result<Vec<UserWithRoles>, DomainError> {
        let users = self.users.list(search).await?;
        let mut result = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.users.roles_of(&user.id).await?;
            result.push(UserWithRoles { user, roles });
        }
        Ok(result)
    }

    pub async fn get(&self, id: &Uuid) -> Result<UserWithRoles, DomainError> {
        let user = self.find(id).await?;
        let roles = self.users.roles_of(id).await?;
        Ok(UserWithRoles { user, roles })
    }

    /// Hashes `password` and stores a new active user; the email must be free.
    pub async fn register(&self, name: String, email: String, password: &str) -> Result<User, DomainError> {
        let user = User::new(name, email, hash_password(password)?)?;

        if self.users.find_by_email(&user.email).await?.is_some() {
            return Err(DomainError::duplicate("email"));
        }

        let created = self.users.create(&user).await?;
        info!("User created: {}", created.email);
        Ok(created)
    }

    /// Registers a user and grants `role_ids`. Roles are checked first so an
    /// unknown id leaves no account behind.
    pub async fn create(
        &self,
        name: String,
        email: String,
        password: &str,
        role_ids: Vec<Uuid>,
    ) -> Result<UserWithRoles, DomainError> {
        let ids = self.known_roles(role_ids).await?;
        let user = self.register(name, email, password).await?;
        if !ids.is_empty() {
            self.users.sync_roles(&user.id, &ids).await?;
        }
        self.get(&user.id).await
    }

    pub async fn change_password(&self, id: &Uuid, current: &str, new_password: &str) -> Result<(), DomainError> {
        let user = self.find(id).await?;

        let matches = PasswordService::verify(current, &user.password_hash)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        if !matches {
            warn!("Password change for {} rejected: wrong current password", user.email);
            return Err(DomainError::Rejected(CURRENT_PASSWORD_INCORRECT.to_string()));
        }

        self.users.update_password(id, &hash_password(new_password)?).await?;
        info!("Password changed for {}", user.email);
        Ok(())
    }

    /// Replaces the user's held roles with exactly `role_ids`.
    pub async fn sync_roles(&self, id: &Uuid, role_ids: Vec<Uuid>) -> Result<UserWithRoles, DomainError> {
        self.find(id).await?;
        let ids = self.known_roles(role_ids).await?;

        self.users.sync_roles(id, &ids).await?;
        info!("Roles synced for user {}: {} roles", id, ids.len());
        self.get(id).await
    }

    /// Deduplicated `role_ids`, all of which must exist.
    async fn known_roles(&self, role_ids: Vec<Uuid>) -> Result<Vec<Uuid>, DomainError> {
        let unique: BTreeSet<Uuid> = role_ids.into_iter().collect();
        let ids: Vec<Uuid> = unique.into_iter().collect();
        if ids.is_empty() {
            return Ok(ids);
        }
        let found = self.roles.find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            warn!("Unknown role ids in {:?}", ids);
            return Err(DomainError::validation("role_ids", "The selected role_ids is invalid."));
        }
        Ok(ids)
    }

    async fn find(&self, id: &Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))
    }
}
