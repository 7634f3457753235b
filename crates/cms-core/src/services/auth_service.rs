// ============================================================================
// CMS Core - Authentication Service
// File: crates/cms-core/src/services/auth_service.rs
// ============================================================================
//! Email/password login issuing bearer tokens, and token-to-principal
//! resolution for every authenticated request.

use std::sync::Arc;

use cms_security::{JwtError, JwtService, PasswordService};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{Guard, Principal, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;

pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Result of successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: User,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
    guard: Guard,
}

impl AuthService {
    /// `guard` is the guard tokens are issued for and principals resolved under.
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtService, guard: Guard) -> Self {
        Self { users, jwt, guard }
    }

    pub fn guard(&self) -> Guard {
        self.guard
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let email = email.trim().to_lowercase();
        info!("Login attempt for email: {}", email);

        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed: email not found: {}", email);
            DomainError::Unauthorized(INVALID_CREDENTIALS.into())
        })?;

        if !user.is_active {
            warn!("Login failed: user {} is inactive", user.id);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let password_valid = PasswordService::verify(password, &user.password_hash).map_err(|e| {
            error!("Stored password hash for {} is unreadable: {}", user.id, e);
            DomainError::Unauthorized(INVALID_CREDENTIALS.into())
        })?;
        if !password_valid {
            warn!("Login failed: invalid password for: {}", email);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = self
            .jwt
            .generate_access_token(&user.id, self.guard.as_str())
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        let principal = self.principal_for(user.clone(), self.guard).await?;
        info!("Login successful for: {}", email);

        Ok(LoginResult {
            user,
            roles: principal.roles.into_iter().collect(),
            permissions: principal.permissions.into_iter().collect(),
            token,
            token_type: "Bearer",
            expires_in: self.jwt.access_token_expiry(),
        })
    }

    /// Validates a bearer token and resolves its subject.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let claims = self.jwt.validate_token(token).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            match e {
                JwtError::TokenExpired => DomainError::Unauthorized("Token expired.".into()),
                _ => DomainError::Unauthorized("Unauthenticated.".into()),
            }
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Unauthorized("Unauthenticated.".into()))?;
        let guard = Guard::from_str(&claims.guard)
            .ok_or_else(|| DomainError::Unauthorized("Unauthenticated.".into()))?;

        self.resolve_principal(&user_id, guard).await
    }

    /// Held roles and effective permissions of an active user under `guard`.
    pub async fn resolve_principal(&self, user_id: &Uuid, guard: Guard) -> Result<Principal, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                warn!("Token subject {} is missing or inactive", user_id);
                DomainError::Unauthorized("Unauthenticated.".into())
            })?;
        self.principal_for(user, guard).await
    }

    async fn principal_for(&self, user: User, guard: Guard) -> Result<Principal, DomainError> {
        let roles = self.users.role_names(&user.id, guard).await?;
        let permissions = self.users.permission_names(&user.id, guard).await?;
        Ok(Principal {
            user_id: user.id,
            name: user.name,
            email: user.email,
            guard,
            roles: roles.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockUserRepository;

    fn user(password: &str) -> User {
        let hash = PasswordService::hash(password).unwrap();
        User::new("Admin".into(), "admin@example.com".into(), hash).unwrap()
    }

    fn service(users: MockUserRepository) -> AuthService {
        AuthService::new(Arc::new(users), JwtService::new("test-secret".into(), 3600), Guard::Api)
    }

    fn with_grants(repo: &mut MockUserRepository) {
        repo.expect_role_names()
            .withf(|_, guard| *guard == Guard::Api)
            .returning(|_, _| Ok(vec!["admin".into()]));
        repo.expect_permission_names()
            .returning(|_, _| Ok(vec!["manage-users".into(), "manage-roles".into()]));
    }

    #[tokio::test]
    async fn test_login_then_authenticate() {
        let account = user("password123");
        let by_email = account.clone();
        let by_id = account.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email == "admin@example.com")
            .returning(move |_| Ok(Some(by_email.clone())));
        repo.expect_find_by_id().returning(move |_| Ok(Some(by_id.clone())));
        with_grants(&mut repo);

        let auth = service(repo);
        let result = auth.login(" Admin@Example.com", "password123").await.unwrap();
        assert_eq!(result.roles, vec!["admin".to_string()]);
        assert_eq!(result.permissions, vec!["manage-roles".to_string(), "manage-users".to_string()]);
        assert_eq!(result.expires_in, 3600);

        let principal = auth.authenticate(&result.token).await.unwrap();
        assert_eq!(principal.user_id, account.id);
        assert_eq!(principal.guard, Guard::Api);
        assert!(principal.has_permission("manage-users"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let account = user("password123");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(move |_| Ok(Some(account.clone())));

        let err = service(repo).login("admin@example.com", "nope-nope").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(ref m) if m == INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_user_is_unauthorized() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        assert!(matches!(
            service(repo).login("ghost@example.com", "password123").await,
            Err(DomainError::Unauthorized(_))
        ));

        let mut inactive = user("password123");
        inactive.is_active = false;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(move |_| Ok(Some(inactive.clone())));
        assert!(matches!(
            service(repo).login("admin@example.com", "password123").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let err = service(MockUserRepository::new()).authenticate("not.a.token").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_unauthorized() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let auth = service(repo);
        let token = JwtService::new("test-secret".into(), 3600)
            .generate_access_token(&Uuid::new_v4(), "api")
            .unwrap();
        assert!(matches!(auth.authenticate(&token).await, Err(DomainError::Unauthorized(_))));
    }
}
