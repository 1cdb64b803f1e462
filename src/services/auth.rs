//! Authentication service: registration, login and token issue

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user. The first user in an empty store becomes admin;
    /// everyone after that is a plain user.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;
        let username = request.username.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        if self.repository.users.username_exists(&username).await? {
            return Err(AppError::Duplicate("Username already taken".to_string()));
        }

        let password_hash = self.hash_password(&password)?;
        let role = if self.repository.users.count().await? == 0 {
            Role::Admin
        } else {
            Role::User
        };

        let user = self
            .repository
            .users
            .create(&username, &password_hash, role)
            .await?;

        tracing::info!("Registered user {} with role {}", user.username, user.role);
        Ok(user)
    }

    /// Authenticate a user and issue a JWT token.
    /// Unknown username and wrong password both produce the same error.
    pub async fn login(&self, request: LoginRequest) -> AppResult<(String, User)> {
        request.validate()?;
        let username = request.username.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        let user = self
            .repository
            .users
            .get_by_username(&username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(&user, &password)? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a JWT token for a user
    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a password against the stored hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    fn service() -> AuthService {
        // Lazy pool: the hashing tests never touch the database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy("sqlite::memory:")
            .expect("lazy pool");
        AuthService::new(Repository::new(pool), AuthConfig::default())
    }

    fn user_with_hash(hash: String) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: hash,
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let service = service();
        let hash = service.hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");

        let user = user_with_hash(hash);
        assert!(service.verify_password(&user, "secret1").unwrap());
        assert!(!service.verify_password(&user, "wrong").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let service = service();
        let first = service.hash_password("secret1").unwrap();
        let second = service.hash_password("secret1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_hash_is_an_internal_error() {
        let service = service();
        let user = user_with_hash("not-a-phc-string".to_string());
        assert!(service.verify_password(&user, "secret1").is_err());
    }
}
