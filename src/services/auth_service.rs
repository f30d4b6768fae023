use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{JwtError, JwtKeys, PasswordError, PasswordHashing};
use crate::config::SecurityConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, PublicUser, User};
use crate::database::store::UserStore;
use crate::types::UserId;

use super::validation::{normalize_email, validate_email, validate_password, ValidationError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("User exists")]
    Conflict,

    /// Unknown email and wrong password both end here
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Body of signup and login requests
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful signup/login result
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: PublicUser,
}

/// Credential creation and checking plus token issuance/verification
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
    hashing: PasswordHashing,
    /// Verified against when the email is unknown, so both failure paths cost the same
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, security: &SecurityConfig) -> Result<Self, AuthError> {
        let keys = JwtKeys::new(&security.jwt_secret, security.jwt_expiry_hours)?;
        let hashing = PasswordHashing::new(security.password_hash)?;
        let dummy_hash: Arc<str> = hashing.hash(&uuid::Uuid::new_v4().to_string())?.into();

        Ok(Self {
            users,
            keys,
            hashing,
            dummy_hash,
        })
    }

    /// Register a new user and sign them in
    pub async fn signup(&self, credentials: Credentials) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&credentials.email);
        validate_email(&email)?;
        validate_password(&credentials.password)?;

        if self.users.find_user_by_email(&email).await?.is_some() {
            debug!("Signup rejected: email already registered");
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hashing.hash_blocking(credentials.password).await?;

        // A concurrent signup for the same email can pass the lookup above;
        // the store's unique constraint settles it.
        let user = match self.users.insert_user(NewUser { email, password_hash }).await {
            Ok(user) => user,
            Err(DatabaseError::UniqueViolation(_)) => return Err(AuthError::Conflict),
            Err(e) => return Err(e.into()),
        };

        info!("Registered user {}", user.id);
        self.session_for(&user)
    }

    /// Check credentials and issue a token. Every failure after input validation
    /// is the same [`AuthError::InvalidCredentials`].
    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&credentials.email);
        if email.is_empty() {
            return Err(ValidationError::new("email", "This field is required").into());
        }
        validate_password(&credentials.password)?;

        let user = self.users.find_user_by_email(&email).await?;
        let stored = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let matches = self
            .hashing
            .verify_blocking(credentials.password, stored)
            .await?;

        match user {
            Some(user) if matches => {
                debug!("User {} logged in", user.id);
                self.session_for(&user)
            }
            _ => {
                debug!("Login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Resolve a bearer token to the user it was issued for
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        self.keys
            .validate(token)
            .map(|claims| claims.sub)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::Unauthorized("Invalid or expired token".to_string())
            })
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, AuthError> {
        Ok(AuthSession {
            token: self.keys.generate(user.id)?,
            user: PublicUser::from(user),
        })
    }
}
