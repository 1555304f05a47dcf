use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use cineflix_models::{UserId, UserProfile};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::error::{CoreError, Result};
use crate::store::UserStore;
use crate::users::normalize_email;

const CREDENTIALS_ERROR: &str = "Could not validate credentials";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// HS256 secrets, newest first. The first key signs; every key verifies.
#[derive(Clone)]
pub struct KeyRing {
    keys: Vec<String>,
}

impl KeyRing {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        let keys: Vec<String> = keys.into_iter().filter(|key| !key.is_empty()).collect();
        if keys.is_empty() {
            return Err(CoreError::Internal("No token signing key configured".to_string()));
        }
        Ok(Self { keys })
    }

    pub fn current(&self) -> &str {
        &self.keys[0]
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Issues and checks bearer tokens for registered users
#[derive(Clone)]
pub struct Authenticator {
    keys: KeyRing,
    token_ttl: Duration,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(keys: KeyRing, token_ttl_minutes: i64, users: Arc<dyn UserStore>) -> Self {
        Self {
            keys,
            token_ttl: Duration::minutes(token_ttl_minutes),
            users,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken> {
        let user = match self.users.find_by_email(&normalize_email(email)).await? {
            Some(user) => user,
            None => {
                debug!("Login attempt for unknown email");
                return Err(CoreError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        let token = self.issue_token(&user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok(AccessToken::bearer(token))
    }

    pub fn issue_token(&self, user_id: &UserId) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.keys.current().as_bytes()),
        )
        .map_err(|e| CoreError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode against every retained key, newest first
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        for secret in self.keys.keys() {
            match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) => debug!("Token rejected by a key: {}", e),
            }
        }
        Err(CoreError::Unauthorized(CREDENTIALS_ERROR.to_string()))
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn authenticate(&self, token: &str) -> Result<UserProfile> {
        let claims = self.verify_token(token)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| CoreError::Unauthorized(CREDENTIALS_ERROR.to_string()))?;

        match self.users.get(&user_id).await? {
            Some(user) => Ok(user.profile()),
            None => Err(CoreError::NotFound("User not found".to_string())),
        }
    }
}
