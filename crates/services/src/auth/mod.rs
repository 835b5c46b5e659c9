use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use argon2::password_hash::rand_core::OsRng;
use bson::{oid::ObjectId, DateTime};
use chrono::{Duration, Utc};
use herald_config::{AdminSettings, JwtSettings};
use herald_db::models::Admin;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::dao::base::DaoError;
use crate::store::AdminStore;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Password hash error: {0}")]
    HashError(String),
    #[error("Store error: {0}")]
    Store(#[from] DaoError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // admin id
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
}

pub struct AuthService {
    jwt_settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_settings: JwtSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(jwt_settings.secret.as_bytes());
        Self {
            jwt_settings,
            encoding_key,
            decoding_key,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn generate_token(&self, admin_id: ObjectId, email: &str) -> Result<AccessToken, AuthError> {
        let now = Utc::now();

        let claims = Claims {
            sub: admin_id.to_hex(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.jwt_settings.access_token_ttl_secs as i64))
                .timestamp(),
            iss: self.jwt_settings.issuer.clone(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(AccessToken {
            access_token,
            expires_in: self.jwt_settings.access_token_ttl_secs,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.jwt_settings.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Checks an email/password pair and issues a token for the admin.
    pub async fn login(
        &self,
        admins: &dyn AdminStore,
        email: &str,
        password: &str,
    ) -> Result<(Admin, AccessToken), AuthError> {
        let admin = match admins.find_by_email(email).await {
            Ok(admin) => admin,
            Err(DaoError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        if !self.verify_password(password, &admin.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let id = admin
            .id
            .ok_or_else(|| AuthError::InvalidToken("admin without id".to_string()))?;
        admins.touch_login(id).await?;
        let token = self.generate_token(id, &admin.email)?;
        Ok((admin, token))
    }

    /// Seeds the configured admin account when the collection is empty.
    /// Returns whether an account was created.
    pub async fn bootstrap_admin(
        &self,
        admins: &dyn AdminStore,
        settings: &AdminSettings,
    ) -> Result<bool, AuthError> {
        let (Some(email), Some(password)) = (&settings.email, &settings.password) else {
            return Ok(false);
        };
        if admins.count().await? > 0 {
            return Ok(false);
        }

        let admin = Admin {
            id: None,
            email: email.trim().to_lowercase(),
            password_hash: self.hash_password(password)?,
            created_at: DateTime::now(),
            last_login_at: None,
        };
        let admin = admins.insert(admin).await?;
        info!(email = %admin.email, "Bootstrapped admin account");
        Ok(true)
    }
}
