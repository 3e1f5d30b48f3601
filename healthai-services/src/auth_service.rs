//! Authentication Service
//!
//! Password and Google sign-in on top of the user store. Passwords are
//! hashed with PBKDF2-HMAC-SHA256; sessions are HS256 access tokens whose
//! subject is the user id.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, instrument, warn};

use healthai_core::{HealthError, HealthResult, User, UserProfile};

use crate::user_store::{NewUser, UserStore};

type HmacSha256 = Hmac<Sha256>;

/// Iteration count applied to newly hashed passwords
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Google endpoint that resolves an OAuth access token to a profile
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Configuration for AuthService
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Access token lifetime in seconds (default: 7 days)
    pub token_ttl_secs: i64,
    /// Google userinfo endpoint (overridden in tests)
    pub userinfo_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 7 * 24 * 60 * 60,
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Claims carried inside an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id as a string
    pub sub: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Issued session returned by signup and login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub user: UserProfile,
}

/// Profile shape returned by Google's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub verified_email: Option<bool>,
}

/// Authentication service
pub struct AuthService {
    store: Arc<UserStore>,
    client: Client,
    jwt_secret: String,
    config: AuthConfig,
}

impl AuthService {
    /// Create a service with the default configuration
    pub fn new(store: Arc<UserStore>, jwt_secret: impl Into<String>) -> Self {
        Self::with_config(store, jwt_secret, AuthConfig::default())
    }

    /// Create a service with an explicit configuration
    pub fn with_config(
        store: Arc<UserStore>,
        jwt_secret: impl Into<String>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            jwt_secret: jwt_secret.into(),
            config,
        }
    }

    /// Register a password account and open a session for it
    #[instrument(skip(self, password))]
    pub fn signup(&self, email: &str, password: &str, full_name: &str) -> HealthResult<Session> {
        let email = email.trim();
        let full_name = full_name.trim();

        if email.is_empty() || !email.contains('@') {
            return Err(HealthError::validation("A valid email address is required"));
        }
        if full_name.is_empty() {
            return Err(HealthError::validation("Full name is required"));
        }
        if password.len() < 8 {
            return Err(HealthError::validation(
                "Password must be at least 8 characters",
            ));
        }

        if self.store.find_by_email(email)?.is_some() {
            return Err(HealthError::conflict("Email already registered"));
        }

        let user = self.store.create_user(&NewUser {
            email: email.to_string(),
            full_name: full_name.to_string(),
            password_hash: Some(hash_password(password)?),
            google_id: None,
            oauth_provider: None,
            profile_picture: None,
            is_verified: false,
        })?;

        info!("Registered new account for {}", user.email);
        self.issue_session(&user)
    }

    /// Authenticate a password account and open a session for it
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> HealthResult<Session> {
        let user = self
            .store
            .find_by_email(email.trim())?
            .ok_or_else(|| HealthError::auth("Incorrect email or password"))?;

        // OAuth-only accounts have no password to check against.
        let stored = user
            .password_hash
            .as_deref()
            .ok_or_else(|| HealthError::auth("Incorrect email or password"))?;

        if !verify_password(password, stored) {
            return Err(HealthError::auth("Incorrect email or password"));
        }
        if !user.is_active {
            return Err(HealthError::forbidden("Account is disabled"));
        }

        self.issue_session(&user)
    }

    /// Sign in with a Google OAuth access token
    ///
    /// Matches an existing account by Google id, then by email (linking the
    /// Google identity to it), and otherwise registers a new account.
    #[instrument(skip(self, access_token))]
    pub async fn google_login(&self, access_token: &str) -> HealthResult<Session> {
        let profile = self.fetch_google_profile(access_token).await?;

        if let Some(user) = self.store.find_by_google_id(&profile.id)? {
            if !user.is_active {
                return Err(HealthError::forbidden("Account is disabled"));
            }
            return self.issue_session(&user);
        }

        if let Some(user) = self.store.find_by_email(&profile.email)? {
            if !user.is_active {
                return Err(HealthError::forbidden("Account is disabled"));
            }
            self.store
                .link_google(user.id, &profile.id, profile.picture.as_deref())?;
            let user = self
                .store
                .find_by_id(user.id)?
                .ok_or_else(|| HealthError::storage("Account disappeared during Google link"))?;
            info!("Linked Google identity to existing account {}", user.email);
            return self.issue_session(&user);
        }

        let user = self.store.create_user(&NewUser {
            email: profile.email.clone(),
            full_name: profile.name.clone().unwrap_or_else(|| profile.email.clone()),
            password_hash: None,
            google_id: Some(profile.id.clone()),
            oauth_provider: Some("google".to_string()),
            profile_picture: profile.picture.clone(),
            is_verified: profile.verified_email.unwrap_or(true),
        })?;

        info!("Registered new Google account for {}", user.email);
        self.issue_session(&user)
    }

    /// Resolve a bearer token to its account
    pub fn current_user(&self, token: &str) -> HealthResult<User> {
        let claims = self.verify_token(token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| HealthError::auth("Malformed access token"))?;

        let user = self
            .store
            .find_by_id(user_id)?
            .ok_or_else(|| HealthError::auth("User no longer exists"))?;
        if !user.is_active {
            return Err(HealthError::forbidden("Account is disabled"));
        }

        Ok(user)
    }

    /// Issue a signed access token for a user
    pub fn issue_token(&self, user: &User) -> HealthResult<String> {
        let iat = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: user.id.to_string(),
            iat,
            exp: iat + self.config.token_ttl_secs,
        };

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = serde_json::to_vec(&claims)
            .map_err(|e| HealthError::internal(format!("Failed to encode claims: {}", e)))?;
        let message = format!("{}.{}", header, URL_SAFE_NO_PAD.encode(payload));
        let signature = self.sign(message.as_bytes())?;

        Ok(format!("{}.{}", message, signature))
    }

    /// Verify a token's signature and expiry, returning its claims
    pub fn verify_token(&self, token: &str) -> HealthResult<TokenClaims> {
        let mut parts = token.splitn(3, '.');
        let (Some(header), Some(payload), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(HealthError::auth("Malformed access token"));
        };

        let expected = self.sign(format!("{}.{}", header, payload).as_bytes())?;
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return Err(HealthError::auth("Invalid token signature"));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| HealthError::auth("Malformed access token"))?;
        let claims: TokenClaims = serde_json::from_slice(&payload)
            .map_err(|_| HealthError::auth("Malformed access token"))?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(HealthError::auth("Access token has expired"));
        }

        Ok(claims)
    }

    fn issue_session(&self, user: &User) -> HealthResult<Session> {
        if let Err(e) = self.store.touch_last_login(user.id) {
            warn!("Failed to update last login for user {}: {}", user.id, e);
        }

        Ok(Session {
            access_token: self.issue_token(user)?,
            token_type: "bearer".to_string(),
            user: user.profile(),
        })
    }

    fn sign(&self, message: &[u8]) -> HealthResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.jwt_secret.as_bytes())
            .map_err(|e| HealthError::internal(format!("Failed to create HMAC: {}", e)))?;
        mac.update(message);

        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    async fn fetch_google_profile(&self, access_token: &str) -> HealthResult<GoogleUserInfo> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| HealthError::network(format!("Google userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(HealthError::auth("Google rejected the access token"));
        }

        response
            .json()
            .await
            .map_err(|e| HealthError::parse(format!("Google userinfo response: {}", e)))
    }
}

/// Hash a password with PBKDF2-HMAC-SHA256 and a fresh random salt
///
/// Output format: `pbkdf2-sha256$<iterations>$<salt_hex>$<hash_hex>`, so the
/// iteration count can be raised later without invalidating stored hashes.
pub fn hash_password(password: &str) -> HealthResult<String> {
    let salt: [u8; 16] = rand::rng().random();
    let hash = pbkdf2_sha256(password.as_bytes(), &salt, PBKDF2_ITERATIONS)?;

    Ok(format!(
        "pbkdf2-sha256${}${}${}",
        PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    ))
}

/// Check a password against a stored hash string
///
/// Malformed stored values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != "pbkdf2-sha256" || parts.next().is_some() {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let Ok(salt) = hex::decode(salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };

    match pbkdf2_sha256(password.as_bytes(), &salt, iterations) {
        Ok(hash) => constant_time_eq(&hash, &expected),
        Err(_) => false,
    }
}

/// PBKDF2 with a single SHA-256 block (derived length = HMAC output size)
fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> HealthResult<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(password)
        .map_err(|e| HealthError::internal(format!("Failed to create HMAC: {}", e)))?;
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut round: [u8; 32] = mac.finalize().into_bytes().into();
    let mut block = round;

    for _ in 1..iterations {
        let mut mac = HmacSha256::new_from_slice(password)
            .map_err(|e| HealthError::internal(format!("Failed to create HMAC: {}", e)))?;
        mac.update(&round);
        round = mac.finalize().into_bytes().into();
        for (b, r) in block.iter_mut().zip(round.iter()) {
            *b ^= r;
        }
    }

    Ok(block)
}

/// Compare byte slices without an early exit on the first mismatch
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
