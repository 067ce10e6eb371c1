//! Password hashing and bearer tokens
//!
//! Passwords are stored as PHC-formatted Argon2id hashes. Tokens are HS256
//! JWTs of the form `base64url(header).base64url(claims).base64url(mac)`.

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    error::{AppError, AppResult},
    models::User,
};

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime when none is configured (7 days)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

const TOKEN_ALGORITHM: &str = "HS256";
const SECRET_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    /// Issued at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenSigner {
    secret: Arc<[u8]>,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: i64) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            ttl_secs,
        }
    }

    /// Signer with a fresh random secret; its tokens do not survive a restart
    pub fn random(ttl_secs: i64) -> Self {
        let mut secret = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut secret);
        Self::new(secret, ttl_secs)
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let iat = Utc::now().timestamp();
        self.encode(&Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat,
            exp: iat + self.ttl_secs,
        })
    }

    /// Checks the signature and expiry of a token
    ///
    /// Every failure maps to [`AppError::Unauthorized`]; the reason is only logged.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn encode(&self, claims: &Claims) -> AppResult<String> {
        let header = TokenHeader {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let header = serde_json::to_vec(&header)
            .map_err(|e| AppError::Internal(format!("Failed to encode token header: {}", e)))?;
        let claims = serde_json::to_vec(claims)
            .map_err(|e| AppError::Internal(format!("Failed to encode token claims: {}", e)))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let signature = self.mac(&signing_input)?.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn verify_at(&self, token: &str, now: i64) -> AppResult<Claims> {
        let reject = |reason: &str| {
            tracing::debug!(reason, "Rejected bearer token");
            AppError::Unauthorized
        };

        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(reject("malformed"));
        };

        let header: TokenHeader = decode_segment(header_b64).ok_or_else(|| reject("bad header"))?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(reject("unsupported algorithm"));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| reject("bad signature encoding"))?;
        self.mac(&format!("{}.{}", header_b64, claims_b64))?
            .verify_slice(&signature)
            .map_err(|_| reject("bad signature"))?;

        let claims: Claims = decode_segment(claims_b64).ok_or_else(|| reject("bad claims"))?;
        if claims.exp <= now {
            return Err(reject("expired"));
        }

        Ok(claims)
    }

    fn mac(&self, signing_input: &str) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(format!("Invalid token secret: {}", e)))?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Argon2id cost parameters for new password hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        // OWASP recommendation for Argon2id
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl HashParams {
    /// Cheap parameters for tests; never use them in production
    pub fn fast() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn hasher(&self) -> AppResult<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| AppError::Internal(format!("Invalid hash parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes `password` with a fresh salt, returning a PHC string
pub fn hash_password(password: &str, params: HashParams) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored PHC string
///
/// The cost parameters are read from the hash itself.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Tokens and password hashing shared by the auth routes and extractor
#[derive(Debug, Clone)]
pub struct Authenticator {
    tokens: TokenSigner,
    hash_params: HashParams,
}

impl Authenticator {
    pub fn new(tokens: TokenSigner, hash_params: HashParams) -> Self {
        Self {
            tokens,
            hash_params,
        }
    }

    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }

    /// Hashes on the blocking pool so request threads are not stalled
    pub async fn hash_password(&self, password: String) -> AppResult<String> {
        let params = self.hash_params;
        tokio::task::spawn_blocking(move || hash_password(&password, params))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    pub async fn verify_password(&self, password: String, password_hash: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(
            TokenSigner::random(DEFAULT_TOKEN_TTL_SECS),
            HashParams::default(),
        )
    }
}
