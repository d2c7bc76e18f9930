//! Ticket Credential Issuer
//!
//! Mints the unforgeable token that proves a registration and resolves
//! presented tokens back to registration ids at the venue.
//!
//! The token is 32 bytes from the OS CSPRNG, hex encoded. Only its SHA-256
//! hash is persisted, on the registration row itself, so a database read
//! alone never yields a presentable credential. Resolution hashes the
//! presented token and looks the hash up; an unminted token matches nothing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::error::AppError;

/// Number of random bytes in a ticket token (256 bits)
const TOKEN_BYTES: usize = 32;

/// URI scheme embedded in the scannable payload
const CHECKIN_SCHEME: &str = "checkin";

/// A freshly minted credential: the presentable token and its stored hash
#[derive(Debug, Clone)]
pub struct MintedCredential {
    /// Hex-encoded token handed to the registrant, never persisted
    pub token: String,
    /// Hex-encoded SHA-256 of the token, stored on the registration row
    pub hash: String,
}

/// Issues and resolves ticket credentials
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    pool: PgPool,
}

impl CredentialIssuer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mint a new credential
    ///
    /// Pure generation; binding to a registration happens when the caller
    /// stores the hash inside the registration's insert transaction.
    pub fn mint() -> MintedCredential {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);

        let token = hex::encode(bytes);
        let hash = Self::hash_token(&token);

        MintedCredential { token, hash }
    }

    /// Hex-encoded SHA-256 of a token string
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Resolve a presented token to its registration id
    ///
    /// Fails with `InvalidCredential` for anything that was never minted.
    pub async fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
        let hash = Self::hash_token(token);

        let registration_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM registrations WHERE credential_hash = $1")
                .bind(&hash)
                .fetch_optional(&self.pool)
                .await?;

        registration_id.ok_or_else(|| DomainError::InvalidCredential.into())
    }

    /// Deterministic scannable payload for a token
    ///
    /// Any holder of the token can recompute this without contacting the
    /// issuer; scanners decode it and present the embedded token.
    pub fn render_image(token: &str) -> String {
        BASE64.encode(format!("{}:{}", CHECKIN_SCHEME, token))
    }

    /// Extract the token from a scanned payload, if well formed
    pub fn decode_image(payload: &str) -> Option<String> {
        let decoded = BASE64.decode(payload).ok()?;
        let text = String::from_utf8(decoded).ok()?;
        let token = text.strip_prefix(CHECKIN_SCHEME)?.strip_prefix(':')?;
        (!token.is_empty()).then(|| token.to_string())
    }
}
