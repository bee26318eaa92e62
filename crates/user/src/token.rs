use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use userhub_shared::{Error, Result, invalid};

use crate::{
    permission::{PermissionCodec, TokenPermissions},
    types::User,
};

#[derive(Display, AsRefStr, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Lifetimes in seconds of the two issued tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenTtl {
    pub access: u64,
    pub refresh: u64,
}

impl TokenTtl {
    /// When a token of `kind` issued at `issued_at` stops being valid.
    pub fn expires_at(
        &self,
        issued_at: OffsetDateTime,
        kind: TokenKind,
    ) -> Result<OffsetDateTime> {
        let ttl = match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
        };

        let Some(at) = i64::try_from(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add(Duration::seconds(ttl)))
        else {
            invalid!("{kind} token lifetime of {ttl}s is out of range");
        };

        Ok(at)
    }
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access: 3600,
            refresh: 86400,
        }
    }
}

/// Identity embedded in both tokens of a pair.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TokenMetadata {
    pub id: String,
    pub external_user_id: Option<String>,
    pub external_access_token: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: String,
    #[serde(rename = "type")]
    pub access: i64,
    pub permissions: TokenPermissions,
    pub date: String,
    pub expired: String,
}

impl TokenMetadata {
    /// Needs the role and the profile extension to be loaded on `user`.
    ///
    /// Both lifetimes of `ttl` must land on a representable expiry.
    pub fn from_user(
        user: &User,
        codec: &dyn PermissionCodec,
        issued_at: OffsetDateTime,
        ttl: TokenTtl,
    ) -> Result<Self> {
        let (Some(role), Some(data)) = (&user.role, &user.user_data) else {
            invalid!("Invalid user data: role or user_data missing");
        };

        let expired = ttl.expires_at(issued_at, TokenKind::Access)?;
        ttl.expires_at(issued_at, TokenKind::Refresh)?;

        Ok(Self {
            id: user.id.to_owned(),
            external_user_id: user.external_user_id.to_owned(),
            external_access_token: user
                .external_access_token
                .to_owned()
                .or_else(|| user.external_user_id.to_owned()),
            email: data.email.to_owned(),
            name: data.name.to_owned(),
            role: role.name.to_owned(),
            access: role.access.code(),
            permissions: codec.encode_for_token(&role.permissions),
            date: rfc3339(issued_at)?,
            expired: rfc3339(expired)?,
        })
    }
}

fn rfc3339(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339).map_err(|err| Error::Unknown(err.into()))
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    #[serde(flatten)]
    pub metadata: TokenMetadata,
    pub typ: TokenKind,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Clone, Debug)]
pub struct TokenResult {
    pub access_token: String,
    pub refresh_token: String,
    pub metadata: TokenMetadata,
    pub expires_in: u64,
}

#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(
        &self,
        metadata: &TokenMetadata,
        ttl: u64,
        kind: TokenKind,
    ) -> anyhow::Result<String>;
}

/// HS256 signer with one secret per token kind.
#[derive(Clone)]
pub struct JwtSigner {
    access: (EncodingKey, DecodingKey),
    refresh: (EncodingKey, DecodingKey),
}

impl JwtSigner {
    /// Refresh tokens fall back to the access secret when no dedicated one is set.
    pub fn new(secret: &str, refresh_secret: Option<&str>) -> Self {
        let keys = |secret: &str| {
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        };

        Self {
            access: keys(secret),
            refresh: keys(refresh_secret.unwrap_or(secret)),
        }
    }

    fn keys(&self, kind: TokenKind) -> &(EncodingKey, DecodingKey) {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Validate and decode a token of the given kind
    pub fn verify(&self, token: &str, kind: TokenKind) -> anyhow::Result<Claims> {
        let (_, decoding) = self.keys(kind);
        let token_data = decode::<Claims>(token, decoding, &Validation::default())
            .context("Failed to decode JWT")?;

        if token_data.claims.typ != kind {
            anyhow::bail!("expected {kind} token, got {}", token_data.claims.typ);
        }

        Ok(token_data.claims)
    }
}

#[async_trait]
impl Signer for JwtSigner {
    async fn sign(
        &self,
        metadata: &TokenMetadata,
        ttl: u64,
        kind: TokenKind,
    ) -> anyhow::Result<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("Failed to get current time")?
            .as_secs();

        let Some(exp) = iat.checked_add(ttl) else {
            anyhow::bail!("{kind} token lifetime of {ttl}s is out of range");
        };

        let claims = Claims {
            metadata: metadata.clone(),
            typ: kind,
            iat,
            exp,
        };

        let (encoding, _) = self.keys(kind);
        let token = encode(&Header::default(), &claims, encoding).context("Failed to encode JWT")?;

        Ok(token)
    }
}

/// Signs the access and refresh tokens concurrently. Fails if either fails.
pub async fn sign_pair(
    signer: &dyn Signer,
    metadata: &TokenMetadata,
    ttl: TokenTtl,
) -> Result<(String, String)> {
    let pair = futures::try_join!(
        signer.sign(metadata, ttl.access, TokenKind::Access),
        signer.sign(metadata, ttl.refresh, TokenKind::Refresh),
    )?;

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const SECRET: &str = "test_secret_key_minimum_32_characters_long";
    const REFRESH_SECRET: &str = "refresh_secret_key_minimum_32_characters";

    fn metadata() -> TokenMetadata {
        TokenMetadata {
            id: "01HZY".to_owned(),
            external_user_id: Some("ext-1".to_owned()),
            external_access_token: Some("ext-1".to_owned()),
            email: Some("a@b.com".to_owned()),
            name: Some("Ann".to_owned()),
            role: "user".to_owned(),
            access: 0,
            permissions: BTreeMap::from([("user".to_owned(), vec!["read".to_owned()])]),
            date: "2026-01-01T00:00:00Z".to_owned(),
            expired: "2026-01-01T01:00:00Z".to_owned(),
        }
    }

    #[tokio::test]
    async fn sign_pair_and_verify_each_kind() {
        let signer = JwtSigner::new(SECRET, Some(REFRESH_SECRET));

        let (access, refresh) = sign_pair(&signer, &metadata(), TokenTtl::default())
            .await
            .unwrap();

        assert_ne!(access, refresh);

        let claims = signer.verify(&access, TokenKind::Access).unwrap();
        assert_eq!(claims.metadata, metadata());
        assert_eq!(claims.exp - claims.iat, 3600);

        let claims = signer.verify(&refresh, TokenKind::Refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[tokio::test]
    async fn kinds_are_not_interchangeable() {
        let signer = JwtSigner::new(SECRET, Some(REFRESH_SECRET));
        let (access, refresh) = sign_pair(&signer, &metadata(), TokenTtl::default())
            .await
            .unwrap();

        assert!(signer.verify(&access, TokenKind::Refresh).is_err());
        assert!(signer.verify(&refresh, TokenKind::Access).is_err());

        let shared = JwtSigner::new(SECRET, None);
        let token = shared
            .sign(&metadata(), 60, TokenKind::Access)
            .await
            .unwrap();
        assert!(shared.verify(&token, TokenKind::Refresh).is_err());
    }

    #[tokio::test]
    async fn reject_lifetime_past_expiry_range() {
        let signer = JwtSigner::new(SECRET, None);

        let err = signer
            .sign(&metadata(), u64::MAX, TokenKind::Refresh)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = sign_pair(
            &signer,
            &metadata(),
            TokenTtl {
                access: 60,
                refresh: u64::MAX,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Unknown(_)));
    }

    #[test]
    fn expiry_out_of_range_is_invalid() {
        let ttl = TokenTtl {
            access: 60,
            refresh: u64::MAX,
        };
        let issued_at = OffsetDateTime::UNIX_EPOCH;

        assert_eq!(
            ttl.expires_at(issued_at, TokenKind::Access).unwrap(),
            issued_at + Duration::seconds(60)
        );
        assert!(matches!(
            ttl.expires_at(issued_at, TokenKind::Refresh),
            Err(Error::Validate(_))
        ));

        let ttl = TokenTtl {
            access: i64::MAX as u64,
            refresh: i64::MAX as u64,
        };
        assert!(matches!(
            ttl.expires_at(issued_at, TokenKind::Access),
            Err(Error::Validate(_))
        ));
    }

    #[test]
    fn metadata_serializes_access_as_type() {
        let value = serde_json::to_value(metadata()).unwrap();

        assert_eq!(value["type"], 0);
        assert_eq!(value["permissions"]["user"][0], "read");
    }
}
