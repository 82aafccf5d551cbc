use std::collections::HashMap;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use rand::distr::Alphanumeric;
use rand::distr::SampleString;
use tracing::debug;
use tracing::warn;

use super::error::AuthError;
use super::permission::Permission;
use super::permission::Permissions;
use super::secret::JwtSecret;
use super::token::Claims;
use super::token::Credential;
use super::token::Token;

/// Validates tokens into credentials and mints new tokens.
///
/// Implementations may consult an external credential store, so every
/// operation is async.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug {
    /// resolves the permissions granted by `token`.
    ///
    /// fails with [AuthError::InvalidToken] for empty, malformed or wrongly
    /// signed tokens, [AuthError::ExpiredToken] past the validity window and
    /// [AuthError::RevokedToken] for revoked tokens.
    async fn verify(&self, token: &[u8]) -> Result<Credential, AuthError>;

    /// mints a token granting exactly `requested`.
    ///
    /// The caller is responsible for checking that the issuing context holds
    /// [Permission::Admin].
    async fn issue(&self, requested: &Permissions) -> Result<Token, AuthError>;

    /// invalidates `token`; subsequent verification fails with
    /// [AuthError::RevokedToken].
    async fn revoke(&self, token: &[u8]) -> Result<(), AuthError>;
}

/// [CredentialVerifier] for HS256 JSON web tokens.
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: TimeDelta,
    /// revoked token id to its expiry, in seconds since the epoch
    revoked: RwLock<HashMap<String, i64>>,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn new(secret: &JwtSecret, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: TimeDelta::from_std(lifetime).unwrap_or(TimeDelta::MAX),
            revoked: RwLock::new(HashMap::new()),
        }
    }

    /// mints a token with an explicit validity window.
    pub fn mint(
        &self,
        permissions: &Permissions,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Token, AuthError> {
        let claims = Claims {
            allow: permissions.names(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Self::gen_token_id(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(Token::from)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn decode(&self, token: &[u8]) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken("empty token".to_string()));
        }
        let token = std::str::from_utf8(token)
            .map_err(|_| AuthError::InvalidToken("token is not valid UTF-8".to_string()))?;

        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    fn credential(claims: Claims) -> Result<Credential, AuthError> {
        let timestamp = |secs: i64| {
            DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| AuthError::InvalidToken("timestamp out of range".to_string()))
        };

        // names this build does not know never satisfy a requirement.
        let permissions = claims
            .allow
            .iter()
            .filter_map(|name| match Permission::from_name(name) {
                Ok(p) => Some(p),
                Err(_) => {
                    warn!("ignoring unknown permission {name:?} in token {}", claims.jti);
                    None
                }
            })
            .collect();

        Ok(Credential {
            permissions,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
            token_id: claims.jti,
        })
    }

    fn is_revoked(&self, token_id: &str) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(token_id)
    }

    /// forgets revocations of tokens that expired before `now`. Those fail
    /// verification as [AuthError::ExpiredToken] anyway.
    fn prune_revoked(&self, now: DateTime<Utc>) -> usize {
        let mut revoked = self.revoked.write().unwrap_or_else(PoisonError::into_inner);
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at >= now.timestamp());

        before - revoked.len()
    }

    fn gen_token_id() -> String {
        Alphanumeric.sample_string(&mut rand::rng(), 16)
    }
}

#[async_trait]
impl CredentialVerifier for JwtVerifier {
    async fn verify(&self, token: &[u8]) -> Result<Credential, AuthError> {
        let result = self.decode(token).and_then(|claims| {
            if self.is_revoked(&claims.jti) {
                Err(AuthError::RevokedToken)
            } else {
                Self::credential(claims)
            }
        });

        match &result {
            Ok(credential) => debug!(
                "verified token {}, permissions {:?}",
                credential.token_id,
                credential.permissions.names()
            ),
            Err(e) => debug!("rejected token: {e}"),
        }

        result
    }

    async fn issue(&self, requested: &Permissions) -> Result<Token, AuthError> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(self.lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let token = self.mint(requested, issued_at, expires_at)?;
        debug!(
            "issued token with permissions {:?}, valid until {expires_at}",
            requested.names()
        );

        Ok(token)
    }

    async fn revoke(&self, token: &[u8]) -> Result<(), AuthError> {
        let claims = self.decode(token)?;

        let pruned = self.prune_revoked(Utc::now());
        if pruned > 0 {
            debug!("dropped {pruned} revocations of expired tokens");
        }

        self.revoked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(claims.jti.clone(), claims.exp);
        debug!("revoked token {}", claims.jti);

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use macro_rules_attr::apply;

    use super::*;
    use crate::tests::shared_tokio_runtime;

    const LIFETIME: Duration = Duration::from_secs(60 * 60);

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(&JwtSecret::new_in_mem(), LIFETIME)
    }

    /// tests:
    ///  1. verify() on a freshly issued token returns exactly the issued set
    ///  2. the validity window matches the configured lifetime
    #[apply(shared_tokio_runtime)]
    async fn issue_then_verify_round_trips() -> anyhow::Result<()> {
        let verifier = verifier();

        for requested in [
            Permissions::from([Permission::Read]),
            Permissions::from([Permission::Read, Permission::Write]),
            Permissions::from([Permission::Admin, Permission::Sign]),
            Permissions::default(),
        ] {
            let token = verifier.issue(&requested).await?;
            let credential = verifier.verify(token.as_bytes()).await?;

            assert_eq!(requested, credential.permissions);
            assert_eq!(
                LIFETIME.as_secs() as i64,
                (credential.expires_at - credential.issued_at).num_seconds()
            );
        }

        Ok(())
    }

    #[apply(shared_tokio_runtime)]
    async fn expired_token_is_distinct_from_garbage() -> anyhow::Result<()> {
        let verifier = verifier();
        let now = Utc::now();

        let expired = verifier.mint(
            &Permissions::from([Permission::Read]),
            now - TimeDelta::hours(2),
            now - TimeDelta::hours(1),
        )?;

        assert_eq!(
            Err(AuthError::ExpiredToken),
            verifier.verify(expired.as_bytes()).await
        );
        assert!(matches!(
            verifier.verify(b"garbage").await,
            Err(AuthError::InvalidToken(_))
        ));

        Ok(())
    }

    #[apply(shared_tokio_runtime)]
    async fn empty_and_non_utf8_tokens_are_invalid() {
        let verifier = verifier();

        assert!(matches!(
            verifier.verify(b"").await,
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            verifier.verify(&[0xff, 0xfe, 0xfd]).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[apply(shared_tokio_runtime)]
    async fn token_signed_with_other_secret_is_invalid() -> anyhow::Result<()> {
        let token = verifier()
            .issue(&Permissions::from([Permission::Admin]))
            .await?;

        assert!(matches!(
            verifier().verify(token.as_bytes()).await,
            Err(AuthError::InvalidToken(_))
        ));

        Ok(())
    }

    /// tests:
    ///  1. revoked token fails with RevokedToken
    ///  2. other tokens from the same verifier are unaffected
    ///  3. revoking garbage fails with InvalidToken
    #[apply(shared_tokio_runtime)]
    async fn revoked_token_is_rejected() -> anyhow::Result<()> {
        let verifier = verifier();
        let perms = Permissions::from([Permission::Write]);

        let revoked = verifier.issue(&perms).await?;
        let kept = verifier.issue(&perms).await?;

        verifier.revoke(revoked.as_bytes()).await?;

        assert_eq!(
            Err(AuthError::RevokedToken),
            verifier.verify(revoked.as_bytes()).await
        );
        assert_eq!(perms, verifier.verify(kept.as_bytes()).await?.permissions);
        assert!(matches!(
            verifier.revoke(b"not-a-token").await,
            Err(AuthError::InvalidToken(_))
        ));

        Ok(())
    }

    fn revoked_len(verifier: &JwtVerifier) -> usize {
        verifier.revoked.read().unwrap().len()
    }

    /// tests:
    ///  1. revocations are kept while their token is still valid
    ///  2. pruning past the expiry forgets them
    ///  3. the pruned token still fails, now as ExpiredToken
    #[apply(shared_tokio_runtime)]
    async fn revocations_of_expired_tokens_are_dropped() -> anyhow::Result<()> {
        let verifier = verifier();
        let now = Utc::now();

        for _ in 0..10 {
            let token = verifier.issue(&Permissions::from([Permission::Read])).await?;
            verifier.revoke(token.as_bytes()).await?;
        }
        assert_eq!(10, revoked_len(&verifier));
        assert_eq!(0, verifier.prune_revoked(now));

        let later = now + TimeDelta::from_std(LIFETIME)? + TimeDelta::seconds(1);
        assert_eq!(10, verifier.prune_revoked(later));
        assert_eq!(0, revoked_len(&verifier));

        let expired = verifier.mint(
            &Permissions::from([Permission::Read]),
            now - TimeDelta::hours(2),
            now - TimeDelta::hours(1),
        )?;
        assert_eq!(
            Err(AuthError::ExpiredToken),
            verifier.verify(expired.as_bytes()).await
        );

        Ok(())
    }

    /// revoke() itself prunes: after short-lived revoked tokens expire, one
    /// more revocation leaves a single entry.
    #[apply(shared_tokio_runtime)]
    async fn revoke_prunes_expired_revocations() -> anyhow::Result<()> {
        let verifier = JwtVerifier::new(&JwtSecret::new_in_mem(), Duration::from_secs(1));

        for _ in 0..20 {
            let token = verifier.issue(&Permissions::from([Permission::Read])).await?;
            verifier.revoke(token.as_bytes()).await?;
        }
        assert_eq!(20, revoked_len(&verifier));

        tokio::time::sleep(Duration::from_millis(2100)).await;

        let now = Utc::now();
        let fresh = verifier.mint(
            &Permissions::from([Permission::Read]),
            now,
            now + TimeDelta::hours(1),
        )?;
        verifier.revoke(fresh.as_bytes()).await?;
        assert_eq!(1, revoked_len(&verifier));

        Ok(())
    }

    #[apply(shared_tokio_runtime)]
    async fn unknown_claimed_permissions_are_dropped() -> anyhow::Result<()> {
        let secret = JwtSecret::new_in_mem();
        let verifier = JwtVerifier::new(&secret, LIFETIME);
        let now = Utc::now();

        let claims = Claims {
            allow: vec!["read".to_string(), "superuser".to_string()],
            iat: now.timestamp(),
            exp: (now + TimeDelta::hours(1)).timestamp(),
            jti: "handmade".to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        let credential = verifier.verify(token.as_bytes()).await?;
        assert_eq!(Permissions::from([Permission::Read]), credential.permissions);
        assert_eq!("handmade", credential.token_id);

        Ok(())
    }
}
