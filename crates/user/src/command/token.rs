use serde_json::Value;
use userhub_shared::{Error, Result};

use crate::{
    field::Payload,
    repository,
    token::{self, TokenMetadata, TokenResult},
    types::User,
};

impl super::Command {
    /// Signs an access/refresh pair for `user` and stores the refresh token.
    ///
    /// `user` must carry its role and profile. Every failure comes back
    /// wrapped in [`Error::Token`].
    #[tracing::instrument(skip_all, fields(user_id = %user.id))]
    pub async fn issue_tokens(&self, user: &User) -> Result<TokenResult> {
        match self.try_issue_tokens(user).await {
            Ok(result) => {
                tracing::debug!("tokens generated and stored");
                Ok(result)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to generate tokens");
                Err(Error::Token(Box::new(err)))
            }
        }
    }

    async fn try_issue_tokens(&self, user: &User) -> Result<TokenResult> {
        let issued_at = repository::datetime(repository::now())?;
        let metadata =
            TokenMetadata::from_user(user, self.codec.as_ref(), issued_at, self.ttl)?;

        let (access_token, refresh_token) =
            token::sign_pair(self.signer.as_ref(), &metadata, self.ttl).await?;

        let mut updates = Payload::new();
        updates.insert(
            "refresh_token".to_owned(),
            Value::String(refresh_token.to_owned()),
        );
        self.patch(user.id.to_owned(), updates).await?;

        Ok(TokenResult {
            access_token,
            refresh_token,
            metadata,
            expires_in: self.ttl.access,
        })
    }
}
