use userhub_shared::Result;

use crate::repository;

impl super::Command {
    /// Deletes the user row when both tokens still match it.
    ///
    /// Returns `false` when nothing matched.
    #[tracing::instrument(skip_all)]
    pub async fn revoke_refresh_token(
        &self,
        id: impl Into<String>,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<bool> {
        let id = id.into();
        let removed =
            repository::remove_by_credentials(&self.write_db, &id, access_token, refresh_token)
                .await?;

        if removed == 0 {
            tracing::debug!(user_id = %id, "no user matched the revoked credentials");
        }

        Ok(removed > 0)
    }
}
