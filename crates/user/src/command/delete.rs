use userhub_shared::Result;

use crate::{cascade, cascade::DeletePolicy, transaction};

impl super::Command {
    /// Removes a user with the configured [`DeletePolicy`].
    pub async fn delete(&self, id: impl Into<String>) -> Result<()> {
        self.delete_with(id, self.policy).await
    }

    #[tracing::instrument(skip_all, fields(soft = policy.soft_delete()))]
    pub async fn delete_with(&self, id: impl Into<String>, policy: DeletePolicy) -> Result<()> {
        let id = id.into();

        transaction::scoped(&self.write_db, move |conn| {
            Box::pin(async move { cascade::delete(conn, &id, policy).await })
        })
        .await
    }
}
