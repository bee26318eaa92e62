use userhub_shared::Result;

use crate::{cascade, transaction, types::User};

impl super::Command {
    /// Brings back a soft-deleted user. Its profile row keeps whatever
    /// deletion mark it has.
    #[tracing::instrument(skip_all)]
    pub async fn restore(&self, id: impl Into<String>) -> Result<User> {
        let id = id.into();

        let target = id.to_owned();
        transaction::scoped(&self.write_db, move |conn| {
            Box::pin(async move { cascade::restore(conn, &target).await })
        })
        .await?;

        self.reload(&id).await
    }
}
