use userhub_shared::Result;

use crate::{
    field::{self, AGGREGATE, Payload, USER_DATA, USERS},
    repository, transaction,
    types::User,
};

impl super::Command {
    /// Writes only the supplied fields, each to the table that owns it.
    ///
    /// Keys no table owns are ignored. The profile row is left untouched when
    /// `updates` has nothing for it.
    #[tracing::instrument(skip_all)]
    pub async fn patch(&self, id: impl Into<String>, updates: Payload) -> Result<User> {
        let id = id.into();
        let mut values = field::split(&updates, &AGGREGATE, None);
        let core = values.take(&USERS);
        let extension = values.take(&USER_DATA);

        let target = id.to_owned();
        transaction::scoped(&self.write_db, move |conn| {
            Box::pin(async move {
                repository::replace_fields(conn, &target, &core, &extension).await
            })
        })
        .await?;

        tracing::debug!(user_id = %id, "user patched");

        self.reload(&id).await
    }
}
