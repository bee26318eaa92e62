use serde_json::Value;
use userhub_shared::{Error, Result};

use crate::{
    filter::{MatchMode, Predicate},
    repository,
    types::User,
};

impl super::Command {
    /// Loads the first user matching `predicate` with its role and profile.
    ///
    /// Soft-deleted users are skipped unless `include_deleted` is set.
    pub async fn find(&self, predicate: &Predicate, include_deleted: bool) -> Result<Option<User>> {
        repository::find_aggregate(&self.read_db, predicate, include_deleted)
            .await?
            .map(|row| row.into_user(self.codec.as_ref(), self.paths.as_ref()))
            .transpose()
    }

    /// Same as [`Self::find`] with the filter given as a JSON mapping.
    pub async fn find_by_json(
        &self,
        filter: &Value,
        mode: MatchMode,
        include_deleted: bool,
    ) -> Result<Option<User>> {
        let predicate = Predicate::from_json(filter, mode)?;

        self.find(&predicate, include_deleted).await
    }

    pub async fn find_by_id(
        &self,
        id: impl Into<String>,
        include_deleted: bool,
    ) -> Result<Option<User>> {
        self.find(&Predicate::by_id(id), include_deleted).await
    }

    /// Reads back an active user right after a write, through the write pool.
    pub(crate) async fn reload(&self, id: &str) -> Result<User> {
        repository::find_aggregate(&self.write_db, &Predicate::by_id(id), false)
            .await?
            .map(|row| row.into_user(self.codec.as_ref(), self.paths.as_ref()))
            .transpose()?
            .ok_or_else(|| Error::NotFound(format!("User not found with id {id}")))
    }
}
