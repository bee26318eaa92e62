use userhub_shared::{Result, user::Status};
use validator::Validate;

use crate::{
    field::{self, AGGREGATE, Payload, USER_DATA, USERS},
    picture::DEFAULT_AVATAR,
    repository, transaction,
    types::User,
};

use super::create::put;

#[derive(Validate, Default, Debug, Clone)]
pub struct UpdateInput {
    #[validate(length(max = 50))]
    pub name: Option<String>,
    #[validate(email, length(max = 50))]
    pub email: Option<String>,
    pub profile: Option<String>,
    #[validate(length(max = 100))]
    pub phone: Option<String>,
}

impl super::Command {
    /// Rewrites the profile of an active user and marks it active again.
    ///
    /// A missing profile image falls back to the default avatar.
    #[tracing::instrument(skip_all)]
    pub async fn update(&self, id: impl Into<String>, input: UpdateInput) -> Result<User> {
        input.validate()?;

        let id = id.into();
        let mut payload = Payload::new();
        payload.insert("status".to_owned(), Status::Active.code().into());
        put(&mut payload, "name", input.name);
        put(&mut payload, "email", input.email);
        put(&mut payload, "phone", input.phone);
        put(
            &mut payload,
            "profile",
            Some(input.profile.unwrap_or_else(|| DEFAULT_AVATAR.to_owned())),
        );

        let mut values = field::split(&payload, &AGGREGATE, None);
        let core = values.take(&USERS);
        let extension = values.take(&USER_DATA);

        let target = id.to_owned();
        transaction::scoped(&self.write_db, move |conn| {
            Box::pin(async move {
                repository::replace_fields(conn, &target, &core, &extension).await
            })
        })
        .await?;

        tracing::info!(user_id = %id, "user updated");

        self.reload(&id).await
    }
}
