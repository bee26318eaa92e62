use serde_json::Value;
use userhub_shared::{Result, user::Status};
use validator::Validate;

use crate::{
    field::{self, AGGREGATE, Payload, USER_DATA, USERS},
    picture::DEFAULT_AVATAR,
    repository, transaction,
    types::User,
};

#[derive(Validate, Default, Debug, Clone)]
pub struct CreateInput {
    #[validate(length(min = 1, max = 100))]
    pub external_user_id: String,
    pub external_access_token: Option<String>,
    #[validate(email, length(max = 50))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub name: Option<String>,
    pub profile: Option<String>,
}

pub(crate) fn put(payload: &mut Payload, key: &str, value: Option<String>) {
    if let Some(value) = value {
        payload.insert(key.to_owned(), Value::String(value));
    }
}

impl super::Command {
    /// Registers an active user with the default role and a profile extension.
    #[tracing::instrument(skip_all, fields(external_user_id = %input.external_user_id))]
    pub async fn create(&self, input: CreateInput) -> Result<User> {
        input.validate()?;

        let role = self.default_role().await?;

        let mut payload = Payload::new();
        put(&mut payload, "external_user_id", Some(input.external_user_id));
        put(&mut payload, "external_access_token", input.external_access_token);
        put(&mut payload, "role_id", Some(role.id));
        payload.insert("status".to_owned(), Status::Active.code().into());
        put(&mut payload, "email", input.email);
        put(&mut payload, "name", input.name);
        put(
            &mut payload,
            "profile",
            Some(input.profile.unwrap_or_else(|| DEFAULT_AVATAR.to_owned())),
        );

        let id = repository::new_id();
        let mut values = field::split(&payload, &AGGREGATE, Some(&id));
        let core = values.take(&USERS);
        let extension = values.take(&USER_DATA);

        let created = id.to_owned();
        transaction::scoped(&self.write_db, move |conn| {
            Box::pin(async move {
                repository::create(conn, created, &core, &extension).await
            })
        })
        .await?;

        tracing::info!(user_id = %id, "user created");

        self.reload(&id).await
    }
}
