use std::{path::PathBuf, str::FromStr};

use serde_json::Value;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use userhub_shared::{State, user::AccessType};
use userhub_user::{
    Command, CreateInput, NewRole, User,
    field::Payload,
    permission::{Action, Permissions},
    picture::PublicPathResolver,
    token::JwtSigner,
};

pub const SECRET: &str = "test_secret_key_minimum_32_characters_long";
pub const REFRESH_SECRET: &str = "refresh_secret_key_minimum_32_characters";

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    userhub_db::create_tables(&pool).await?;

    let state = State::new(pool);
    command(state.clone())
        .create_role(NewRole {
            name: "user".to_owned(),
            access: AccessType::Mobile,
            permissions: Permissions::default().grant("user", &[Action::Read, Action::Update]),
        })
        .await?;

    Ok(state)
}

pub fn command(state: State) -> Command {
    Command::new(state, JwtSigner::new(SECRET, Some(REFRESH_SECRET)))
        .with_path_resolver(PublicPathResolver::new("http://localhost:3000").unwrap())
}

#[allow(dead_code)]
pub async fn create_user(cmd: &Command, name: impl Into<String>) -> anyhow::Result<User> {
    let name = name.into();

    Ok(cmd
        .create(CreateInput {
            external_user_id: format!("ext-{name}"),
            external_access_token: Some(format!("access-{name}")),
            email: Some(format!("{name}@userhub.localhost")),
            name: Some(name),
            profile: None,
        })
        .await?)
}

#[allow(dead_code)]
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
