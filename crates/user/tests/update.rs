use serde_json::json;
use temp_dir::TempDir;
use userhub_shared::{Error, user::Status};
use userhub_user::{UpdateInput, picture::DEFAULT_AVATAR};

mod helpers;

#[tokio::test]
async fn test_update() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);
    let john = helpers::create_user(&cmd, "john").await?;

    cmd.patch(
        &john.id,
        helpers::payload(json!({ "status": "inactive", "profile": "avatars/john.png" })),
    )
    .await?;

    let user = cmd
        .update(
            &john.id,
            UpdateInput {
                name: Some("John Doe".to_owned()),
                phone: Some("+62 812 0000".to_owned()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(user.status, Status::Active);
    assert_eq!(user.name(), Some("John Doe"));
    assert_eq!(user.email(), john.email());

    let data = user.user_data.as_ref().unwrap();
    assert_eq!(data.phone.as_deref(), Some("+62 812 0000"));
    assert_eq!(data.profile.as_deref(), Some(DEFAULT_AVATAR));
    assert_eq!(data.id, john.user_data.as_ref().unwrap().id);

    Ok(())
}

#[tokio::test]
async fn test_update_resolves_relative_profile() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);
    let john = helpers::create_user(&cmd, "john").await?;

    let user = cmd
        .update(
            &john.id,
            UpdateInput {
                profile: Some("avatars/john.png".to_owned()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(
        user.user_data.unwrap().profile.as_deref(),
        Some("http://localhost:3000/avatars/john.png")
    );

    Ok(())
}

#[tokio::test]
async fn test_update_validation() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);
    let john = helpers::create_user(&cmd, "john").await?;

    let err = cmd
        .update(
            &john.id,
            UpdateInput {
                email: Some("nope".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validate(_)));

    let err = cmd
        .update("missing", UpdateInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    Ok(())
}
