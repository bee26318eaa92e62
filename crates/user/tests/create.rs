use temp_dir::TempDir;
use userhub_shared::{Error, user::Status};
use userhub_user::{CreateInput, picture::DEFAULT_AVATAR};

mod helpers;

#[tokio::test]
async fn test_create() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);

    let user = helpers::create_user(&cmd, "john.doe").await?;

    assert_eq!(user.status, Status::Active);
    assert_eq!(user.external_user_id.as_deref(), Some("ext-john.doe"));
    assert_eq!(user.email(), Some("john.doe@userhub.localhost"));
    assert_eq!(user.name(), Some("john.doe"));
    assert!(!user.is_deleted());

    let role = user.role.as_ref().unwrap();
    assert_eq!(role.name, "user");
    assert_eq!(user.role_id.as_deref(), Some(role.id.as_str()));

    let data = user.user_data.as_ref().unwrap();
    assert_eq!(data.user_id, user.id);
    assert_eq!(data.profile.as_deref(), Some(DEFAULT_AVATAR));

    Ok(())
}

#[tokio::test]
async fn test_create_validation() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);

    let err = cmd
        .create(CreateInput {
            external_user_id: "ext-1".to_owned(),
            email: Some("not-an-email".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validate(_)));

    let err = cmd.create(CreateInput::default()).await.unwrap_err();
    assert!(matches!(err, Error::Validate(_)));

    Ok(())
}

#[tokio::test]
async fn test_create_without_default_role() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state).with_default_role("guest");

    let err = cmd
        .create(CreateInput {
            external_user_id: "ext-1".to_owned(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.status_code(), 404);

    Ok(())
}
