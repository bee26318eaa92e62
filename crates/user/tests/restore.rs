use temp_dir::TempDir;
use userhub_shared::Error;

mod helpers;

#[tokio::test]
async fn test_restore() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);
    let john = helpers::create_user(&cmd, "john").await?;

    cmd.delete(&john.id).await?;

    let user = cmd.restore(&john.id).await?;
    assert!(!user.is_deleted());
    assert_eq!(user.external_user_id, john.external_user_id);
    assert_eq!(user.status, john.status);
    assert_eq!(user.role, john.role);

    // the cascaded profile keeps its deletion mark
    assert!(user.user_data.unwrap().deleted_at.is_some());

    let user = cmd.find_by_id(&john.id, false).await?;
    assert!(user.is_some());

    Ok(())
}

#[tokio::test]
async fn test_restore_active_user() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);
    let john = helpers::create_user(&cmd, "john").await?;

    let err = cmd.restore(&john.id).await.unwrap_err();
    assert!(matches!(&err, Error::Conflict(_)));
    assert_eq!(cmd.find_by_id(&john.id, false).await?.unwrap(), john);
    assert_eq!(
        err.to_string(),
        format!("User with ID {} is already active", john.id)
    );

    let err = cmd.restore("missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    Ok(())
}
