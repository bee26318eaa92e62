use serde_json::json;
use temp_dir::TempDir;
use userhub_shared::Error;
use userhub_user::{Field, MatchMode, Predicate};

mod helpers;

#[tokio::test]
async fn test_find() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);
    let john = helpers::create_user(&cmd, "john").await?;
    let jane = helpers::create_user(&cmd, "jane").await?;

    let user = cmd.find_by_id(&jane.id, false).await?.unwrap();
    assert_eq!(user, jane);

    let user = cmd
        .find_by_json(
            &json!({ "user_data": { "email": "john@userhub.localhost" } }),
            MatchMode::All,
            false,
        )
        .await?
        .unwrap();
    assert_eq!(user.id, john.id);

    let user = cmd
        .find(
            &Predicate::all()
                .eq(Field::RoleName, "user")
                .eq(Field::ExternalUserId, "ext-jane"),
            false,
        )
        .await?
        .unwrap();
    assert_eq!(user.id, jane.id);

    let user = cmd
        .find_by_json(
            &json!({ "id": ["missing", &jane.id] }),
            MatchMode::All,
            false,
        )
        .await?
        .unwrap();
    assert_eq!(user.id, jane.id);

    let user = cmd
        .find_by_json(
            &json!({ "external_user_id": "nobody", "user_data": { "name": "jane" } }),
            MatchMode::Any,
            false,
        )
        .await?
        .unwrap();
    assert_eq!(user.id, jane.id);

    let missing = cmd
        .find_by_json(
            &json!({ "external_user_id": "nobody", "user_data": { "name": "jane" } }),
            MatchMode::All,
            false,
        )
        .await?;
    assert!(missing.is_none());

    Ok(())
}

#[tokio::test]
async fn test_find_skips_deleted() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);
    let john = helpers::create_user(&cmd, "john").await?;

    cmd.delete(&john.id).await?;

    assert!(cmd.find_by_id(&john.id, false).await?.is_none());

    let user = cmd.find_by_id(&john.id, true).await?.unwrap();
    assert!(user.is_deleted());

    // OR filters still exclude deleted users
    let user = cmd
        .find_by_json(
            &json!({ "id": &john.id, "external_user_id": "ext-john" }),
            MatchMode::Any,
            false,
        )
        .await?;
    assert!(user.is_none());

    Ok(())
}

#[tokio::test]
async fn test_find_rejects_unknown_fields() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = helpers::command(state);

    let err = cmd
        .find_by_json(&json!({ "password": "x" }), MatchMode::All, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validate(_)));

    let err = cmd.find(&Predicate::all(), false).await.unwrap_err();
    assert!(matches!(err, Error::Validate(_)));

    Ok(())
}
