use futures::future::BoxFuture;
use sqlx::{SqliteConnection, SqlitePool};
use userhub_shared::Result;

/// Runs `operation` inside a transaction on a dedicated connection.
///
/// Commits when the operation succeeds and rolls back when it fails. A failed
/// rollback is logged and the operation's own error is returned.
///
/// ```ignore
/// let id = id.to_owned();
/// transaction::scoped(&pool, move |conn| {
///     Box::pin(async move { cascade::restore(conn, &id).await })
/// })
/// .await?;
/// ```
pub async fn scoped<T, F>(pool: &SqlitePool, operation: F) -> Result<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T>> + Send,
{
    let mut tx = pool.begin().await?;
    let outcome = operation(&mut *tx).await;

    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(error = %rollback, "failed to roll back transaction");
            }

            Err(err)
        }
    }
}
