use sea_query::{Alias, Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqliteConnection;
use userhub_shared::{Result, conflict, invalid, not_found};

use crate::repository;

/// How a user removal treats the core row and the rows that reference it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeletePolicy {
    soft_delete: bool,
    prevent_delete_if_used: bool,
    cascade: bool,
}

impl DeletePolicy {
    /// Refusing while referenced and cascading to the references exclude each other.
    pub fn new(soft_delete: bool, prevent_delete_if_used: bool, cascade: bool) -> Result<Self> {
        if prevent_delete_if_used && cascade {
            invalid!("delete policy cannot both prevent deletion when used and cascade");
        }

        Ok(Self {
            soft_delete,
            prevent_delete_if_used,
            cascade,
        })
    }

    pub const fn soft() -> Self {
        Self {
            soft_delete: true,
            prevent_delete_if_used: false,
            cascade: true,
        }
    }

    pub const fn hard() -> Self {
        Self {
            soft_delete: false,
            prevent_delete_if_used: false,
            cascade: true,
        }
    }

    pub fn soft_delete(&self) -> bool {
        self.soft_delete
    }

    pub fn prevent_delete_if_used(&self) -> bool {
        self.prevent_delete_if_used
    }

    pub fn cascade(&self) -> bool {
        self.cascade
    }
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self::soft()
    }
}

/// A table holding rows that reference `users.id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dependent {
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub deleted_at: Option<&'static str>,
}

pub const DEPENDENTS: &[Dependent] = &[Dependent {
    table: "user_data",
    foreign_key: "user_id",
    deleted_at: Some("deleted_at"),
}];

/// Removes a user according to `policy`. Meant to run inside [`crate::transaction::scoped`].
pub(crate) async fn delete(
    conn: &mut SqliteConnection,
    id: &str,
    policy: DeletePolicy,
) -> Result<()> {
    if repository::find_user(conn, id, !policy.soft_delete)
        .await?
        .is_none()
    {
        not_found!("User not found with id {id}");
    }

    if policy.prevent_delete_if_used {
        for dependent in DEPENDENTS {
            if is_referenced(conn, dependent, id).await? {
                conflict!(
                    "Cannot delete user cause still in use at: {}",
                    dependent.table
                );
            }
        }
    }

    if policy.cascade {
        for dependent in DEPENDENTS {
            match (policy.soft_delete, dependent.deleted_at) {
                (true, Some(column)) => soft_delete_dependent(conn, dependent, column, id).await?,
                (true, None) => {
                    tracing::warn!(
                        table = dependent.table,
                        "dependent has no soft delete column, left in place"
                    );
                }
                (false, _) => remove_dependent(conn, dependent, id).await?,
            }
        }
    }

    if policy.soft_delete {
        repository::soft_delete_user(conn, id).await?;
    } else {
        repository::remove_user(conn, id).await?;
    }

    tracing::info!(user_id = id, soft = policy.soft_delete, "user deleted");

    Ok(())
}

/// Clears the soft-delete mark of a user. Dependents stay as they are.
pub(crate) async fn restore(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    let Some(user) = repository::find_user(conn, id, true).await? else {
        not_found!("User not found with ID {id}");
    };

    if user.deleted_at.is_none() {
        conflict!("User with ID {id} is already active");
    }

    repository::clear_deleted_at(conn, id).await?;

    tracing::info!(user_id = id, "user restored");

    Ok(())
}

async fn is_referenced(
    conn: &mut SqliteConnection,
    dependent: &Dependent,
    id: &str,
) -> Result<bool> {
    let mut statement = Query::select()
        .column(Alias::new(dependent.foreign_key))
        .from(Alias::new(dependent.table))
        .and_where(Expr::col(Alias::new(dependent.foreign_key)).eq(id))
        .limit(1)
        .to_owned();

    if let Some(column) = dependent.deleted_at {
        statement.and_where(Expr::col(Alias::new(column)).is_null());
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_with(&sql, values)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.is_some())
}

async fn soft_delete_dependent(
    conn: &mut SqliteConnection,
    dependent: &Dependent,
    column: &'static str,
    id: &str,
) -> Result<()> {
    let statement = Query::update()
        .table(Alias::new(dependent.table))
        .values([(Alias::new(column), repository::now().into())])
        .and_where(Expr::col(Alias::new(dependent.foreign_key)).eq(id))
        .and_where(Expr::col(Alias::new(column)).is_null())
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

async fn remove_dependent(
    conn: &mut SqliteConnection,
    dependent: &Dependent,
    id: &str,
) -> Result<()> {
    let statement = Query::delete()
        .from_table(Alias::new(dependent.table))
        .and_where(Expr::col(Alias::new(dependent.foreign_key)).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prevent_and_cascade_are_exclusive() {
        assert!(DeletePolicy::new(true, true, true).is_err());
        assert!(DeletePolicy::new(false, true, false).is_ok());
        assert_eq!(DeletePolicy::default(), DeletePolicy::new(true, false, true).unwrap());
    }
}
