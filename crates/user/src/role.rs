use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteExecutor, prelude::FromRow};
use userhub_db::table::Roles;
use userhub_shared::{Result, user::AccessType};

use crate::{permission::PermissionCodec, repository::datetime, types::Role};

#[derive(Debug, Clone, FromRow)]
pub(crate) struct RoleRow {
    pub id: String,
    pub name: String,
    pub access: i64,
    pub permissions: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RoleRow {
    pub fn into_role(self, codec: &dyn PermissionCodec) -> Result<Role> {
        Ok(Role {
            id: self.id,
            name: self.name,
            access: AccessType::try_from(self.access)?,
            permissions: codec.decode(self.permissions.as_deref())?,
            created_at: datetime(self.created_at)?,
            updated_at: datetime(self.updated_at)?,
        })
    }
}

pub(crate) async fn find_by_name<'e>(
    executor: impl SqliteExecutor<'e>,
    name: &str,
) -> Result<Option<RoleRow>> {
    let statement = Query::select()
        .columns([
            Roles::Id,
            Roles::Name,
            Roles::Access,
            Roles::Permissions,
            Roles::CreatedAt,
            Roles::UpdatedAt,
        ])
        .from(Roles::Table)
        .and_where(Expr::col(Roles::Name).eq(name))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RoleRow, _>(&sql, values)
        .fetch_optional(executor)
        .await?)
}

pub(crate) async fn insert<'e>(executor: impl SqliteExecutor<'e>, row: &RoleRow) -> Result<()> {
    let statement = Query::insert()
        .into_table(Roles::Table)
        .columns([
            Roles::Id,
            Roles::Name,
            Roles::Access,
            Roles::Permissions,
            Roles::CreatedAt,
            Roles::UpdatedAt,
        ])
        .values_panic([
            row.id.to_owned().into(),
            row.name.to_owned().into(),
            row.access.into(),
            row.permissions.to_owned().into(),
            row.created_at.into(),
            row.updated_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(())
}
