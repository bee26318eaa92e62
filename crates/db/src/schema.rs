use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, SqliteQueryBuilder, Table, TableCreateStatement,
};
use sqlx::SqlitePool;

use crate::table::{Roles, UserData, Users};

fn create_roles_table_statement() -> TableCreateStatement {
    Table::create()
        .table(Roles::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Roles::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Roles::Name)
                .string()
                .not_null()
                .string_len(50)
                .unique_key(),
        )
        .col(
            ColumnDef::new(Roles::Access)
                .integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Roles::Permissions).text())
        .col(ColumnDef::new(Roles::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(Roles::UpdatedAt).big_integer().not_null())
        .to_owned()
}

fn create_users_table_statement() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .string()
                .not_null()
                .string_len(36)
                .primary_key(),
        )
        .col(ColumnDef::new(Users::ExternalUserId).string().string_len(100))
        .col(ColumnDef::new(Users::ExternalAccessToken).text())
        .col(ColumnDef::new(Users::RefreshToken).text())
        .col(ColumnDef::new(Users::RoleId).string().string_len(26))
        .col(
            ColumnDef::new(Users::Status)
                .integer()
                .not_null()
                .default(1),
        )
        .col(ColumnDef::new(Users::LastLogin).big_integer())
        .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
        .col(ColumnDef::new(Users::DeletedAt).big_integer())
        .to_owned()
}

fn create_user_data_table_statement() -> TableCreateStatement {
    Table::create()
        .table(UserData::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(UserData::Id)
                .string()
                .not_null()
                .string_len(36)
                .primary_key(),
        )
        .col(
            ColumnDef::new(UserData::UserId)
                .string()
                .not_null()
                .string_len(36)
                .unique_key(),
        )
        .col(ColumnDef::new(UserData::Email).string().string_len(50))
        .col(ColumnDef::new(UserData::Name).string().string_len(50))
        .col(ColumnDef::new(UserData::Profile).text())
        .col(ColumnDef::new(UserData::Phone).string().string_len(100))
        .col(ColumnDef::new(UserData::DeletedAt).big_integer())
        .foreign_key(
            ForeignKey::create()
                .name("fk_user_data_user_id")
                .from(UserData::Table, UserData::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

/// Creates the `roles`, `users` and `user_data` tables when they are missing.
///
/// This only bootstraps an empty database; schema evolution is handled
/// outside this workspace.
pub async fn create_tables(pool: &SqlitePool) -> anyhow::Result<()> {
    for statement in [
        create_roles_table_statement(),
        create_users_table_statement(),
        create_user_data_table_statement(),
    ] {
        let sql = statement.to_string(SqliteQueryBuilder);
        sqlx::query(&sql).execute(pool).await?;
    }

    tracing::debug!("user tables ready");

    Ok(())
}
