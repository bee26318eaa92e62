use sea_query::{Alias, Condition, Expr, ExprTrait, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde_json::Value;
use sqlx::{SqliteConnection, SqliteExecutor, prelude::FromRow};
use time::OffsetDateTime;
use userhub_db::table::{Roles, UserData, Users};
use userhub_shared::{
    Error, Result, invalid, not_found,
    user::{AccessType, Status},
};

use crate::{
    field::{self, Payload},
    filter::Predicate,
    permission::PermissionCodec,
    picture::PathResolver,
    types::{self, User},
};

pub(crate) fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

pub(crate) fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

pub(crate) fn datetime(timestamp: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(timestamp).map_err(|err| Error::Unknown(err.into()))
}

const USER_COLUMNS: [Users; 10] = [
    Users::Id,
    Users::ExternalUserId,
    Users::ExternalAccessToken,
    Users::RefreshToken,
    Users::RoleId,
    Users::Status,
    Users::LastLogin,
    Users::CreatedAt,
    Users::UpdatedAt,
    Users::DeletedAt,
];

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub external_user_id: Option<String>,
    pub external_access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role_id: Option<String>,
    pub status: i64,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl UserRow {
    pub fn new(id: String) -> Self {
        let now = now();

        Self {
            id,
            external_user_id: None,
            external_access_token: None,
            refresh_token: None,
            role_id: None,
            status: Status::Active.code(),
            last_login: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Writes the fields of `values` onto the row. Only `users` columns are accepted.
    pub fn apply(&mut self, values: &Payload) -> Result<()> {
        for (name, value) in values {
            match name.as_str() {
                "external_user_id" => self.external_user_id = field::opt_string(name, value)?,
                "external_access_token" => {
                    self.external_access_token = field::opt_string(name, value)?
                }
                "refresh_token" => self.refresh_token = field::opt_string(name, value)?,
                "role_id" => self.role_id = field::opt_string(name, value)?,
                "status" => self.status = status(value)?.code(),
                "last_login" => self.last_login = field::opt_i64(name, value)?,
                other => invalid!("field `{other}` is not owned by users"),
            }
        }

        Ok(())
    }
}

fn status(value: &Value) -> Result<Status> {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(code) => Status::try_from(code),
            None => invalid!("unknown user status {number}"),
        },
        Value::String(name) => name
            .parse::<Status>()
            .map_err(|_| Error::Validate(format!("unknown user status `{name}`"))),
        other => invalid!("field `status` expects a status code, got {other}"),
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct UserDataRow {
    pub id: String,
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub profile: Option<String>,
    pub phone: Option<String>,
    pub deleted_at: Option<i64>,
}

impl UserDataRow {
    pub fn new(user_id: String) -> Self {
        Self {
            id: new_id(),
            user_id,
            email: None,
            name: None,
            profile: None,
            phone: None,
            deleted_at: None,
        }
    }

    /// Writes the fields of `values` onto the row. Only `user_data` columns are accepted.
    pub fn apply(&mut self, values: &Payload) -> Result<()> {
        for (name, value) in values {
            match name.as_str() {
                "user_id" => self.user_id = field::string(name, value)?,
                "email" => self.email = field::opt_string(name, value)?,
                "name" => self.name = field::opt_string(name, value)?,
                "profile" => self.profile = field::opt_string(name, value)?,
                "phone" => self.phone = field::opt_string(name, value)?,
                other => invalid!("field `{other}` is not owned by user_data"),
            }
        }

        Ok(())
    }
}

pub(crate) async fn find_user(
    conn: &mut SqliteConnection,
    id: &str,
    include_deleted: bool,
) -> Result<Option<UserRow>> {
    let mut statement = Query::select()
        .columns(USER_COLUMNS)
        .from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(id))
        .limit(1)
        .to_owned();

    if !include_deleted {
        statement.and_where(Expr::col(Users::DeletedAt).is_null());
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?)
}

pub(crate) async fn find_user_data(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<UserDataRow>> {
    let statement = Query::select()
        .columns([
            UserData::Id,
            UserData::UserId,
            UserData::Email,
            UserData::Name,
            UserData::Profile,
            UserData::Phone,
            UserData::DeletedAt,
        ])
        .from(UserData::Table)
        .and_where(Expr::col(UserData::UserId).eq(user_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserDataRow, _>(&sql, values)
        .fetch_optional(&mut *conn)
        .await?)
}

async fn insert_user(conn: &mut SqliteConnection, row: &UserRow) -> Result<()> {
    let statement = Query::insert()
        .into_table(Users::Table)
        .columns(USER_COLUMNS)
        .values_panic([
            row.id.to_owned().into(),
            row.external_user_id.to_owned().into(),
            row.external_access_token.to_owned().into(),
            row.refresh_token.to_owned().into(),
            row.role_id.to_owned().into(),
            row.status.into(),
            row.last_login.into(),
            row.created_at.into(),
            row.updated_at.into(),
            row.deleted_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

/// Rewrites every owned column of the core row and refreshes `updated_at`.
async fn save_user(conn: &mut SqliteConnection, row: &mut UserRow) -> Result<()> {
    row.updated_at = now();

    let statement = Query::update()
        .table(Users::Table)
        .values([
            (Users::ExternalUserId, row.external_user_id.to_owned().into()),
            (
                Users::ExternalAccessToken,
                row.external_access_token.to_owned().into(),
            ),
            (Users::RefreshToken, row.refresh_token.to_owned().into()),
            (Users::RoleId, row.role_id.to_owned().into()),
            (Users::Status, row.status.into()),
            (Users::LastLogin, row.last_login.into()),
            (Users::UpdatedAt, row.updated_at.into()),
        ])
        .and_where(Expr::col(Users::Id).eq(row.id.to_owned()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

async fn save_user_data(conn: &mut SqliteConnection, row: &UserDataRow) -> Result<()> {
    let statement = Query::insert()
        .into_table(UserData::Table)
        .columns([
            UserData::Id,
            UserData::UserId,
            UserData::Email,
            UserData::Name,
            UserData::Profile,
            UserData::Phone,
            UserData::DeletedAt,
        ])
        .values_panic([
            row.id.to_owned().into(),
            row.user_id.to_owned().into(),
            row.email.to_owned().into(),
            row.name.to_owned().into(),
            row.profile.to_owned().into(),
            row.phone.to_owned().into(),
            row.deleted_at.into(),
        ])
        .on_conflict(
            OnConflict::column(UserData::Id)
                .update_columns([
                    UserData::Email,
                    UserData::Name,
                    UserData::Profile,
                    UserData::Phone,
                ])
                .to_owned(),
        )
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

/// Inserts the core row, then the extension row when `extension` is not empty.
///
/// `extension` is expected to carry the foreign key already (see
/// [`field::split`] with a backfill id).
pub(crate) async fn create(
    conn: &mut SqliteConnection,
    id: String,
    core: &Payload,
    extension: &Payload,
) -> Result<()> {
    let mut user = UserRow::new(id.to_owned());
    user.apply(core)?;
    insert_user(conn, &user).await?;

    if !extension.is_empty() {
        let mut data = UserDataRow::new(id);
        data.apply(extension)?;
        save_user_data(conn, &data).await?;
    }

    Ok(())
}

/// Applies both field sets onto an active aggregate.
///
/// The extension row is only touched when `extension` has fields; it is
/// created on the fly when the user has none yet.
pub(crate) async fn replace_fields(
    conn: &mut SqliteConnection,
    id: &str,
    core: &Payload,
    extension: &Payload,
) -> Result<()> {
    let Some(mut user) = find_user(conn, id, false).await? else {
        not_found!("User not found with id {id}");
    };

    user.apply(core)?;

    if !extension.is_empty() {
        let mut data = match find_user_data(conn, id).await? {
            Some(data) => data,
            None => UserDataRow::new(id.to_owned()),
        };
        data.apply(extension)?;
        save_user_data(conn, &data).await?;
    }

    save_user(conn, &mut user).await?;

    Ok(())
}

pub(crate) async fn soft_delete_user(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    let statement = Query::update()
        .table(Users::Table)
        .values([(Users::DeletedAt, now().into())])
        .and_where(Expr::col(Users::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

pub(crate) async fn remove_user(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    let statement = Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

/// Clears `deleted_at` without rewriting the rest of the row.
pub(crate) async fn clear_deleted_at(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    let statement = Query::update()
        .table(Users::Table)
        .values([(Users::DeletedAt, Option::<i64>::None.into())])
        .and_where(Expr::col(Users::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

/// Removes the core row only when both credentials still match it.
pub(crate) async fn remove_by_credentials<'e>(
    executor: impl SqliteExecutor<'e>,
    id: &str,
    access_token: &str,
    refresh_token: &str,
) -> Result<u64> {
    let statement = Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Id).eq(id))
        .and_where(Expr::col(Users::ExternalAccessToken).eq(access_token))
        .and_where(Expr::col(Users::RefreshToken).eq(refresh_token))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(result.rows_affected())
}

#[derive(Debug, FromRow)]
pub(crate) struct AggregateRow {
    #[sqlx(flatten)]
    pub user: UserRow,
    pub data_id: Option<String>,
    pub data_user_id: Option<String>,
    pub data_email: Option<String>,
    pub data_name: Option<String>,
    pub data_profile: Option<String>,
    pub data_phone: Option<String>,
    pub data_deleted_at: Option<i64>,
    pub joined_role_id: Option<String>,
    pub role_name: Option<String>,
    pub role_access: Option<i64>,
    pub role_permissions: Option<String>,
    pub role_created_at: Option<i64>,
    pub role_updated_at: Option<i64>,
}

impl AggregateRow {
    pub fn into_user(self, codec: &dyn PermissionCodec, paths: &dyn PathResolver) -> Result<User> {
        let user_data = match (self.data_id, self.data_user_id) {
            (Some(id), Some(user_id)) => Some(types::UserData {
                id,
                user_id,
                email: self.data_email,
                name: self.data_name,
                profile: paths.resolve(self.data_profile.as_deref()),
                phone: self.data_phone,
                deleted_at: self.data_deleted_at.map(datetime).transpose()?,
            }),
            _ => None,
        };

        let role = match (self.joined_role_id, self.role_name) {
            (Some(id), Some(name)) => Some(types::Role {
                id,
                name,
                access: AccessType::try_from(self.role_access.unwrap_or_default())?,
                permissions: codec.decode(self.role_permissions.as_deref())?,
                created_at: datetime(self.role_created_at.unwrap_or_default())?,
                updated_at: datetime(self.role_updated_at.unwrap_or_default())?,
            }),
            _ => None,
        };

        let row = self.user;

        Ok(User {
            id: row.id,
            external_user_id: row.external_user_id,
            external_access_token: row.external_access_token,
            refresh_token: row.refresh_token,
            role_id: row.role_id,
            status: Status::try_from(row.status)?,
            last_login: row.last_login.map(datetime).transpose()?,
            created_at: datetime(row.created_at)?,
            updated_at: datetime(row.updated_at)?,
            deleted_at: row.deleted_at.map(datetime).transpose()?,
            role,
            user_data,
        })
    }
}

/// Loads the first aggregate matching `predicate`, role and profile joined.
pub(crate) async fn find_aggregate<'e>(
    executor: impl SqliteExecutor<'e>,
    predicate: &Predicate,
    include_deleted: bool,
) -> Result<Option<AggregateRow>> {
    if predicate.filters().is_empty() {
        invalid!("filter must contain at least one condition");
    }

    let mut condition = Condition::all().add(predicate.condition());
    if !include_deleted {
        condition = condition.add(Expr::col((Users::Table, Users::DeletedAt)).is_null());
    }

    let statement = Query::select()
        .columns(USER_COLUMNS.map(|column| (Users::Table, column)))
        .expr_as(
            Expr::col((UserData::Table, UserData::Id)),
            Alias::new("data_id"),
        )
        .expr_as(
            Expr::col((UserData::Table, UserData::UserId)),
            Alias::new("data_user_id"),
        )
        .expr_as(
            Expr::col((UserData::Table, UserData::Email)),
            Alias::new("data_email"),
        )
        .expr_as(
            Expr::col((UserData::Table, UserData::Name)),
            Alias::new("data_name"),
        )
        .expr_as(
            Expr::col((UserData::Table, UserData::Profile)),
            Alias::new("data_profile"),
        )
        .expr_as(
            Expr::col((UserData::Table, UserData::Phone)),
            Alias::new("data_phone"),
        )
        .expr_as(
            Expr::col((UserData::Table, UserData::DeletedAt)),
            Alias::new("data_deleted_at"),
        )
        .expr_as(
            Expr::col((Roles::Table, Roles::Id)),
            Alias::new("joined_role_id"),
        )
        .expr_as(Expr::col((Roles::Table, Roles::Name)), Alias::new("role_name"))
        .expr_as(
            Expr::col((Roles::Table, Roles::Access)),
            Alias::new("role_access"),
        )
        .expr_as(
            Expr::col((Roles::Table, Roles::Permissions)),
            Alias::new("role_permissions"),
        )
        .expr_as(
            Expr::col((Roles::Table, Roles::CreatedAt)),
            Alias::new("role_created_at"),
        )
        .expr_as(
            Expr::col((Roles::Table, Roles::UpdatedAt)),
            Alias::new("role_updated_at"),
        )
        .from(Users::Table)
        .left_join(
            Roles::Table,
            Expr::col((Roles::Table, Roles::Id)).equals((Users::Table, Users::RoleId)),
        )
        .left_join(
            UserData::Table,
            Expr::col((UserData::Table, UserData::UserId)).equals((Users::Table, Users::Id)),
        )
        .cond_where(condition)
        .order_by((Users::Table, Users::CreatedAt), Order::Asc)
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, AggregateRow, _>(&sql, values)
        .fetch_optional(executor)
        .await?)
}
