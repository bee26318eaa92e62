use sea_query::{Condition, Expr, ExprTrait};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use userhub_db::table::{Roles, UserData, Users};
use userhub_shared::{Result, invalid};

/// How the conditions of a [`Predicate`] are joined.
#[derive(EnumString, Display, AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum MatchMode {
    #[default]
    #[strum(serialize = "AND")]
    All,
    #[strum(serialize = "OR")]
    Any,
}

/// Table a filter key is qualified with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Qualifier {
    Users,
    UserData,
    Role,
}

impl Qualifier {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "users" | "user" => Some(Qualifier::Users),
            "user_data" => Some(Qualifier::UserData),
            "role" | "roles" => Some(Qualifier::Role),
            _ => None,
        }
    }
}

/// Every column of the joined aggregate a lookup may filter on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Id,
    ExternalUserId,
    ExternalAccessToken,
    RefreshToken,
    RoleId,
    Status,
    LastLogin,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    DataId,
    DataUserId,
    Email,
    Name,
    Profile,
    Phone,
    DataDeletedAt,
    RoleName,
    RoleAccess,
}

const FIELDS: &[(Qualifier, &str, Field)] = &[
    (Qualifier::Users, "id", Field::Id),
    (Qualifier::Users, "external_user_id", Field::ExternalUserId),
    (Qualifier::Users, "external_access_token", Field::ExternalAccessToken),
    (Qualifier::Users, "refresh_token", Field::RefreshToken),
    (Qualifier::Users, "role_id", Field::RoleId),
    (Qualifier::Users, "status", Field::Status),
    (Qualifier::Users, "last_login", Field::LastLogin),
    (Qualifier::Users, "created_at", Field::CreatedAt),
    (Qualifier::Users, "updated_at", Field::UpdatedAt),
    (Qualifier::Users, "deleted_at", Field::DeletedAt),
    (Qualifier::UserData, "id", Field::DataId),
    (Qualifier::UserData, "user_id", Field::DataUserId),
    (Qualifier::UserData, "email", Field::Email),
    (Qualifier::UserData, "name", Field::Name),
    (Qualifier::UserData, "profile", Field::Profile),
    (Qualifier::UserData, "phone", Field::Phone),
    (Qualifier::UserData, "deleted_at", Field::DataDeletedAt),
    (Qualifier::Role, "name", Field::RoleName),
    (Qualifier::Role, "access", Field::RoleAccess),
];

impl Field {
    /// Resolves a filter key such as `email`, `user_data.email` or `role.name`.
    ///
    /// Unqualified keys belong to the `users` table.
    pub fn parse(path: &str) -> Result<Self> {
        let (qualifier, column) = match path.split_once('.') {
            Some((prefix, column)) => match Qualifier::from_prefix(prefix) {
                Some(qualifier) => (qualifier, column),
                None => invalid!("unknown filter table `{prefix}` in `{path}`"),
            },
            None => (Qualifier::Users, path),
        };

        match FIELDS
            .iter()
            .find(|(q, name, _)| *q == qualifier && *name == column)
        {
            Some((_, _, field)) => Ok(*field),
            None => invalid!("unknown filter field `{path}`"),
        }
    }

    fn expr(self) -> Expr {
        match self {
            Field::Id => Expr::col((Users::Table, Users::Id)),
            Field::ExternalUserId => Expr::col((Users::Table, Users::ExternalUserId)),
            Field::ExternalAccessToken => Expr::col((Users::Table, Users::ExternalAccessToken)),
            Field::RefreshToken => Expr::col((Users::Table, Users::RefreshToken)),
            Field::RoleId => Expr::col((Users::Table, Users::RoleId)),
            Field::Status => Expr::col((Users::Table, Users::Status)),
            Field::LastLogin => Expr::col((Users::Table, Users::LastLogin)),
            Field::CreatedAt => Expr::col((Users::Table, Users::CreatedAt)),
            Field::UpdatedAt => Expr::col((Users::Table, Users::UpdatedAt)),
            Field::DeletedAt => Expr::col((Users::Table, Users::DeletedAt)),
            Field::DataId => Expr::col((UserData::Table, UserData::Id)),
            Field::DataUserId => Expr::col((UserData::Table, UserData::UserId)),
            Field::Email => Expr::col((UserData::Table, UserData::Email)),
            Field::Name => Expr::col((UserData::Table, UserData::Name)),
            Field::Profile => Expr::col((UserData::Table, UserData::Profile)),
            Field::Phone => Expr::col((UserData::Table, UserData::Phone)),
            Field::DataDeletedAt => Expr::col((UserData::Table, UserData::DeletedAt)),
            Field::RoleName => Expr::col((Roles::Table, Roles::Name)),
            Field::RoleAccess => Expr::col((Roles::Table, Roles::Access)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Eq(sea_query::Value),
    In(Vec<sea_query::Value>),
    IsNull,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: Field,
    pub op: Op,
}

/// Typed lookup over the user aggregate.
///
/// ```ignore
/// let by_email = Predicate::all().eq(Field::Email, "a@b.com");
/// let by_any_id = Predicate::any().is_in(Field::Id, ["a", "b"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Predicate {
    mode: MatchMode,
    filters: Vec<Filter>,
}

impl Predicate {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            filters: vec![],
        }
    }

    pub fn all() -> Self {
        Self::new(MatchMode::All)
    }

    pub fn any() -> Self {
        Self::new(MatchMode::Any)
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::all().eq(Field::Id, id.into())
    }

    pub fn eq(mut self, field: Field, value: impl Into<sea_query::Value>) -> Self {
        self.filters.push(Filter {
            field,
            op: Op::Eq(value.into()),
        });
        self
    }

    pub fn is_in<V: Into<sea_query::Value>>(
        mut self,
        field: Field,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter {
            field,
            op: Op::In(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn is_null(mut self, field: Field) -> Self {
        self.filters.push(Filter {
            field,
            op: Op::IsNull,
        });
        self
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Builds a predicate from a nested JSON mapping.
    ///
    /// Scalars compare with `=`, arrays with `IN`, `null` with `IS NULL`.
    /// Nested objects qualify their keys with the parent key, so
    /// `{"user_data": {"email": "a@b.com"}}` filters on `user_data.email`.
    pub fn from_json(value: &Value, mode: MatchMode) -> Result<Self> {
        let Value::Object(map) = value else {
            invalid!("filter must be an object, got {value}");
        };

        let mut predicate = Self::new(mode);
        predicate.push_object(map, None)?;

        if predicate.filters.is_empty() {
            invalid!("filter must contain at least one condition");
        }

        Ok(predicate)
    }

    fn push_object(
        &mut self,
        map: &serde_json::Map<String, Value>,
        prefix: Option<&str>,
    ) -> Result<()> {
        for (key, value) in map {
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{key}"),
                None => key.to_owned(),
            };

            match value {
                Value::Object(nested) => self.push_object(nested, Some(&path))?,
                Value::Null => {
                    let field = Field::parse(&path)?;
                    self.filters.push(Filter {
                        field,
                        op: Op::IsNull,
                    });
                }
                Value::Array(items) => {
                    let field = Field::parse(&path)?;
                    let values = items
                        .iter()
                        .map(|item| scalar(&path, item))
                        .collect::<Result<Vec<_>>>()?;
                    self.filters.push(Filter {
                        field,
                        op: Op::In(values),
                    });
                }
                scalar_value => {
                    let field = Field::parse(&path)?;
                    self.filters.push(Filter {
                        field,
                        op: Op::Eq(scalar(&path, scalar_value)?),
                    });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn condition(&self) -> Condition {
        let mut condition = match self.mode {
            MatchMode::All => Condition::all(),
            MatchMode::Any => Condition::any(),
        };

        for filter in &self.filters {
            let column = filter.field.expr();
            condition = condition.add(match &filter.op {
                Op::Eq(value) => column.eq(value.clone()),
                Op::In(values) => column.is_in(values.clone()),
                Op::IsNull => column.is_null(),
            });
        }

        condition
    }
}

fn scalar(path: &str, value: &Value) -> Result<sea_query::Value> {
    match value {
        Value::String(value) => Ok(value.to_owned().into()),
        Value::Bool(value) => Ok((*value).into()),
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(value.into())
            } else if let Some(value) = number.as_f64() {
                Ok(value.into())
            } else {
                invalid!("unsupported number {number} for `{path}`")
            }
        }
        other => invalid!("unsupported value {other} for `{path}`"),
    }
}
