use time::OffsetDateTime;
use userhub_shared::user::{AccessType, Status};

use crate::permission::Permissions;

/// The user aggregate: core record plus its role and profile extension.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub external_user_id: Option<String>,
    pub external_access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role_id: Option<String>,
    pub status: Status,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
    pub role: Option<Role>,
    pub user_data: Option<UserData>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn email(&self) -> Option<&str> {
        self.user_data.as_ref()?.email.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.user_data.as_ref()?.name.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserData {
    pub id: String,
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub profile: Option<String>,
    pub phone: Option<String>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub access: AccessType,
    pub permissions: Permissions,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
