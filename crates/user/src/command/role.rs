use userhub_shared::{Result, conflict, not_found, user::AccessType};
use validator::Validate;

use crate::{
    permission::Permissions,
    repository,
    role::{self, RoleRow},
    types::Role,
};

#[derive(Validate, Debug, Clone)]
pub struct NewRole {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub access: AccessType,
    pub permissions: Permissions,
}

impl super::Command {
    pub async fn create_role(&self, input: NewRole) -> Result<Role> {
        input.validate()?;

        if role::find_by_name(&self.read_db, &input.name).await?.is_some() {
            conflict!("Role `{}` already exists", input.name);
        }

        let now = repository::now();
        let row = RoleRow {
            id: repository::new_id(),
            name: input.name,
            access: input.access.code(),
            permissions: Some(self.codec.encode(&input.permissions)),
            created_at: now,
            updated_at: now,
        };

        role::insert(&self.write_db, &row).await?;

        row.into_role(self.codec.as_ref())
    }

    /// The role assigned to every newly created user.
    pub async fn default_role(&self) -> Result<Role> {
        match role::find_by_name(&self.read_db, &self.default_role).await? {
            Some(row) => row.into_role(self.codec.as_ref()),
            None => not_found!("Default role `{}` not found", self.default_role),
        }
    }
}
