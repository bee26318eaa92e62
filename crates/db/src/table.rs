use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
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
}

#[derive(Iden, Clone, Copy)]
pub enum UserData {
    Table,
    Id,
    UserId,
    Email,
    Name,
    Profile,
    Phone,
    DeletedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum Roles {
    Table,
    Id,
    Name,
    Access,
    Permissions,
    CreatedAt,
    UpdatedAt,
}
