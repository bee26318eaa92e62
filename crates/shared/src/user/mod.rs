use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::Error;

/// Lifecycle status persisted on the core user row as a small integer.
#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Inactive,
    #[default]
    Active,
    Suspended,
}

impl Status {
    pub fn code(self) -> i64 {
        match self {
            Status::Inactive => 0,
            Status::Active => 1,
            Status::Suspended => 2,
        }
    }
}

impl TryFrom<i64> for Status {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Inactive),
            1 => Ok(Status::Active),
            2 => Ok(Status::Suspended),
            other => Err(Error::Validate(format!("unknown user status code {other}"))),
        }
    }
}

/// Which client surface a role is allowed to sign in from.
#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    #[default]
    All,
    Mobile,
    Admin,
    Website,
}

impl AccessType {
    pub fn code(self) -> i64 {
        match self {
            AccessType::All => 0,
            AccessType::Mobile => 1,
            AccessType::Admin => 2,
            AccessType::Website => 3,
        }
    }
}

impl TryFrom<i64> for AccessType {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AccessType::All),
            1 => Ok(AccessType::Mobile),
            2 => Ok(AccessType::Admin),
            3 => Ok(AccessType::Website),
            other => Err(Error::Validate(format!("unknown access type code {other}"))),
        }
    }
}
