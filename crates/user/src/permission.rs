use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use strum::{AsRefStr, Display, EnumString, VariantArray};
use userhub_shared::{Result, invalid};

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Export,
}

/// Structured permissions of a role: module name to allowed actions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Permissions(BTreeMap<String, BTreeSet<Action>>);

impl Permissions {
    pub fn grant(mut self, module: impl Into<String>, actions: &[Action]) -> Self {
        self.0
            .entry(module.into())
            .or_default()
            .extend(actions.iter().copied());
        self
    }

    pub fn allows(&self, module: &str, action: Action) -> bool {
        self.0
            .get(module)
            .is_some_and(|actions| actions.contains(&action))
    }

    pub fn modules(&self) -> impl Iterator<Item = (&str, &BTreeSet<Action>)> {
        self.0.iter().map(|(module, actions)| (module.as_str(), actions))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shape of the permissions embedded in issued tokens.
pub type TokenPermissions = BTreeMap<String, Vec<String>>;

/// Converts the persisted permission blob of a role.
pub trait PermissionCodec: Send + Sync {
    fn decode(&self, stored: Option<&str>) -> Result<Permissions>;

    fn encode(&self, permissions: &Permissions) -> String;

    fn encode_for_token(&self, permissions: &Permissions) -> TokenPermissions;
}

/// Stores permissions as a JSON object of module name to action list,
/// e.g. `{"user": ["read", "update"]}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPermissionCodec;

impl PermissionCodec for JsonPermissionCodec {
    fn encode(&self, permissions: &Permissions) -> String {
        Value::Object(
            self.encode_for_token(permissions)
                .into_iter()
                .map(|(module, actions)| {
                    (
                        module,
                        Value::Array(actions.into_iter().map(Value::String).collect()),
                    )
                })
                .collect(),
        )
        .to_string()
    }

    fn decode(&self, stored: Option<&str>) -> Result<Permissions> {
        let Some(stored) = stored.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Permissions::default());
        };

        let value: Value = match serde_json::from_str(stored) {
            Ok(value) => value,
            Err(err) => invalid!("role permissions are not valid JSON: {err}"),
        };

        let map = match value {
            Value::Null => return Ok(Permissions::default()),
            Value::Object(map) => map,
            other => invalid!("role permissions must be an object, got {other}"),
        };

        let mut permissions = Permissions::default();
        for (module, actions) in map {
            let Value::Array(actions) = actions else {
                invalid!("permissions of `{module}` must be a list");
            };

            let mut parsed = Vec::with_capacity(actions.len());
            for action in actions {
                let Some(name) = action.as_str() else {
                    invalid!("permission of `{module}` must be a string, got {action}");
                };
                match name.parse::<Action>() {
                    Ok(action) => parsed.push(action),
                    Err(_) => invalid!("unknown permission `{name}` on `{module}`"),
                }
            }

            permissions = permissions.grant(module, &parsed);
        }

        Ok(permissions)
    }

    fn encode_for_token(&self, permissions: &Permissions) -> TokenPermissions {
        permissions
            .modules()
            .map(|(module, actions)| {
                (
                    module.to_owned(),
                    actions.iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect()
    }
}
