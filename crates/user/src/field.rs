use std::collections::BTreeMap;

use serde_json::Value;
use userhub_shared::{Result, invalid};

/// Flat key/value payload as received from the caller.
pub type Payload = serde_json::Map<String, Value>;

/// Static registration of the payload fields a table accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub foreign_key: Option<&'static str>,
}

pub const USERS: TableSpec = TableSpec {
    name: "users",
    fields: &[
        "external_user_id",
        "external_access_token",
        "refresh_token",
        "role_id",
        "status",
        "last_login",
    ],
    foreign_key: None,
};

pub const USER_DATA: TableSpec = TableSpec {
    name: "user_data",
    fields: &["email", "name", "profile", "phone"],
    foreign_key: Some("user_id"),
};

/// Tables making up the user aggregate, core first.
pub const AGGREGATE: [TableSpec; 2] = [USERS, USER_DATA];

/// Per-table slices of a payload produced by [`split`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TableValues(BTreeMap<&'static str, Payload>);

impl TableValues {
    pub fn get(&self, table: &TableSpec) -> Option<&Payload> {
        self.0.get(table.name)
    }

    /// Removes the slice for `table`, empty when the payload had nothing for it.
    pub fn take(&mut self, table: &TableSpec) -> Payload {
        self.0.remove(table.name).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Splits `payload` into the fields each table owns.
///
/// Keys missing from a table's ownership list are dropped. Tables that end up
/// with no value are left out. When `backfill` is given, a table with a
/// foreign key that received at least one field gets the key set to it.
pub fn split(payload: &Payload, tables: &[TableSpec], backfill: Option<&str>) -> TableValues {
    let mut values = BTreeMap::new();

    for table in tables {
        let mut owned = Payload::new();
        for field in table.fields {
            if let Some(value) = payload.get(*field) {
                owned.insert((*field).to_owned(), value.clone());
            }
        }

        if owned.is_empty() {
            continue;
        }

        if let (Some(foreign_key), Some(id)) = (table.foreign_key, backfill) {
            owned
                .entry(foreign_key)
                .or_insert_with(|| Value::String(id.to_owned()));
        }

        values.insert(table.name, owned);
    }

    TableValues(values)
}

pub(crate) fn opt_string(field: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value.to_owned())),
        other => invalid!("field `{field}` expects a string, got {other}"),
    }
}

pub(crate) fn string(field: &str, value: &Value) -> Result<String> {
    match opt_string(field, value)? {
        Some(value) => Ok(value),
        None => invalid!("field `{field}` cannot be null"),
    }
}

pub(crate) fn opt_i64(field: &str, value: &Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => match number.as_i64() {
            Some(value) => Ok(Some(value)),
            None => invalid!("field `{field}` expects an integer, got {number}"),
        },
        other => invalid!("field `{field}` expects an integer, got {other}"),
    }
}
