use anyhow::Context;
use clap::Subcommand;
use serde_json::{Value, json};
use userhub_user::{User, field::Payload};

#[derive(Subcommand)]
pub enum UserCommands {
    /// Print a user with its role and profile
    Show {
        id: String,

        /// Also look at soft-deleted users
        #[arg(long)]
        include_deleted: bool,
    },
    /// Set fields on a user, each written to the table that owns it
    Patch {
        id: String,

        /// key=value; `null` clears a field, status and last_login values are
        /// parsed as JSON, every other value is kept as a string
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        set: Vec<(String, Value)>,
    },
    /// Delete a user with the configured policy
    Delete { id: String },
    /// Bring back a soft-deleted user
    Restore { id: String },
    /// Issue an access/refresh token pair
    Token { id: String },
}

fn parse_assignment(input: &str) -> Result<(String, Value), String> {
    let Some((key, value)) = input.split_once('=') else {
        return Err(format!("expected key=value, got `{input}`"));
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{input}`"));
    }

    let value = match (key, value) {
        (_, "null") => Value::Null,
        ("status" | "last_login", value) => {
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
        }
        (_, value) => Value::String(value.to_string()),
    };

    Ok((key.to_string(), value))
}

pub async fn run(config: userhub::Config, command: UserCommands) -> anyhow::Result<()> {
    let state =
        userhub::create_state(&config.database.url, config.database.max_connections).await?;
    let cmd = userhub::create_command(&config, state)?;

    match command {
        UserCommands::Show {
            id,
            include_deleted,
        } => {
            let Some(user) = cmd.find_by_id(&id, include_deleted).await? else {
                anyhow::bail!("user {id} not found");
            };
            print(&user_json(&user))?;
        }
        UserCommands::Patch { id, set } => {
            let updates: Payload = set.into_iter().collect();
            let user = cmd.patch(&id, updates).await?;
            print(&user_json(&user))?;
        }
        UserCommands::Delete { id } => {
            cmd.delete(&id).await?;
            tracing::info!("user {id} deleted");
        }
        UserCommands::Restore { id } => {
            let user = cmd.restore(&id).await?;
            print(&user_json(&user))?;
        }
        UserCommands::Token { id } => {
            let Some(user) = cmd.find_by_id(&id, false).await? else {
                anyhow::bail!("user {id} not found");
            };
            let tokens = cmd.issue_tokens(&user).await?;
            print(&json!({
                "access_token": tokens.access_token,
                "refresh_token": tokens.refresh_token,
                "expires_in": tokens.expires_in,
                "metadata": tokens.metadata,
            }))?;
        }
    }

    Ok(())
}

fn print(value: &Value) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to render output")?
    );

    Ok(())
}

fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "external_user_id": user.external_user_id,
        "status": user.status,
        "role": user.role.as_ref().map(|role| json!({
            "id": role.id,
            "name": role.name,
            "access": role.access,
        })),
        "user_data": user.user_data.as_ref().map(|data| json!({
            "id": data.id,
            "email": data.email,
            "name": data.name,
            "profile": data.profile,
            "phone": data.phone,
            "deleted_at": data.deleted_at.map(|at| at.unix_timestamp()),
        })),
        "last_login": user.last_login.map(|at| at.unix_timestamp()),
        "created_at": user.created_at.unix_timestamp(),
        "updated_at": user.updated_at.unix_timestamp(),
        "deleted_at": user.deleted_at.map(|at| at.unix_timestamp()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("status=2").unwrap(),
            ("status".to_string(), json!(2))
        );
        assert_eq!(
            parse_assignment("name=John Doe").unwrap(),
            ("name".to_string(), json!("John Doe"))
        );
        assert_eq!(
            parse_assignment("phone=null").unwrap(),
            ("phone".to_string(), Value::Null)
        );
        assert_eq!(
            parse_assignment("phone=628123").unwrap(),
            ("phone".to_string(), json!("628123"))
        );
        assert_eq!(
            parse_assignment("status=suspended").unwrap(),
            ("status".to_string(), json!("suspended"))
        );
        assert!(parse_assignment("status").is_err());
        assert!(parse_assignment("=2").is_err());
    }
}
