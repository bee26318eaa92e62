use anyhow::Result;
use clap::{Parser, Subcommand};
use userhub_shared::user::AccessType;
use userhub_user::{NewRole, permission::Permissions};

mod cli;

/// userhub - user accounts, profiles and tokens
#[derive(Parser)]
#[command(name = "userhub")]
#[command(about = "Manage user accounts, profiles and tokens", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tables and the default role when they are missing
    Init,
    /// Inspect and change users
    User {
        #[command(subcommand)]
        command: cli::user::UserCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = userhub::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    userhub::observability::init_observability(
        "userhub",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Init => init_command(config).await,
        Commands::User { command } => cli::user::run(config, command).await,
    }
}

#[tracing::instrument(skip(config))]
async fn init_command(config: userhub::Config) -> Result<()> {
    tracing::info!("Creating tables...");

    let pool = userhub::db::create_write_pool(&config.database.url).await?;
    userhub_db::create_tables(&pool).await?;
    pool.close().await;

    tracing::info!("Tables ready at {}", config.database.url);

    let state =
        userhub::create_state(&config.database.url, config.database.max_connections).await?;
    let cmd = userhub::create_command(&config, state)?;

    match cmd.default_role().await {
        Ok(role) => tracing::info!("Default role {} already exists", role.name),
        Err(userhub_shared::Error::NotFound(_)) => {
            let role = cmd
                .create_role(NewRole {
                    name: config.user.default_role.to_owned(),
                    access: AccessType::default(),
                    permissions: Permissions::default(),
                })
                .await?;
            tracing::info!("Default role {} created", role.name);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
