pub mod config;
pub mod db;
pub mod observability;

pub use config::Config;
pub use db::create_state;

use userhub_user::{Command, picture::PublicPathResolver, token::JwtSigner};

/// Build the user command with everything `config` sets.
pub fn create_command(config: &Config, state: userhub_shared::State) -> anyhow::Result<Command> {
    let signer = JwtSigner::new(&config.jwt.secret, config.jwt.refresh_secret.as_deref());

    Ok(Command::new(state, signer)
        .with_default_role(config.user.default_role.to_owned())
        .with_delete_policy(config.user.delete.policy()?)
        .with_token_ttl(config.jwt.ttl())
        .with_path_resolver(PublicPathResolver::new(&config.user.public_base_url)?))
}
