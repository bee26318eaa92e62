use std::{ops::Deref, sync::Arc};

use userhub_shared::State;

use crate::{
    cascade::DeletePolicy,
    permission::{JsonPermissionCodec, PermissionCodec},
    picture::{PathResolver, PublicPathResolver},
    token::{Signer, TokenTtl},
};

mod create;
mod delete;
mod find;
mod patch;
mod restore;
mod revoke;
mod role;
mod token;
mod update;

pub use create::CreateInput;
pub use role::NewRole;
pub use update::UpdateInput;

/// Entry point for every operation on the user aggregate.
pub struct Command {
    state: State,
    default_role: String,
    policy: DeletePolicy,
    ttl: TokenTtl,
    codec: Arc<dyn PermissionCodec>,
    paths: Arc<dyn PathResolver>,
    signer: Arc<dyn Signer>,
}

impl Deref for Command {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: State, signer: impl Signer + 'static) -> Self {
        Self {
            state,
            default_role: "user".to_owned(),
            policy: DeletePolicy::default(),
            ttl: TokenTtl::default(),
            codec: Arc::new(JsonPermissionCodec),
            paths: Arc::new(PublicPathResolver::default()),
            signer: Arc::new(signer),
        }
    }

    pub fn with_default_role(mut self, name: impl Into<String>) -> Self {
        self.default_role = name.into();
        self
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_token_ttl(mut self, ttl: TokenTtl) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_permission_codec(mut self, codec: impl PermissionCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn with_path_resolver(mut self, paths: impl PathResolver + 'static) -> Self {
        self.paths = Arc::new(paths);
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.policy
    }
}
