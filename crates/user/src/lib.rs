pub mod cascade;
pub mod field;
pub mod filter;
pub mod permission;
pub mod picture;
pub mod token;
pub mod transaction;

mod command;
pub(crate) mod repository;
mod role;
mod types;

pub use cascade::DeletePolicy;
pub use command::*;
pub use filter::{Field, MatchMode, Predicate};
pub use types::*;
