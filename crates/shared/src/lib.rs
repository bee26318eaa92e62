mod error;
pub mod user;

pub use error::*;

/// Database handles shared by every command.
///
/// Reads go through `read_db`, statements that change rows go through
/// `write_db`. Tests usually hand the same pool to both.
#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
}

impl State {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
        }
    }
}
