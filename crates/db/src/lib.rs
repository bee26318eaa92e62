pub mod schema;
pub mod table;

pub use schema::create_tables;
