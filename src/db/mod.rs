mod connection;
pub mod schema;

pub use connection::{Db, DatabaseConfig, create_connection, ensure_schema};
pub use schema::{ProductCreate, ProductRecord, Role, SessionRecord, UserCreate, UserRecord};
