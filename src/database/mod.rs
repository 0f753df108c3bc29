//! Database connectivity for the pricing core.

pub mod pool;

pub use pool::{create_pool, run_migrations, Database, DatabaseError};
