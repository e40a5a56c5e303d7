//! Database access for the user registry.
//!
//! `gateway` owns the connection pool, `operations` the transaction
//! discipline, and `users`/`addresses` the SQL for each table.

mod addresses;
pub mod gateway;
pub mod models;
pub mod operations;
mod users;

pub use gateway::ConnectionGateway;
pub use models::{Address, NewAddress, NewUser, PathId, User, UserLookup, UserSearch};
pub use operations::DbOperations;
