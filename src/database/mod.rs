/// Database module for PostgreSQL persistence
///
/// This module provides:
/// - Connection pooling and embedded migrations
/// - Repository pattern implementations adhering to SOLID principles
/// - Database models and schema
/// - Diesel ORM integration

pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pool, get_conn, DatabaseError, PgPool, PgPooledConnection};
