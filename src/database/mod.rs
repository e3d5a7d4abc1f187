/*!
 * SQLite persistence for the translation cache.
 *
 * - `connection`: mutex-guarded connection handle
 * - `schema`: versioned schema bootstrap
 */

pub mod connection;
pub mod schema;

pub use connection::DatabaseConnection;
