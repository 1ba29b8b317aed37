//! Recipe sharing backend: recipes, votes, search and sessions.
//!
//! The crate follows a hexagonal layout. [`domain`] holds the recipe model,
//! vote toggling, list queries and the ports; [`inbound`] adapts HTTP
//! requests onto the driving ports; [`outbound`] implements the recipe store
//! in memory and on PostgreSQL.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
