//! PostgreSQL persistence adapters built on Diesel.
//!
//! Repositories here only translate between rows and domain types; rules
//! such as who may vote or how content is validated stay in the domain.
//! Row structs (`models`) and table definitions (`schema`) are private.
//!
//! ```no_run
//! use recipes::outbound::persistence::{DbPool, DieselRecipeRepository, PoolConfig};
//!
//! # async fn build() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/recipes")).await?;
//! let repo = DieselRecipeRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_recipe_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_recipe_repository::DieselRecipeRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig, PoolError};
