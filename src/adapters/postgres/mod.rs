//! PostgreSQL adapters.
//!
//! sqlx-backed implementations of the repository ports. All adapters share
//! one `PgPool` built by the composition root.

mod donation_repository;
mod project_repository;
mod user_directory;

pub use donation_repository::PostgresDonationRepository;
pub use project_repository::PostgresProjectRepository;
pub use user_directory::PostgresUserDirectory;
