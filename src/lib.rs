// Core modules
pub mod api;
pub mod auth;
mod catalog;
mod db;
mod types;

// Re-export key types and functions
pub use api::{AppState, SESSION_COOKIE, create_router};
pub use auth::{
    AuthError, Authenticator, Capability, CredentialStore, Decision, PasswordHasher,
    ResolvedIdentity, SessionConfig, SessionManager, VerifiedIdentity, authorize,
};
pub use catalog::ProductStore;
pub use db::{
    DatabaseConfig, Db, ProductCreate, ProductRecord, Role, UserCreate, UserRecord,
    create_connection, ensure_schema,
};
pub use types::{EmailAddress, SessionToken};

use anyhow::Result;

/// Convenience function to create a fully wired storefront router.
///
/// This connects to the database, applies the schema, and assembles the
/// authenticator, session manager and product store behind an axum Router.
pub async fn create_app(
    db_config: DatabaseConfig,
    session_config: SessionConfig,
) -> Result<axum::Router> {
    let db = create_connection(db_config).await?;
    ensure_schema(&db).await?;

    let store = CredentialStore::new(db.clone());
    let state = AppState {
        authenticator: Authenticator::new(store.clone(), PasswordHasher::default()),
        sessions: SessionManager::new(db.clone(), store, session_config),
        products: ProductStore::new(db),
    };

    Ok(create_router(state))
}
