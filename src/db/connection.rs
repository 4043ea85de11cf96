use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| "mangastore".to_string()),
            database: env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "store".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    // Use the specified namespace and database
    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    // Define schema for each table
    let schema_queries = vec![
        // User credentials. The UNIQUE index on email is what makes
        // duplicate-identifier enforcement atomic under concurrent creates.
        "DEFINE TABLE user SCHEMAFULL;
         DEFINE FIELD email ON TABLE user TYPE string;
         DEFINE FIELD password_hash ON TABLE user TYPE string;
         DEFINE FIELD role ON TABLE user TYPE string;
         DEFINE FIELD created_at ON TABLE user VALUE time::now();
         DEFINE FIELD updated_at ON TABLE user VALUE time::now();
         DEFINE INDEX user_email ON TABLE user COLUMNS email UNIQUE;",

        // Session mappings. Only the SHA-256 of the token is stored; the
        // raw token lives exclusively in the client cookie.
        "DEFINE TABLE session SCHEMAFULL;
         DEFINE FIELD token_hash ON TABLE session TYPE string;
         DEFINE FIELD user_id ON TABLE session TYPE record<user>;
         DEFINE FIELD issued_at ON TABLE session VALUE time::now();
         DEFINE FIELD expires_at ON TABLE session TYPE datetime;
         DEFINE INDEX session_token_hash ON TABLE session COLUMNS token_hash UNIQUE;",

        // Product catalog
        "DEFINE TABLE product SCHEMAFULL;
         DEFINE FIELD name ON TABLE product TYPE string;
         DEFINE FIELD description ON TABLE product TYPE option<string>;
         DEFINE FIELD price ON TABLE product TYPE float;
         DEFINE FIELD stock ON TABLE product TYPE number DEFAULT 0;
         DEFINE FIELD created_at ON TABLE product VALUE time::now();
         DEFINE FIELD updated_at ON TABLE product VALUE time::now();
         DEFINE INDEX product_name ON TABLE product COLUMNS name;",
    ];

    for query in schema_queries {
        db.query(query).await?;
    }

    Ok(())
}
