use anyhow::Result;
use clap::{Parser, Subcommand};
use mangastore::{
    DatabaseConfig, EmailAddress, ProductStore, Role, SessionConfig, create_app,
    create_connection, ensure_schema,
};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mangastore")]
#[command(about = "Storefront backend with credential-based access control")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the storefront HTTP server
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(long, env = "MANGASTORE_DB_URL", default_value = "memory")]
        db_url: String,
        /// Session lifetime in seconds
        #[arg(long, env = "MANGASTORE_SESSION_TTL", default_value_t = mangastore::auth::DEFAULT_SESSION_TTL_SECONDS)]
        session_ttl: u64,
    },
    /// Initialize the database schema
    Init {
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// Assign a role to an existing user
    SetRole {
        /// Login identifier of the user
        email: String,
        /// One of: ordinary, administrator
        role: String,
        #[arg(long, env = "MANGASTORE_DB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Seed demo products into the catalog
    Seed {
        #[arg(long, env = "MANGASTORE_DB_URL", default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("mangastore=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            db_url,
            session_ttl,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url: {}", db_config.url);

            let app = create_app(
                db_config,
                SessionConfig {
                    ttl_seconds: session_ttl,
                },
            )
            .await?;

            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
            info!("Storefront listening on http://0.0.0.0:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url: {}", db_config.url);

            info!("Initializing database...");
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::SetRole {
            email,
            role,
            db_url,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            let role: Role = role.parse()?;
            let store = mangastore::CredentialStore::new(db);
            let user = store.set_role(&EmailAddress::new(email), role).await?;

            println!("Role for {} is now {}", user.email, user.role.as_str());
        }
        Commands::Seed { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            let seeded = ProductStore::new(db).seed_demo().await?;
            if seeded == 0 {
                println!("Catalog already has products; nothing seeded.");
            } else {
                println!("Seeded {} demo products.", seeded);
            }
        }
    }

    Ok(())
}
