use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::{info, warn};

use cms_api::{build_router, AppState, Repositories};
use cms_core::services::AdminAccount;
use cms_infrastructure::database::connection;
use cms_shared::config::AppConfig;

#[derive(Parser)]
#[command(name = "cms-server", version, about = "CMS backend: RBAC and admin menu API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and start the HTTP server - Default
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Migrate, then seed modules, permissions, roles, menu items and the admin account
    Install,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Dropping the guard stops the file writer.
    let _log_guard = cms_shared::telemetry::init_telemetry(&config.log)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(&config).await.map(|_| ()),
        Commands::Install => install(&config).await,
    }
}

async fn migrate(config: &AppConfig) -> anyhow::Result<PgPool> {
    info!("Connecting to database...");
    let pool = connection::create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    connection::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations applied.");
    Ok(pool)
}

async fn install(config: &AppConfig) -> anyhow::Result<()> {
    let pool = migrate(config).await?;
    let repos = Repositories::postgres(&pool);

    let admin = AdminAccount {
        name: config.seed.admin_name.clone(),
        email: config.seed.admin_email.clone(),
        password: config.seed.admin_password.clone(),
    };
    if admin.password.is_none() {
        warn!("seed.admin_password is not set; an existing admin account is required");
    }

    let report = repos.seeder(&config.rbac.super_role).run(Some(&admin)).await?;
    info!(
        modules = report.modules_created,
        permissions = report.permissions_created,
        roles = report.roles_created,
        menu_items = report.menu_items_created,
        admin_created = report.admin_created,
        admin_assigned = report.admin_assigned,
        "RBAC data installed"
    );
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("{} starting ({})", config.app.name, config.app.env);

    let pool = migrate(&config).await?;
    let repos = Repositories::postgres(&pool);

    let host: std::net::IpAddr = config.app.host.parse().context("Invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));

    let state = AppState::new(config, repos, Some(pool))?;
    let app = build_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
