//! Standalone migration runner: brings the configured database up to the
//! current schema and exits. The server does the same at startup when
//! `APP__AUTO_MIGRATE=true`; this binary exists for deployments that migrate
//! as a separate step.

use tracing::info;

use stoneworks_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("Running migrations against {}", cfg.database_url());
    let db = api::db::establish_connection_from_app_config(&cfg).await?;
    api::db::run_migrations(&db).await?;
    info!("Migrations completed");

    Ok(())
}
