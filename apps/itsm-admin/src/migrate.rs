use anyhow::Context;
use clap::Args;
use itsm_db::DbConfig;
use tracing::info;

#[derive(Args)]
pub struct MigrateArgs {}

impl MigrateArgs {
    pub async fn run(self, cfg: &DbConfig) -> anyhow::Result<()> {
        let db = itsm_db::connect(cfg).await?;
        itsm_store::migrate(&db)
            .await
            .context("applying migrations")?;
        info!("schema is up to date");
        Ok(())
    }
}
