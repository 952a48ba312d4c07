use clap::{Args, ValueEnum};
use itsm_db::{CodeSeries, DbConfig, EntityCode, RepoError, SecureConn, next_code};
use itsm_store::domain::{asset, project, ticket};
use itsm_store::infra::storage::entity;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Series {
    Tickets,
    Assets,
    Projects,
    ProjectTasks,
}

impl Series {
    fn prefix(self) -> &'static str {
        match self {
            Self::Tickets => ticket::TICKET_CODE_PREFIX,
            Self::Assets => asset::ASSET_CODE_PREFIX,
            Self::Projects => project::PROJECT_CODE_PREFIX,
            Self::ProjectTasks => project::TASK_CODE_PREFIX,
        }
    }

    async fn next(self, db: &SecureConn, series: &CodeSeries) -> Result<EntityCode, RepoError> {
        let conn = db.conn();
        match self {
            Self::Tickets => next_code::<entity::ticket::Entity, _>(conn, series).await,
            Self::Assets => next_code::<entity::asset::Entity, _>(conn, series).await,
            Self::Projects => next_code::<entity::project::Entity, _>(conn, series).await,
            Self::ProjectTasks => next_code::<entity::project_task::Entity, _>(conn, series).await,
        }
    }
}

#[derive(Args)]
pub struct NextCodeArgs {
    #[arg(long, value_enum)]
    series: Series,

    /// Defaults to the current UTC year
    #[arg(long)]
    year: Option<i32>,
}

impl NextCodeArgs {
    /// Read-only: the code is not reserved.
    pub async fn run(self, cfg: &DbConfig) -> anyhow::Result<()> {
        let prefix = self.series.prefix();
        let series = match self.year {
            Some(year) => CodeSeries::new(prefix, year)?,
            None => CodeSeries::current(prefix)?,
        };
        let db = itsm_db::connect(cfg).await?;
        let code = self.series.next(&db, &series).await?;
        println!("{code}");
        Ok(())
    }
}
