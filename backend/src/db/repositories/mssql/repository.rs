use async_trait::async_trait;
use log::{debug, info};

use super::operations;
use super::pool::{build_pool, DbPool};
use crate::db::config::DbConfig;
use crate::db::repository::*;
use crate::models::RawRecord;

/// SQL Server repository over the `realflow5m` table.
///
/// The instance owns its pool; clones share it.
#[derive(Clone)]
pub struct MssqlRepository {
    pool: DbPool,
    config: DbConfig,
}

impl MssqlRepository {
    /// Build the pool for `config`.
    pub async fn connect(config: DbConfig) -> RepositoryResult<Self> {
        let pool = build_pool(&config).await?;
        info!(
            "SQL Server pool ready for {} (max {} connections, COMID {})",
            config.connection_string(),
            config.pool_max,
            config.comid
        );
        Ok(Self { pool, config })
    }
}

#[async_trait]
impl RealflowRepository for MssqlRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        operations::ping(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| e.with_operation("health_check"))
    }

    async fn fetch_records(&self) -> RepositoryResult<Vec<RawRecord>> {
        let records = operations::fetch_records(&self.pool, self.config.comid)
            .await
            .map_err(|e| e.with_operation("fetch_records"))?;
        debug!("Fetched {} records for COMID {}", records.len(), self.config.comid);
        Ok(records)
    }

    async fn fetch_record(&self, sequence: i64) -> RepositoryResult<Option<RawRecord>> {
        operations::fetch_record(&self.pool, self.config.comid, sequence)
            .await
            .map_err(|e| e.with_operation("fetch_record"))
    }

    fn backend_name(&self) -> &'static str {
        "mssql"
    }
}
