//! SQL text and row decoding for `dbo.realflow5m`.
//!
//! Column types vary between deployments of the feed (times stored as text or
//! `datetime`, measurements as `float`, `real` or `decimal`), so each column is
//! read through a chain of accepted SQL types instead of a single `get`.

use chrono::{DateTime, NaiveDateTime, Utc};
use tiberius::numeric::Numeric;
use tiberius::{Query, Row};

use super::pool::DbPool;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::RawRecord;

const SELECT_RECORDS: &str = "SELECT [序号], [开始时间], [结束时间], [存盘时间], [航次], [船名], [呼号], \
     [油品名], [温度], [密度], [瞬时流量], [瞬时质量], [累计流量], [累计质量] \
     FROM [dbo].[realflow5m] WHERE [COMID] = @P1 ORDER BY [序号] ASC";

const SELECT_RECORD: &str = "SELECT [序号], [开始时间], [结束时间], [存盘时间], [航次], [船名], [呼号], \
     [油品名], [温度], [密度], [瞬时流量], [瞬时质量], [累计流量], [累计质量] \
     FROM [dbo].[realflow5m] WHERE [序号] = @P1 AND [COMID] = @P2";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run `SELECT 1` on a pooled connection.
pub(super) async fn ping(pool: &DbPool) -> RepositoryResult<()> {
    let mut conn = pool.get().await?;
    Query::new("SELECT 1 AS ok")
        .query(&mut *conn)
        .await?
        .into_row()
        .await?;
    Ok(())
}

/// Every row of the partition, ascending by sequence.
pub(super) async fn fetch_records(pool: &DbPool, comid: i32) -> RepositoryResult<Vec<RawRecord>> {
    let mut conn = pool.get().await?;

    let mut query = Query::new(SELECT_RECORDS);
    query.bind(comid);

    let rows = query
        .query(&mut *conn)
        .await?
        .into_first_result()
        .await?;

    rows.iter().map(parse_record_row).collect()
}

/// A single row of the partition.
pub(super) async fn fetch_record(
    pool: &DbPool,
    comid: i32,
    sequence: i64,
) -> RepositoryResult<Option<RawRecord>> {
    let mut conn = pool.get().await?;

    let mut query = Query::new(SELECT_RECORD);
    query.bind(sequence);
    query.bind(comid);

    let row = query.query(&mut *conn).await?.into_row().await?;
    row.as_ref().map(parse_record_row).transpose()
}

fn parse_record_row(row: &Row) -> RepositoryResult<RawRecord> {
    let sequence = column_i64(row, 0).ok_or_else(|| {
        RepositoryError::query_with_context(
            "Row without a sequence number",
            ErrorContext::new("parse_record_row").with_entity("realflow_record"),
        )
    })?;

    Ok(RawRecord {
        sequence,
        start_time: column_text(row, 1),
        end_time: column_text(row, 2),
        save_time: column_text(row, 3),
        voyage: column_text(row, 4),
        vessel: column_text(row, 5),
        call_sign: column_text(row, 6),
        product: column_text(row, 7),
        temperature: column_f64(row, 8),
        density: column_f64(row, 9),
        instant_flow: column_f64(row, 10),
        instant_mass: column_f64(row, 11),
        cumulative_flow: column_f64(row, 12),
        cumulative_mass: column_f64(row, 13),
    })
}

fn column_text(row: &Row, idx: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<&str, _>(idx) {
        return value.map(str::to_string);
    }
    if let Ok(value) = row.try_get::<NaiveDateTime, _>(idx) {
        return value.map(|dt| dt.format(TIMESTAMP_FORMAT).to_string());
    }
    if let Ok(value) = row.try_get::<DateTime<Utc>, _>(idx) {
        return value.map(|dt| dt.naive_utc().format(TIMESTAMP_FORMAT).to_string());
    }
    column_f64(row, idx).map(|v| v.to_string())
}

fn column_f64(row: &Row, idx: usize) -> Option<f64> {
    if let Ok(value) = row.try_get::<f64, _>(idx) {
        return value;
    }
    if let Ok(value) = row.try_get::<f32, _>(idx) {
        return value.map(f64::from);
    }
    if let Ok(value) = row.try_get::<Numeric, _>(idx) {
        return value.map(f64::from);
    }
    if let Ok(value) = row.try_get::<&str, _>(idx) {
        return value.and_then(|v| v.trim().parse().ok());
    }
    integer_column(row, idx).map(|v| v as f64)
}

fn column_i64(row: &Row, idx: usize) -> Option<i64> {
    integer_column(row, idx).or_else(|| column_f64(row, idx).map(|v| v as i64))
}

fn integer_column(row: &Row, idx: usize) -> Option<i64> {
    if let Ok(value) = row.try_get::<i64, _>(idx) {
        return value;
    }
    if let Ok(value) = row.try_get::<i32, _>(idx) {
        return value.map(i64::from);
    }
    if let Ok(value) = row.try_get::<i16, _>(idx) {
        return value.map(i64::from);
    }
    row.try_get::<u8, _>(idx).ok().flatten().map(i64::from)
}
