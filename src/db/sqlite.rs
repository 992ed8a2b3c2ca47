use crate::db::models::{Record, apply_patch, prepare_insert, record_id};
use crate::db::query::{Direction, Filter, FilterOp, Query, check_field};
use crate::db::schema::SQLITE_INIT;
use crate::db::store::Store;
use crate::error::HubError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, QueryBuilder, Row, Sqlite};
use std::str::FromStr;
use tracing::{info, warn};

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, HubError> {
        ensure_parent_dir(database_url).await;
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        info!(database_url, "sqlite store ready");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), HubError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_record(row: SqliteRow) -> Result<Record, HubError> {
        let data: String = row.try_get("data")?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// `sqlite://data/x.sqlite` needs `data/` to exist before sqlx creates the file.
async fn ensure_parent_dir(database_url: &str) {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return;
    }
    if let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        warn!(dir = %parent.display(), error = %e, "could not create database directory");
    }
}

fn json_path(field: &str) -> Result<String, HubError> {
    Ok(format!("$.{}", check_field(field)?))
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::String(s) => {
            qb.push_bind(s.clone());
        }
        // json_extract yields 1/0 for JSON booleans
        Value::Bool(b) => {
            qb.push_bind(i64::from(*b));
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                qb.push_bind(i);
            }
            None => {
                qb.push_bind(n.as_f64().unwrap_or_default());
            }
        },
        other => {
            qb.push_bind(other.to_string());
        }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) -> Result<(), HubError> {
    let path = json_path(&filter.field)?;
    let null = filter.value.is_null();
    match (filter.op, null) {
        (FilterOp::Eq, true) => {
            qb.push(" AND json_extract(data, ").push_bind(path).push(") IS NULL");
        }
        (FilterOp::Neq, true) => {
            qb.push(" AND json_extract(data, ")
                .push_bind(path)
                .push(") IS NOT NULL");
        }
        (FilterOp::Neq, false) => {
            qb.push(" AND (json_extract(data, ")
                .push_bind(path.clone())
                .push(") IS NULL OR json_extract(data, ")
                .push_bind(path)
                .push(") != ");
            push_value(qb, &filter.value);
            qb.push(")");
        }
        (op, _) => {
            let sql_op = match op {
                FilterOp::Eq => " = ",
                FilterOp::Gt => " > ",
                FilterOp::Gte => " >= ",
                FilterOp::Lt => " < ",
                FilterOp::Lte => " <= ",
                FilterOp::Neq => " != ",
            };
            qb.push(" AND json_extract(data, ")
                .push_bind(path)
                .push(")")
                .push(sql_op);
            push_value(qb, &filter.value);
        }
    }
    Ok(())
}

fn push_where<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    table: &str,
    filters: &[Filter],
) -> Result<(), HubError> {
    qb.push(" WHERE tbl = ").push_bind(table.to_string());
    for filter in filters {
        push_filter(qb, filter)?;
    }
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn select(&self, query: &Query) -> Result<Vec<Record>, HubError> {
        query.check()?;
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT data FROM records");
        push_where(&mut qb, &query.table, &query.filters)?;
        qb.push(" ORDER BY ");
        for order in &query.order {
            let path = json_path(&order.field)?;
            let dir = match order.direction {
                Direction::Asc => " ASC, ",
                Direction::Desc => " DESC, ",
            };
            // nulls last, matching the in-memory ordering
            qb.push("json_extract(data, ")
                .push_bind(path.clone())
                .push(") IS NULL, json_extract(data, ")
                .push_bind(path)
                .push(")")
                .push(dir);
        }
        qb.push("rowid");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, HubError> {
        check_field(table)?;
        let record = prepare_insert(record);
        let id = record_id(&record).unwrap_or_default();
        let created_at = record
            .get("created_at")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = serde_json::to_string(&record)?;

        sqlx::query("INSERT INTO records (tbl, id, data, created_at) VALUES (?, ?, ?, ?)")
            .bind(table)
            .bind(&id)
            .bind(data)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e
                    && db.is_unique_violation()
                {
                    return HubError::Conflict(format!("duplicate id `{id}` in table `{table}`"));
                }
                HubError::Database(e)
            })?;
        Ok(record)
    }

    async fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        patch: Record,
    ) -> Result<Option<Record>, HubError> {
        let filter = Filter {
            field: key.to_string(),
            op: FilterOp::Eq,
            value: value.clone(),
        };
        let mut tx = self.pool.begin().await?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, data FROM records");
        push_where(&mut qb, table, std::slice::from_ref(&filter))?;
        qb.push(" ORDER BY rowid LIMIT 1");
        let Some(row) = qb.build().fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };
        let id: String = row.try_get("id")?;
        let mut record = Self::row_to_record(row)?;
        apply_patch(&mut record, patch);

        sqlx::query("UPDATE records SET data = ? WHERE tbl = ? AND id = ?")
            .bind(serde_json::to_string(&record)?)
            .bind(table)
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(record))
    }

    async fn delete(&self, table: &str, key: &str, value: &Value) -> Result<u64, HubError> {
        let filter = Filter {
            field: key.to_string(),
            op: FilterOp::Eq,
            value: value.clone(),
        };
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM records");
        push_where(&mut qb, table, std::slice::from_ref(&filter))?;
        let res = qb.build().execute(&self.pool).await?;
        Ok(res.rows_affected())
    }

    async fn clear(&self, table: &str) -> Result<u64, HubError> {
        let res = sqlx::query("DELETE FROM records WHERE tbl = ?")
            .bind(table)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
