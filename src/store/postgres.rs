//! PostgreSQL-backed entry store and database bootstrap.

use crate::error::{AppError, ConfigError};
use crate::model::{Entry, EntryDraft, EntryId};
use crate::query::{EntryOrder, Window};
use crate::sql::{self, QueryBuf};
use crate::store::{EntryFilter, EntryStore};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{ConnectOptions, PgPool, Postgres, Row};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        PgEntryStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn prepare(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        query
    }

    async fn fetch_one_entry(&self, q: &QueryBuf) -> Result<Option<Entry>, AppError> {
        let row = Self::prepare(q).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(row_to_entry).transpose()?)
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn insert(&self, draft: &EntryDraft) -> Result<Entry, AppError> {
        let q = sql::insert(draft);
        self.fetch_one_entry(&q)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn find(&self, id: EntryId) -> Result<Option<Entry>, AppError> {
        self.fetch_one_entry(&sql::select_by_id(id)).await
    }

    async fn update(&self, id: EntryId, draft: &EntryDraft) -> Result<Option<Entry>, AppError> {
        self.fetch_one_entry(&sql::update(id, draft)).await
    }

    async fn delete(&self, id: EntryId) -> Result<bool, AppError> {
        let q = sql::delete(id);
        let row = Self::prepare(&q).fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }

    async fn count(&self, filter: &EntryFilter) -> Result<u64, AppError> {
        let q = sql::count(filter);
        let row = Self::prepare(&q).fetch_one(&self.pool).await?;
        let n: i64 = row.try_get(0)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn fetch(
        &self,
        filter: &EntryFilter,
        order: EntryOrder,
        window: Option<Window>,
    ) -> Result<Vec<Entry>, AppError> {
        let q = sql::select_list(filter, order, window);
        let rows = Self::prepare(&q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_entry).collect::<Result<Vec<_>, _>>()?)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_entry(row: &PgRow) -> Result<Entry, sqlx::Error> {
    Ok(Entry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        value: row.try_get("value")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Create the entries table and its full-text index if missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    for ddl in sql::create_schema_statements() {
        tracing::debug!(sql = %ddl, "schema");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

/// Connect to the `postgres` maintenance database and create the target database when it
/// does not exist yet.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| invalid_database_url(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Carries the reason, not the URL, so credentials stay out of logs.
fn invalid_database_url(reason: impl Into<String>) -> AppError {
    AppError::Config(ConfigError::Invalid {
        key: "DATABASE_URL",
        value: reason.into(),
    })
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| invalid_database_url("no database path"))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((name, query)) => (name.trim(), Some(query)),
        None => (path_and_query.trim(), None),
    };
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = match query {
        Some(query) => format!("{}postgres?{}", base, query),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
