//! Builds parameterized INSERT, SELECT, UPDATE, DELETE and COUNT for the entries table.
//! Identifiers come from `EntryColumn` only; every client value is a bound parameter.

use crate::model::{EntryColumn, EntryDraft, EntryId};
use crate::query::{EntryOrder, Window};
use crate::sql::PgBindValue;
use crate::store::EntryFilter;

pub const ENTRIES_TABLE: &str = "entries";

/// Text search configuration shared by queries and the index definition.
pub const TS_CONFIG: &str = "simple";

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: impl Into<PgBindValue>) -> u32 {
        self.params.push(v.into());
        self.params.len() as u32
    }
}

fn table() -> String {
    quoted(ENTRIES_TABLE)
}

fn select_column_list() -> String {
    EntryColumn::ALL
        .iter()
        .map(|c| quoted(c.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The name with every non-alphanumeric run turned into a space, then vectorized. The GIN
/// index is built on this exact expression. Splitting first keeps the `simple` parser from
/// treating emails, hosts, versions and decimals as single tokens, so its words are the ones
/// `search::tokenize` produces.
pub fn name_tsvector() -> String {
    format!(
        "to_tsvector('{}', regexp_replace({}, '[^[:alnum:]]+', ' ', 'g'))",
        TS_CONFIG,
        quoted(EntryColumn::Name.as_str())
    )
}

fn where_clause(q: &mut QueryBuf, filter: &EntryFilter) -> String {
    let Some(terms) = &filter.search else {
        return String::new();
    };
    match terms.to_tsquery() {
        Some(tsquery) => {
            let n = q.push_param(tsquery);
            format!(" WHERE {} @@ to_tsquery('{}', ${})", name_tsvector(), TS_CONFIG, n)
        }
        None => " WHERE FALSE".to_string(),
    }
}

fn order_clause(order: EntryOrder) -> String {
    let column = quoted(order.column.as_str());
    if order.column == EntryColumn::Id {
        format!(" ORDER BY {} {}", column, order.direction.as_sql())
    } else {
        format!(
            " ORDER BY {} {}, {} ASC",
            column,
            order.direction.as_sql(),
            quoted(EntryColumn::Id.as_str())
        )
    }
}

fn push_draft(q: &mut QueryBuf, draft: &EntryDraft) -> [String; 4] {
    let name = q.push_param(draft.name.clone());
    let description = q.push_param(draft.description.clone());
    let date = q.push_param(draft.date);
    let value = q.push_param(draft.value);
    [
        format!("${}::text", name),
        format!("${}::text", description),
        format!("${}::date", date),
        format!("${}::numeric", value),
    ]
}

const WRITABLE: [EntryColumn; 4] = [
    EntryColumn::Name,
    EntryColumn::Description,
    EntryColumn::Date,
    EntryColumn::Value,
];

pub fn insert(draft: &EntryDraft) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders = push_draft(&mut q, draft);
    let cols: Vec<String> = WRITABLE.iter().map(|c| quoted(c.as_str())).collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table(),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list()
    );
    q
}

pub fn select_by_id(id: EntryId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        select_column_list(),
        table(),
        quoted(EntryColumn::Id.as_str()),
        n
    );
    q
}

/// UPDATE every writable column and refresh `updated_at`.
pub fn update(id: EntryId, draft: &EntryDraft) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders = push_draft(&mut q, draft);
    let mut sets: Vec<String> = WRITABLE
        .iter()
        .zip(placeholders.iter())
        .map(|(c, ph)| format!("{} = {}", quoted(c.as_str()), ph))
        .collect();
    sets.push(format!("{} = NOW()", quoted(EntryColumn::UpdatedAt.as_str())));
    let id_param = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table(),
        sets.join(", "),
        quoted(EntryColumn::Id.as_str()),
        id_param,
        select_column_list()
    );
    q
}

pub fn delete(id: EntryId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    let id_col = quoted(EntryColumn::Id.as_str());
    q.sql = format!("DELETE FROM {} WHERE {} = ${} RETURNING {}", table(), id_col, n, id_col);
    q
}

pub fn count(filter: &EntryFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, filter);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", table(), where_clause);
    q
}

/// SELECT with optional search filter, allow-listed ORDER BY and optional LIMIT/OFFSET.
pub fn select_list(filter: &EntryFilter, order: EntryOrder, window: Option<Window>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, filter);
    let limit_clause = window
        .map(|w| format!(" LIMIT {} OFFSET {}", w.limit, w.offset))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        select_column_list(),
        table(),
        where_clause,
        order_clause(order),
        limit_clause
    );
    q
}

/// Idempotent bootstrap DDL for the entries table and its full-text index.
pub fn create_schema_statements() -> Vec<String> {
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                "id" BIGSERIAL PRIMARY KEY,
                "name" TEXT NOT NULL CHECK (btrim("name") <> ''),
                "description" TEXT,
                "date" DATE NOT NULL,
                "value" NUMERIC NOT NULL,
                "created_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                "updated_at" TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            table()
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} USING GIN ({})",
            quoted("entries_name_words_fts"),
            table(),
            name_tsvector()
        ),
    ]
}
