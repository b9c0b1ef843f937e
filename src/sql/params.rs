//! Typed values that sqlx can bind to PostgreSQL placeholders.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A value bound to a `$n` placeholder. Each variant reports its own PostgreSQL type.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    I64(i64),
    Text(String),
    Date(NaiveDate),
    Decimal(Decimal),
}

impl From<i64> for PgBindValue {
    fn from(n: i64) -> Self {
        PgBindValue::I64(n)
    }
}

impl From<String> for PgBindValue {
    fn from(s: String) -> Self {
        PgBindValue::Text(s)
    }
}

impl From<Option<String>> for PgBindValue {
    fn from(s: Option<String>) -> Self {
        s.map(PgBindValue::Text).unwrap_or(PgBindValue::Null)
    }
}

impl From<NaiveDate> for PgBindValue {
    fn from(d: NaiveDate) -> Self {
        PgBindValue::Date(d)
    }
}

impl From<Decimal> for PgBindValue {
    fn from(d: Decimal) -> Self {
        PgBindValue::Decimal(d)
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf)?,
            PgBindValue::Date(d) => <NaiveDate as Encode<Postgres>>::encode_by_ref(d, buf)?,
            PgBindValue::Decimal(d) => <Decimal as Encode<Postgres>>::encode_by_ref(d, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null | PgBindValue::Text(_) => <String as Type<Postgres>>::type_info(),
            PgBindValue::I64(_) => <i64 as Type<Postgres>>::type_info(),
            PgBindValue::Date(_) => <NaiveDate as Type<Postgres>>::type_info(),
            PgBindValue::Decimal(_) => <Decimal as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}
