//! Sample ledger lines for local runs.

use crate::error::{AppError, ConfigError};
use crate::model::EntryDraft;
use crate::store::{EntryFilter, EntryStore};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

const SAMPLES: &[(&str, Option<&str>, i64)] = &[
    ("Salary", Some("Monthly paycheck"), 320_000),
    ("Rent", Some("Apartment"), -120_000),
    ("Groceries", None, -8_645),
    ("Electricity bill", Some("Utility"), -6_230),
    ("Coffee beans", None, -1_850),
    ("Freelance invoice", Some("Website redesign"), 75_000),
    ("Gym membership", None, -3_900),
    ("Internet", Some("Fiber plan"), -4_500),
    ("Book sale", Some("Second-hand books"), 2_400),
    ("Restaurant dinner", None, -5_760),
];

/// Insert `count` deterministic entries (values in cents, consecutive dates) unless the store
/// already holds data. Returns how many were inserted.
pub async fn seed_entries(store: &dyn EntryStore, count: usize) -> Result<usize, AppError> {
    if store.count(&EntryFilter::default()).await? > 0 {
        tracing::info!("store not empty, skipping seed");
        return Ok(0);
    }
    let start = seed_start()?;
    for i in 0..count {
        let (name, description, cents) = SAMPLES[i % SAMPLES.len()];
        let round = i / SAMPLES.len();
        let name = if round == 0 {
            name.to_string()
        } else {
            format!("{} #{}", name, round + 1)
        };
        let draft = EntryDraft {
            name,
            description: description.map(str::to_string),
            date: start + Days::new(i as u64),
            value: Decimal::new(cents, 2),
        };
        store.insert(&draft).await?;
    }
    tracing::info!(count, "seeded entries");
    Ok(count)
}

fn seed_start() -> Result<NaiveDate, ConfigError> {
    NaiveDate::from_ymd_opt(2024, 1, 1).ok_or(ConfigError::Seed("start date out of range"))
}
