use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, NewLead, RateRecord, RateUpsert, Settings, SettingsUpdate};
use crate::storage::{LeadStore, RateStore, SettingsStore};

const RATE_COLUMNS: &str = "id, route_key, train_oneway, train_return, bus_oneway, bus_return, \
     flight_oneway, flight_return, hotel_per_night_budget, hotel_per_night_standard, \
     hotel_per_night_premium, cab_daily_budget, cab_daily_standard, cab_daily_premium";

const SETTINGS_COLUMNS: &str = "service_fee_flat, service_fee_percent, markup_percent_budget, \
     markup_percent_standard, markup_percent_premium, gst_percent, currency";

/// Postgres-backed storage over the `rates`, `settings` and `leads` tables.
///
/// Rate and lead writes are single statements; concurrent writers rely on
/// Postgres row-level atomicity (`ON CONFLICT` upserts, `COALESCE` merges).
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateStore for PgStore {
    async fn list_rates(&self) -> Result<Vec<RateRecord>, AppError> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "SELECT {} FROM rates ORDER BY id DESC",
            RATE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing rates")
    }

    async fn find_rate(&self, route_key: &str) -> Result<Option<RateRecord>, AppError> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "SELECT {} FROM rates WHERE route_key = $1",
            RATE_COLUMNS
        ))
        .bind(route_key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("loading rate for {}", route_key))
    }

    async fn upsert_rate(&self, rate: RateUpsert) -> Result<RateRecord, AppError> {
        // id is assigned by the sequence; 0 is a placeholder
        let record = rate.into_record(0);

        sqlx::query_as::<_, RateRecord>(&format!(
            "INSERT INTO rates (
                route_key, train_oneway, train_return, bus_oneway, bus_return,
                flight_oneway, flight_return, hotel_per_night_budget, hotel_per_night_standard,
                hotel_per_night_premium, cab_daily_budget, cab_daily_standard, cab_daily_premium
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (route_key) DO UPDATE SET
                train_oneway = EXCLUDED.train_oneway,
                train_return = EXCLUDED.train_return,
                bus_oneway = EXCLUDED.bus_oneway,
                bus_return = EXCLUDED.bus_return,
                flight_oneway = EXCLUDED.flight_oneway,
                flight_return = EXCLUDED.flight_return,
                hotel_per_night_budget = EXCLUDED.hotel_per_night_budget,
                hotel_per_night_standard = EXCLUDED.hotel_per_night_standard,
                hotel_per_night_premium = EXCLUDED.hotel_per_night_premium,
                cab_daily_budget = EXCLUDED.cab_daily_budget,
                cab_daily_standard = EXCLUDED.cab_daily_standard,
                cab_daily_premium = EXCLUDED.cab_daily_premium
            RETURNING {}",
            RATE_COLUMNS
        ))
        .bind(&record.route_key)
        .bind(record.train_oneway)
        .bind(record.train_return)
        .bind(record.bus_oneway)
        .bind(record.bus_return)
        .bind(record.flight_oneway)
        .bind(record.flight_return)
        .bind(record.hotel_per_night_budget)
        .bind(record.hotel_per_night_standard)
        .bind(record.hotel_per_night_premium)
        .bind(record.cab_daily_budget)
        .bind(record.cab_daily_standard)
        .bind(record.cab_daily_premium)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("upserting rate for {}", record.route_key))
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn settings(&self) -> Result<Option<Settings>, AppError> {
        sqlx::query_as::<_, Settings>(&format!(
            "SELECT {} FROM settings WHERE id = 1",
            SETTINGS_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .context("loading settings")
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, AppError> {
        let mut tx = self.pool.begin().await.context("starting settings update")?;

        // Recreate the singleton with column defaults if it was removed
        sqlx::query("INSERT INTO settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(&mut *tx)
            .await
            .context("seeding settings")?;

        let settings = sqlx::query_as::<_, Settings>(&format!(
            "UPDATE settings SET
                service_fee_flat = COALESCE($1, service_fee_flat),
                service_fee_percent = COALESCE($2, service_fee_percent),
                markup_percent_budget = COALESCE($3, markup_percent_budget),
                markup_percent_standard = COALESCE($4, markup_percent_standard),
                markup_percent_premium = COALESCE($5, markup_percent_premium),
                gst_percent = COALESCE($6, gst_percent),
                currency = COALESCE($7, currency)
             WHERE id = 1
             RETURNING {}",
            SETTINGS_COLUMNS
        ))
        .bind(update.service_fee_flat)
        .bind(update.service_fee_percent)
        .bind(update.markup_percent_budget)
        .bind(update.markup_percent_standard)
        .bind(update.markup_percent_premium)
        .bind(update.gst_percent)
        .bind(update.currency)
        .fetch_one(&mut *tx)
        .await
        .context("updating settings")?;

        tx.commit().await.context("committing settings update")?;
        Ok(settings)
    }
}

#[async_trait]
impl LeadStore for PgStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await
            .context("listing leads")
    }

    async fn append_lead(&self, lead: NewLead) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO leads (
                name, phone, city, email, service, origin, destination,
                start_date, end_date, days, pax, wants_cab, notes, verified
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id",
        )
        .bind(&lead.name)
        .bind(&lead.phone)
        .bind(&lead.city)
        .bind(&lead.email)
        .bind(&lead.service)
        .bind(&lead.origin)
        .bind(&lead.destination)
        .bind(&lead.start_date)
        .bind(&lead.end_date)
        .bind(lead.days)
        .bind(lead.pax)
        .bind(lead.wants_cab)
        .bind(&lead.notes)
        .bind(lead.verified)
        .fetch_one(&self.pool)
        .await
        .context("inserting lead")?;

        tracing::debug!("Stored lead {} in Postgres", id);
        Ok(id)
    }
}
