use sqlx::{postgres::PgPoolOptions, PgPool};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS leads (
        id BIGSERIAL PRIMARY KEY,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        name TEXT NOT NULL DEFAULT '',
        phone TEXT NOT NULL DEFAULT '',
        city TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        service TEXT NOT NULL DEFAULT '',
        origin TEXT NOT NULL DEFAULT '',
        destination TEXT NOT NULL DEFAULT '',
        start_date TEXT NOT NULL DEFAULT '',
        end_date TEXT NOT NULL DEFAULT '',
        days INTEGER NOT NULL DEFAULT 0,
        pax INTEGER NOT NULL DEFAULT 1,
        wants_cab BOOLEAN NOT NULL DEFAULT FALSE,
        notes TEXT NOT NULL DEFAULT '',
        verified BOOLEAN NOT NULL DEFAULT FALSE
    )",
    "CREATE TABLE IF NOT EXISTS rates (
        id BIGSERIAL PRIMARY KEY,
        route_key TEXT NOT NULL UNIQUE,
        train_oneway DOUBLE PRECISION,
        train_return DOUBLE PRECISION,
        bus_oneway DOUBLE PRECISION,
        bus_return DOUBLE PRECISION,
        flight_oneway DOUBLE PRECISION,
        flight_return DOUBLE PRECISION,
        hotel_per_night_budget DOUBLE PRECISION,
        hotel_per_night_standard DOUBLE PRECISION,
        hotel_per_night_premium DOUBLE PRECISION,
        cab_daily_budget DOUBLE PRECISION,
        cab_daily_standard DOUBLE PRECISION,
        cab_daily_premium DOUBLE PRECISION
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        service_fee_flat DOUBLE PRECISION DEFAULT 100,
        service_fee_percent DOUBLE PRECISION DEFAULT 0,
        markup_percent_budget DOUBLE PRECISION DEFAULT 5,
        markup_percent_standard DOUBLE PRECISION DEFAULT 10,
        markup_percent_premium DOUBLE PRECISION DEFAULT 15,
        gst_percent DOUBLE PRECISION DEFAULT 0,
        currency TEXT DEFAULT 'INR'
    )",
    "INSERT INTO settings (id) VALUES (1) ON CONFLICT (id) DO NOTHING",
];

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        tracing::debug!("Schema ensured ({} statements)", SCHEMA.len());

        Ok(Self { pool })
    }
}
