use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_CURRENCY: &str = "INR";

// ============ Pricing vocabulary ============

/// A pricing bracket with its own markup, accommodation and vehicle rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Budget,
    Standard,
    Premium,
}

impl Tier {
    /// Tiers in the order packages are always returned.
    pub const ALL: [Tier; 3] = [Tier::Budget, Tier::Standard, Tier::Premium];

    pub fn name(self) -> &'static str {
        match self {
            Tier::Budget => "Budget",
            Tier::Standard => "Standard",
            Tier::Premium => "Premium",
        }
    }
}

/// Transport modes a rate sheet carries fares for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Train,
    Bus,
    Flight,
}

impl TransportMode {
    /// Exact, case-sensitive match. Returns `None` for anything else
    /// (e.g. "ship" or "Train").
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "train" => Some(TransportMode::Train),
            "bus" => Some(TransportMode::Bus),
            "flight" => Some(TransportMode::Flight),
            _ => None,
        }
    }
}

/// Builds the deduplication key for a route: `origin|destination`, lowercased.
pub fn route_key(origin: &str, destination: &str) -> String {
    format!(
        "{}|{}",
        origin.trim().to_lowercase(),
        destination.trim().to_lowercase()
    )
}

// ============ Database Models ============

/// Per-route rate sheet. Every monetary field is optional; `None` means no data.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RateRecord {
    pub id: i64,
    /// Lowercased `origin|destination`, unique across records.
    pub route_key: String,
    pub train_oneway: Option<f64>,
    pub train_return: Option<f64>,
    pub bus_oneway: Option<f64>,
    pub bus_return: Option<f64>,
    pub flight_oneway: Option<f64>,
    pub flight_return: Option<f64>,
    pub hotel_per_night_budget: Option<f64>,
    pub hotel_per_night_standard: Option<f64>,
    pub hotel_per_night_premium: Option<f64>,
    pub cab_daily_budget: Option<f64>,
    pub cab_daily_standard: Option<f64>,
    pub cab_daily_premium: Option<f64>,
}

impl RateRecord {
    pub fn round_trip_fare(&self, mode: TransportMode) -> Option<f64> {
        match mode {
            TransportMode::Train => self.train_return,
            TransportMode::Bus => self.bus_return,
            TransportMode::Flight => self.flight_return,
        }
    }

    pub fn hotel_per_night(&self, tier: Tier) -> Option<f64> {
        match tier {
            Tier::Budget => self.hotel_per_night_budget,
            Tier::Standard => self.hotel_per_night_standard,
            Tier::Premium => self.hotel_per_night_premium,
        }
    }

    pub fn cab_daily(&self, tier: Tier) -> Option<f64> {
        match tier {
            Tier::Budget => self.cab_daily_budget,
            Tier::Standard => self.cab_daily_standard,
            Tier::Premium => self.cab_daily_premium,
        }
    }
}

/// Admin write for one route. Replaces every monetary field of the stored record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateUpsert {
    #[serde(default, deserialize_with = "crate::intake::text")]
    pub origin: String,
    #[serde(default, deserialize_with = "crate::intake::text")]
    pub destination: String,
    #[serde(default)]
    pub train_oneway: Option<f64>,
    #[serde(default)]
    pub train_return: Option<f64>,
    #[serde(default)]
    pub bus_oneway: Option<f64>,
    #[serde(default)]
    pub bus_return: Option<f64>,
    #[serde(default)]
    pub flight_oneway: Option<f64>,
    #[serde(default)]
    pub flight_return: Option<f64>,
    #[serde(default)]
    pub hotel_per_night_budget: Option<f64>,
    #[serde(default)]
    pub hotel_per_night_standard: Option<f64>,
    #[serde(default)]
    pub hotel_per_night_premium: Option<f64>,
    #[serde(default)]
    pub cab_daily_budget: Option<f64>,
    #[serde(default)]
    pub cab_daily_standard: Option<f64>,
    #[serde(default)]
    pub cab_daily_premium: Option<f64>,
}

impl RateUpsert {
    pub fn route_key(&self) -> String {
        route_key(&self.origin, &self.destination)
    }

    /// Converts the write into the record it stores under `id`.
    /// A submitted zero is kept as "no data", which prices identically.
    pub fn into_record(self, id: i64) -> RateRecord {
        fn present(v: Option<f64>) -> Option<f64> {
            v.filter(|amount| *amount != 0.0)
        }

        RateRecord {
            id,
            route_key: self.route_key(),
            train_oneway: present(self.train_oneway),
            train_return: present(self.train_return),
            bus_oneway: present(self.bus_oneway),
            bus_return: present(self.bus_return),
            flight_oneway: present(self.flight_oneway),
            flight_return: present(self.flight_return),
            hotel_per_night_budget: present(self.hotel_per_night_budget),
            hotel_per_night_standard: present(self.hotel_per_night_standard),
            hotel_per_night_premium: present(self.hotel_per_night_premium),
            cab_daily_budget: present(self.cab_daily_budget),
            cab_daily_standard: present(self.cab_daily_standard),
            cab_daily_premium: present(self.cab_daily_premium),
        }
    }
}

/// The single global pricing configuration.
///
/// `Default` is the all-absent record (every fee and markup counts as zero);
/// `Settings::seeded` is what a fresh store starts with.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Settings {
    pub service_fee_flat: Option<f64>,
    pub service_fee_percent: Option<f64>,
    pub markup_percent_budget: Option<f64>,
    pub markup_percent_standard: Option<f64>,
    pub markup_percent_premium: Option<f64>,
    pub gst_percent: Option<f64>,
    pub currency: Option<String>,
}

impl Settings {
    pub fn seeded() -> Self {
        Self {
            service_fee_flat: Some(100.0),
            service_fee_percent: Some(0.0),
            markup_percent_budget: Some(5.0),
            markup_percent_standard: Some(10.0),
            markup_percent_premium: Some(15.0),
            gst_percent: Some(0.0),
            currency: Some(DEFAULT_CURRENCY.to_string()),
        }
    }

    pub fn markup_percent(&self, tier: Tier) -> Option<f64> {
        match tier {
            Tier::Budget => self.markup_percent_budget,
            Tier::Standard => self.markup_percent_standard,
            Tier::Premium => self.markup_percent_premium,
        }
    }

    pub fn currency_code(&self) -> &str {
        self.currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }
}

/// Partial settings write: only fields present (and non-null) change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub service_fee_flat: Option<f64>,
    #[serde(default)]
    pub service_fee_percent: Option<f64>,
    #[serde(default)]
    pub markup_percent_budget: Option<f64>,
    #[serde(default)]
    pub markup_percent_standard: Option<f64>,
    #[serde(default)]
    pub markup_percent_premium: Option<f64>,
    #[serde(default)]
    pub gst_percent: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl SettingsUpdate {
    pub fn apply_to(self, settings: &mut Settings) {
        fn merge<T>(slot: &mut Option<T>, update: Option<T>) {
            if update.is_some() {
                *slot = update;
            }
        }

        merge(&mut settings.service_fee_flat, self.service_fee_flat);
        merge(&mut settings.service_fee_percent, self.service_fee_percent);
        merge(&mut settings.markup_percent_budget, self.markup_percent_budget);
        merge(
            &mut settings.markup_percent_standard,
            self.markup_percent_standard,
        );
        merge(
            &mut settings.markup_percent_premium,
            self.markup_percent_premium,
        );
        merge(&mut settings.gst_percent, self.gst_percent);
        merge(&mut settings.currency, self.currency);
    }
}

/// A stored customer inquiry. Never updated or removed.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub phone: String,
    pub city: String,
    pub email: String,
    pub service: String,
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub days: i32,
    /// Party size.
    pub pax: i32,
    /// Vehicle hire wanted.
    pub wants_cab: bool,
    pub notes: String,
    pub verified: bool,
}

/// A lead as handed to the store, before it has an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub email: String,
    pub service: String,
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub days: i32,
    pub pax: i32,
    pub wants_cab: bool,
    pub notes: String,
    pub verified: bool,
}

impl NewLead {
    pub fn into_lead(self, id: i64, created_at: DateTime<Utc>) -> Lead {
        Lead {
            id,
            created_at,
            name: self.name,
            phone: self.phone,
            city: self.city,
            email: self.email,
            service: self.service,
            origin: self.origin,
            destination: self.destination,
            start_date: self.start_date,
            end_date: self.end_date,
            days: self.days,
            pax: self.pax,
            wants_cab: self.wants_cab,
            notes: self.notes,
            verified: self.verified,
        }
    }
}

// ============ API Response Models ============

/// One priced tier. Derived on every planning request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedPackage {
    pub tier: String,
    pub currency: String,
    /// Whole currency units.
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub origin: String,
    pub destination: String,
    pub pax: i32,
    pub days: i32,
    pub wants_cab: bool,
    pub travel_mode: String,
    pub options: Vec<PricedPackage>,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            id: None,
            route_key: None,
            message: None,
        }
    }
}
