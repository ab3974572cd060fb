//! Storage collaborators for rates, settings and leads.
//!
//! Handlers only see these traits, so the Postgres backing
//! ([`crate::db_storage::PgStore`]) and the in-memory backing ([`MemoryStore`])
//! are interchangeable.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{Lead, NewLead, RateRecord, RateUpsert, Settings, SettingsUpdate};

#[async_trait]
pub trait RateStore: Send + Sync {
    /// All rate records, newest first.
    async fn list_rates(&self) -> Result<Vec<RateRecord>, AppError>;

    async fn find_rate(&self, route_key: &str) -> Result<Option<RateRecord>, AppError>;

    /// Inserts or replaces the record for the upsert's route key.
    async fn upsert_rate(&self, rate: RateUpsert) -> Result<RateRecord, AppError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The singleton settings record, if one exists.
    async fn settings(&self) -> Result<Option<Settings>, AppError>;

    /// Merges the provided fields and returns the resulting record.
    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, AppError>;
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// All leads, newest first.
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError>;

    /// Appends a lead and returns its id.
    async fn append_lead(&self, lead: NewLead) -> Result<i64, AppError>;
}

/// Everything the HTTP surface needs from storage.
pub trait Storage: RateStore + SettingsStore + LeadStore {}

impl<T> Storage for T where T: RateStore + SettingsStore + LeadStore {}

#[derive(Debug, Default)]
struct MemoryState {
    rates: Vec<RateRecord>,
    next_rate_id: i64,
    settings: Option<Settings>,
    leads: Vec<Lead>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// An empty store whose settings start at [`Settings::seeded`].
    pub fn new() -> Self {
        Self::with_settings(Settings::seeded())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                settings: Some(settings),
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn list_rates(&self) -> Result<Vec<RateRecord>, AppError> {
        let state = self.state.read().await;
        let mut rates = state.rates.clone();
        rates.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rates)
    }

    async fn find_rate(&self, route_key: &str) -> Result<Option<RateRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .rates
            .iter()
            .find(|r| r.route_key == route_key)
            .cloned())
    }

    async fn upsert_rate(&self, rate: RateUpsert) -> Result<RateRecord, AppError> {
        let mut state = self.state.write().await;
        let key = rate.route_key();

        if let Some(existing) = state.rates.iter_mut().find(|r| r.route_key == key) {
            *existing = rate.into_record(existing.id);
            return Ok(existing.clone());
        }

        state.next_rate_id += 1;
        let record = rate.into_record(state.next_rate_id);
        state.rates.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn settings(&self) -> Result<Option<Settings>, AppError> {
        Ok(self.state.read().await.settings.clone())
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, AppError> {
        let mut state = self.state.write().await;
        let settings = state.settings.get_or_insert_with(Settings::seeded);
        update.apply_to(settings);
        Ok(settings.clone())
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        let state = self.state.read().await;
        Ok(state.leads.iter().rev().cloned().collect())
    }

    async fn append_lead(&self, lead: NewLead) -> Result<i64, AppError> {
        let mut state = self.state.write().await;
        let id = state.leads.len() as i64 + 1;
        state.leads.push(lead.into_lead(id, Utc::now()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delhi_agra(train_return: f64) -> RateUpsert {
        RateUpsert {
            origin: "Delhi".to_string(),
            destination: "Agra".to_string(),
            train_return: Some(train_return),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_same_route_keeps_one_record() {
        let store = MemoryStore::new();

        store.upsert_rate(delhi_agra(2000.0)).await.unwrap();
        store.upsert_rate(delhi_agra(2000.0)).await.unwrap();

        let rates = store.list_rates().await.unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].route_key, "delhi|agra");
    }

    #[tokio::test]
    async fn test_upsert_replaces_fields_case_insensitively() {
        let store = MemoryStore::new();
        let first = store.upsert_rate(delhi_agra(2000.0)).await.unwrap();

        let second = store
            .upsert_rate(RateUpsert {
                origin: "DELHI".to_string(),
                destination: "agra".to_string(),
                bus_return: Some(900.0),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.train_return, None);
        assert_eq!(second.bus_return, Some(900.0));
        assert_eq!(
            store.find_rate("delhi|agra").await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_rates_listed_newest_first() {
        let store = MemoryStore::new();
        store.upsert_rate(delhi_agra(1.0)).await.unwrap();
        store
            .upsert_rate(RateUpsert {
                origin: "Mumbai".to_string(),
                destination: "Goa".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let keys: Vec<String> = store
            .list_rates()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.route_key)
            .collect();
        assert_eq!(keys, vec!["mumbai|goa", "delhi|agra"]);
    }

    #[tokio::test]
    async fn test_settings_start_seeded_and_merge() {
        let store = MemoryStore::new();
        assert_eq!(store.settings().await.unwrap(), Some(Settings::seeded()));

        let merged = store
            .update_settings(SettingsUpdate {
                service_fee_flat: Some(250.0),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(merged.service_fee_flat, Some(250.0));
        assert_eq!(merged.markup_percent_standard, Some(10.0));
    }

    #[tokio::test]
    async fn test_leads_are_appended_and_listed_newest_first() {
        let store = MemoryStore::new();
        let first = store
            .append_lead(NewLead {
                name: "First".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = store
            .append_lead(NewLead {
                name: "Second".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!((first, second), (1, 2));
        let names: Vec<String> = store
            .list_leads()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }
}
