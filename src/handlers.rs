use crate::config::Config;
use crate::errors::AppError;
use crate::intake::{LeadRequest, OtpRequest, PlanRequest, Verification};
use crate::models::*;
use crate::pricing;
use crate::storage::Storage;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use std::sync::Arc;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

const PLAN_NOTE: &str =
    "Estimates based on admin-configured rates. Update exact fares in Admin > Rates.";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Rate, settings and lead storage.
    pub store: Arc<dyn Storage>,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, config: Config) -> Self {
        Self { store, config }
    }

    fn verification(&self) -> Verification<'_> {
        if self.config.require_otp {
            Verification::DemoCode(&self.config.demo_otp)
        } else {
            Verification::Disabled
        }
    }
}

/// Checks the `x-admin-key` header against the configured secret.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let key = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing x-admin-key header".to_string()))?;

    if !constant_time_compare(key, &state.config.admin_key) {
        return Err(AppError::Unauthorized("Invalid admin key".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison (basic implementation)
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Keeps the last four characters of a phone number for logs.
fn mask_phone(phone: &str) -> String {
    let phone = phone.trim();
    let visible = phone.chars().count().saturating_sub(4);
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}

/// Parses a plan body. An empty body prices with every default applied.
fn plan_request(body: &Bytes) -> Result<PlanRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PlanRequest::default());
    }
    let Json(request) = Json::<PlanRequest>::from_bytes(body)?;
    Ok(request)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rwts-planner",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/send-otp
///
/// Issues the demo verification code for a phone number. Nothing is sent;
/// the response tells the caller which code to use.
pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OtpRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    let Json(request) = payload?;

    if request.phone.trim().is_empty() {
        return Err(AppError::BadRequest("Phone required".to_string()));
    }

    tracing::info!(
        "POST /send-otp - demo code issued for {}",
        mask_phone(&request.phone)
    );

    Ok(Json(AckResponse {
        message: Some(format!(
            "OTP sent (demo). Use code: {}",
            state.config.demo_otp
        )),
        ..AckResponse::ok()
    }))
}

/// POST /api/lead
///
/// Stores a customer inquiry. Absent fields take their documented defaults;
/// the lead is verified when the submitted code matches.
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    let Json(request) = payload?;
    let lead = request.into_new_lead(state.verification());
    let verified = lead.verified;

    let id = state.store.append_lead(lead).await?;
    tracing::info!("POST /lead - stored lead {} (verified: {})", id, verified);

    Ok(Json(AckResponse {
        id: Some(id),
        ..AckResponse::ok()
    }))
}

/// GET /api/leads
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Lead>>, AppError> {
    require_admin(&state, &headers)?;

    let leads = state.store.list_leads().await?;
    tracing::info!("GET /leads - {} lead(s)", leads.len());

    Ok(Json(leads))
}

/// GET /api/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Settings>, AppError> {
    require_admin(&state, &headers)?;

    let settings = state.store.settings().await?.unwrap_or_default();
    Ok(Json(settings))
}

/// POST /api/settings
///
/// Partial merge: only the fields present in the body change.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    require_admin(&state, &headers)?;
    let Json(update) = payload?;

    let settings = state.store.update_settings(update).await?;
    tracing::info!("POST /settings - settings now {:?}", settings);

    Ok(Json(AckResponse::ok()))
}

/// GET /api/rates
pub async fn list_rates(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<RateRecord>>, AppError> {
    require_admin(&state, &headers)?;

    let rates = state.store.list_rates().await?;
    tracing::info!("GET /rates - {} rate record(s)", rates.len());

    Ok(Json(rates))
}

/// POST /api/rates
///
/// Upserts one rate record keyed by the lowercased origin/destination pair.
pub async fn upsert_rate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<RateUpsert>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    require_admin(&state, &headers)?;
    let Json(rate) = payload?;

    let record = state.store.upsert_rate(rate).await?;
    tracing::info!(
        "POST /rates - upserted {} (id {})",
        record.route_key,
        record.id
    );

    Ok(Json(AckResponse {
        route_key: Some(record.route_key),
        ..AckResponse::ok()
    }))
}

/// POST /api/plan
///
/// Prices the Budget, Standard and Premium packages for a trip. Missing
/// rates or settings price as zero rather than failing.
pub async fn plan(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PlanResponse>, AppError> {
    let trip = plan_request(&body)?.into_trip();

    let key = route_key(&trip.origin, &trip.destination);
    let rate = state.store.find_rate(&key).await?;
    let settings = state.store.settings().await?.unwrap_or_default();

    if rate.is_none() {
        tracing::debug!("No rate record for {}, pricing fees only", key);
    }

    let options = pricing::price_packages(&trip, rate.as_ref(), &settings);
    tracing::info!(
        "POST /plan - {} via {} for {} pax / {} day(s): {:?}",
        key,
        trip.travel_mode,
        trip.pax,
        trip.days,
        options.iter().map(|p| p.total).collect::<Vec<_>>()
    );

    Ok(Json(PlanResponse {
        origin: trip.origin,
        destination: trip.destination,
        pax: trip.pax,
        days: trip.days,
        wants_cab: trip.wants_cab,
        travel_mode: trip.travel_mode,
        options,
        note: PLAN_NOTE.to_string(),
    }))
}
