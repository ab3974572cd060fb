//! Request schemas for the public endpoints.
//!
//! Customer-facing forms submit loosely typed JSON: numbers arrive as strings,
//! checkboxes as `"1"`, blank inputs as `null`. The helpers here accept those
//! shapes while still rejecting structurally wrong input (objects or arrays
//! where a scalar belongs).

use serde::{Deserialize, Deserializer};

use crate::models::NewLead;
use crate::pricing::TripRequest;

/// Scalar forms accepted for integer fields.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntLike {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Parses the leading integer of a string: `"3"`, `" 12 nights"`, `"-2"`.
/// Returns `None` when no digits lead the string.
pub fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// True only for `true`, `"true"`, `1` and `"1"`.
pub fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64() == Some(1.0),
        serde_json::Value::String(s) => s == "true" || s == "1",
        _ => false,
    }
}

/// Text field where `null` counts as empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer field given as a number or numeric string. Unparseable text and
/// `null` yield `None`, leaving the field's default in place.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<IntLike>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            IntLike::Int(n) => Some(n),
            IntLike::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            IntLike::Float(_) => None,
            IntLike::Text(s) => leading_int(&s),
        })
        .and_then(|n| i32::try_from(n).ok()))
}

/// Yes/no field. See [`truthy`] for the accepted spellings.
pub fn boolish<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => Err(
            serde::de::Error::custom("expected a boolean, number or string"),
        ),
        Some(value) => Ok(truthy(&value)),
        None => Ok(false),
    }
}

/// Body of `POST /api/send-otp`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtpRequest {
    #[serde(default, deserialize_with = "text")]
    pub phone: String,
}

/// Body of `POST /api/lead`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadRequest {
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub phone: String,
    #[serde(default, deserialize_with = "text")]
    pub city: String,
    #[serde(default, deserialize_with = "text")]
    pub email: String,
    #[serde(default, deserialize_with = "text")]
    pub service: String,
    #[serde(default, deserialize_with = "text")]
    pub origin: String,
    #[serde(default, deserialize_with = "text")]
    pub destination: String,
    #[serde(default, deserialize_with = "text")]
    pub start_date: String,
    #[serde(default, deserialize_with = "text")]
    pub end_date: String,
    /// Defaults to 0.
    #[serde(default, deserialize_with = "lenient_int")]
    pub days: Option<i32>,
    /// Party size, defaults to 1.
    #[serde(default, deserialize_with = "lenient_int")]
    pub pax: Option<i32>,
    #[serde(default, deserialize_with = "boolish")]
    pub wants_cab: bool,
    #[serde(default, deserialize_with = "text")]
    pub notes: String,
    #[serde(default, deserialize_with = "text")]
    pub otp: String,
}

/// How submitted verification codes are judged.
#[derive(Debug, Clone)]
pub enum Verification<'a> {
    /// Verified when the submitted code equals the demo code.
    DemoCode(&'a str),
    /// Every lead counts as verified.
    Disabled,
}

impl LeadRequest {
    pub fn into_new_lead(self, verification: Verification<'_>) -> NewLead {
        let verified = match verification {
            Verification::DemoCode(code) => !self.otp.is_empty() && self.otp == code,
            Verification::Disabled => true,
        };

        NewLead {
            name: self.name,
            phone: self.phone,
            city: self.city,
            email: self.email,
            service: self.service,
            origin: self.origin.trim().to_string(),
            destination: self.destination.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            days: self.days.unwrap_or(0),
            pax: self.pax.unwrap_or(1),
            wants_cab: self.wants_cab,
            notes: self.notes,
            verified,
        }
    }
}

/// Body of `POST /api/plan`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanRequest {
    #[serde(default, deserialize_with = "text")]
    pub origin: String,
    #[serde(default, deserialize_with = "text")]
    pub destination: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub pax: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub days: Option<i32>,
    #[serde(default, deserialize_with = "boolish")]
    pub wants_cab: bool,
    #[serde(default, deserialize_with = "text")]
    pub travel_mode: String,
}

impl PlanRequest {
    /// Applies defaults: pax and days are at least 1, mode defaults to train.
    pub fn into_trip(self) -> TripRequest {
        let travel_mode = if self.travel_mode.is_empty() {
            "train".to_string()
        } else {
            self.travel_mode
        };

        TripRequest {
            origin: self.origin.trim().to_lowercase(),
            destination: self.destination.trim().to_lowercase(),
            pax: self.pax.unwrap_or(1).max(1),
            days: self.days.unwrap_or(1).max(1),
            wants_cab: self.wants_cab,
            travel_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead(body: serde_json::Value) -> Result<LeadRequest, serde_json::Error> {
        serde_json::from_value(body)
    }

    #[test]
    fn leading_int_matches_form_input() {
        assert_eq!(leading_int("3"), Some(3));
        assert_eq!(leading_int(" 12 nights"), Some(12));
        assert_eq!(leading_int("-2"), Some(-2));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("-"), None);
    }

    #[test]
    fn truthy_accepts_only_known_spellings() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!("true")));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("1")));
        assert!(!truthy(&json!("yes")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(null)));
    }

    #[test]
    fn empty_lead_gets_defaults() {
        let new_lead = lead(json!({}))
            .unwrap()
            .into_new_lead(Verification::DemoCode("111111"));

        assert_eq!(new_lead.name, "");
        assert_eq!(new_lead.days, 0);
        assert_eq!(new_lead.pax, 1);
        assert!(!new_lead.wants_cab);
        assert!(!new_lead.verified);
    }

    #[test]
    fn lead_coerces_form_values() {
        let new_lead = lead(json!({
            "name": "Asha",
            "origin": "  Delhi ",
            "days": "4",
            "pax": 3,
            "wants_cab": "1",
            "notes": null,
            "otp": "111111"
        }))
        .unwrap()
        .into_new_lead(Verification::DemoCode("111111"));

        assert_eq!(new_lead.origin, "Delhi");
        assert_eq!(new_lead.days, 4);
        assert_eq!(new_lead.pax, 3);
        assert!(new_lead.wants_cab);
        assert_eq!(new_lead.notes, "");
        assert!(new_lead.verified);
    }

    #[test]
    fn wrong_code_is_unverified_unless_disabled() {
        let request = lead(json!({ "otp": "000000" })).unwrap();
        assert!(!request
            .clone()
            .into_new_lead(Verification::DemoCode("111111"))
            .verified);
        assert!(request.into_new_lead(Verification::Disabled).verified);
    }

    #[test]
    fn structurally_wrong_fields_are_rejected() {
        assert!(lead(json!({ "name": { "first": "A" } })).is_err());
        assert!(lead(json!({ "days": [1, 2] })).is_err());
        assert!(lead(json!({ "wants_cab": {} })).is_err());
        assert!(lead(json!({ "phone": 9876543210u64 })).is_err());
    }

    #[test]
    fn non_numeric_days_fall_back_to_default() {
        let new_lead = lead(json!({ "days": "soon", "pax": "many" }))
            .unwrap()
            .into_new_lead(Verification::Disabled);
        assert_eq!(new_lead.days, 0);
        assert_eq!(new_lead.pax, 1);
    }

    #[test]
    fn plan_request_defaults() {
        let trip = serde_json::from_value::<PlanRequest>(json!({}))
            .unwrap()
            .into_trip();
        assert_eq!(trip.pax, 1);
        assert_eq!(trip.days, 1);
        assert_eq!(trip.travel_mode, "train");
        assert!(!trip.wants_cab);
    }

    #[test]
    fn plan_request_normalizes_route_and_floors_counts() {
        let trip = serde_json::from_value::<PlanRequest>(json!({
            "origin": " Mumbai ",
            "destination": "GOA",
            "pax": 0,
            "days": "-3",
            "wants_cab": true,
            "travel_mode": "flight"
        }))
        .unwrap()
        .into_trip();

        assert_eq!(trip.origin, "mumbai");
        assert_eq!(trip.destination, "goa");
        assert_eq!(trip.pax, 1);
        assert_eq!(trip.days, 1);
        assert!(trip.wants_cab);
        assert_eq!(trip.travel_mode, "flight");
    }
}
