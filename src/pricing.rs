//! Package pricing.
//!
//! Pure functions for the planner's pricing math: no storage access. Callers
//! look up the route's rate record and the current settings and pass both in.

use crate::models::{PricedPackage, RateRecord, Settings, Tier, TransportMode};

/// A planning request after defaults have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    /// Lowercased, trimmed.
    pub origin: String,
    /// Lowercased, trimmed.
    pub destination: String,
    /// Party size, at least 1.
    pub pax: i32,
    /// At least 1.
    pub days: i32,
    /// Vehicle hire wanted.
    pub wants_cab: bool,
    /// As submitted; unknown modes price transport at zero.
    pub travel_mode: String,
}

/// Treats absent or non-finite amounts as zero.
fn price_or_zero(amount: Option<f64>) -> f64 {
    amount.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Rounds to the nearest whole unit, halves toward positive infinity.
pub fn round_to_unit(amount: f64) -> i64 {
    (amount + 0.5).floor() as i64
}

/// Round-trip fare for one traveller on the requested mode.
pub fn round_trip_fare(rate: Option<&RateRecord>, travel_mode: &str) -> f64 {
    match (rate, TransportMode::parse(travel_mode)) {
        (Some(rate), Some(mode)) => price_or_zero(rate.round_trip_fare(mode)),
        _ => 0.0,
    }
}

/// Applies markup, service fee and tax to a tier's cost subtotal.
///
/// The percentage fee is taken on the marked-up subtotal before the flat fee
/// is added; tax applies last and only when positive.
pub fn apply_charges(subtotal: f64, markup_percent: f64, settings: &Settings) -> f64 {
    let marked_up = subtotal * (1.0 + markup_percent / 100.0);

    let flat_fee = price_or_zero(settings.service_fee_flat);
    let fee_percent = price_or_zero(settings.service_fee_percent);
    let mut total = marked_up + flat_fee + marked_up * fee_percent / 100.0;

    let tax_percent = price_or_zero(settings.gst_percent);
    if tax_percent > 0.0 {
        total *= 1.0 + tax_percent / 100.0;
    }

    total
}

/// Prices one tier.
pub fn price_tier(
    tier: Tier,
    trip: &TripRequest,
    rate: Option<&RateRecord>,
    settings: &Settings,
) -> PricedPackage {
    let days = f64::from(trip.days);

    let transport = round_trip_fare(rate, &trip.travel_mode) * f64::from(trip.pax);
    let hotel = price_or_zero(rate.and_then(|r| r.hotel_per_night(tier))) * days;
    let cab = if trip.wants_cab {
        price_or_zero(rate.and_then(|r| r.cab_daily(tier))) * days
    } else {
        0.0
    };

    let markup = price_or_zero(settings.markup_percent(tier));
    let total = apply_charges(transport + hotel + cab, markup, settings);

    PricedPackage {
        tier: tier.name().to_string(),
        currency: settings.currency_code().to_string(),
        total: round_to_unit(total),
    }
}

/// Prices all three packages, always in Budget, Standard, Premium order.
///
/// Never fails: a missing rate record or missing fields price as zero cost.
pub fn price_packages(
    trip: &TripRequest,
    rate: Option<&RateRecord>,
    settings: &Settings,
) -> Vec<PricedPackage> {
    Tier::ALL
        .iter()
        .map(|&tier| price_tier(tier, trip, rate, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(days: i32, pax: i32, wants_cab: bool, mode: &str) -> TripRequest {
        TripRequest {
            origin: "delhi".to_string(),
            destination: "agra".to_string(),
            pax,
            days,
            wants_cab,
            travel_mode: mode.to_string(),
        }
    }

    fn flat_fee_settings(gst: f64) -> Settings {
        Settings {
            service_fee_flat: Some(100.0),
            service_fee_percent: Some(0.0),
            markup_percent_budget: Some(5.0),
            markup_percent_standard: Some(10.0),
            markup_percent_premium: Some(15.0),
            gst_percent: Some(gst),
            currency: Some("INR".to_string()),
        }
    }

    fn train_rate() -> RateRecord {
        RateRecord {
            route_key: "delhi|agra".to_string(),
            train_return: Some(2000.0),
            hotel_per_night_standard: Some(1000.0),
            ..Default::default()
        }
    }

    fn total_for(packages: &[PricedPackage], tier: &str) -> i64 {
        packages
            .iter()
            .find(|p| p.tier == tier)
            .map(|p| p.total)
            .unwrap()
    }

    #[test]
    fn test_round_to_unit_halves_round_up() {
        assert_eq!(round_to_unit(2.5), 3);
        assert_eq!(round_to_unit(2.49), 2);
        assert_eq!(round_to_unit(-2.5), -2);
        assert_eq!(round_to_unit(4724.999999), 4725);
    }

    #[test]
    fn test_packages_come_in_tier_order() {
        let packages = price_packages(&trip(2, 1, false, "train"), None, &Settings::seeded());
        let tiers: Vec<&str> = packages.iter().map(|p| p.tier.as_str()).collect();
        assert_eq!(tiers, vec!["Budget", "Standard", "Premium"]);
    }

    #[test]
    fn test_standard_scenario_without_tax() {
        // 2000 + 1000*2 = 4000, +10% = 4400, +100 flat = 4500
        let rate = train_rate();
        let packages = price_packages(&trip(2, 1, false, "train"), Some(&rate), &flat_fee_settings(0.0));
        assert_eq!(total_for(&packages, "Standard"), 4500);
    }

    #[test]
    fn test_standard_scenario_with_tax() {
        let rate = train_rate();
        let packages = price_packages(&trip(2, 1, false, "train"), Some(&rate), &flat_fee_settings(5.0));
        assert_eq!(total_for(&packages, "Standard"), 4725);
    }

    #[test]
    fn test_percent_fee_uses_pre_fee_subtotal() {
        let rate = train_rate();
        let mut settings = flat_fee_settings(0.0);
        settings.service_fee_percent = Some(10.0);

        // 4400 + 100 + 440 = 4940
        let packages = price_packages(&trip(2, 1, false, "train"), Some(&rate), &settings);
        assert_eq!(total_for(&packages, "Standard"), 4940);
    }

    #[test]
    fn test_transport_not_multiplied_by_days() {
        let rate = RateRecord {
            bus_return: Some(500.0),
            ..Default::default()
        };
        let settings = Settings::default();

        let one_day = price_packages(&trip(1, 2, false, "bus"), Some(&rate), &settings);
        let ten_days = price_packages(&trip(10, 2, false, "bus"), Some(&rate), &settings);
        assert_eq!(total_for(&one_day, "Budget"), 1000);
        assert_eq!(total_for(&ten_days, "Budget"), 1000);
    }

    #[test]
    fn test_boundary_single_day_single_traveller() {
        let rate = RateRecord {
            flight_return: Some(7000.0),
            hotel_per_night_budget: Some(1500.0),
            cab_daily_budget: Some(2500.0),
            ..Default::default()
        };

        let packages = price_packages(&trip(1, 1, false, "flight"), Some(&rate), &Settings::default());
        assert_eq!(total_for(&packages, "Budget"), 8500);
    }

    #[test]
    fn test_vehicle_cost_only_when_wanted() {
        let rate = RateRecord {
            cab_daily_premium: Some(3000.0),
            ..Default::default()
        };
        let settings = Settings::default();

        let without = price_packages(&trip(3, 1, false, "train"), Some(&rate), &settings);
        let with = price_packages(&trip(3, 1, true, "train"), Some(&rate), &settings);
        assert_eq!(total_for(&without, "Premium"), 0);
        assert_eq!(total_for(&with, "Premium"), 9000);
    }

    #[test]
    fn test_unknown_mode_prices_transport_at_zero() {
        let rate = RateRecord {
            train_return: Some(2000.0),
            bus_return: Some(800.0),
            flight_return: Some(6000.0),
            ..Default::default()
        };

        let packages = price_packages(&trip(2, 4, false, "ship"), Some(&rate), &Settings::default());
        assert!(packages.iter().all(|p| p.total == 0));
    }

    #[test]
    fn test_missing_rate_leaves_only_fees() {
        let packages = price_packages(&trip(5, 3, true, "train"), None, &flat_fee_settings(18.0));
        // round(100 * 1.18)
        assert!(packages.iter().all(|p| p.total == 118));
    }

    #[test]
    fn test_absent_settings_price_at_cost() {
        let rate = train_rate();
        let packages = price_packages(&trip(2, 1, false, "train"), Some(&rate), &Settings::default());
        assert_eq!(total_for(&packages, "Standard"), 4000);
        assert!(packages.iter().all(|p| p.currency == "INR"));
    }

    #[test]
    fn test_negative_tax_is_ignored() {
        let packages = price_packages(&trip(1, 1, false, "train"), None, &flat_fee_settings(-10.0));
        assert!(packages.iter().all(|p| p.total == 100));
    }

    #[test]
    fn test_non_finite_amounts_treated_as_zero() {
        let rate = RateRecord {
            train_return: Some(f64::NAN),
            hotel_per_night_budget: Some(f64::INFINITY),
            ..Default::default()
        };
        let packages = price_packages(&trip(2, 1, false, "train"), Some(&rate), &Settings::default());
        assert_eq!(total_for(&packages, "Budget"), 0);
    }

    #[test]
    fn test_currency_follows_settings() {
        let mut settings = flat_fee_settings(0.0);
        settings.currency = Some("USD".to_string());
        let packages = price_packages(&trip(1, 1, false, "train"), None, &settings);
        assert!(packages.iter().all(|p| p.currency == "USD"));
    }
}
