//! Distance-based fare schedule and quotes

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::geo::{round2, LngLat};

/// Base fare parameters plus the passenger discount table.
///
/// Discount values are fractions in `[0, 1]`, keyed by lowercase passenger
/// type. Lookup never fails: an unknown type rides at full fare.
#[derive(Debug, Clone, PartialEq)]
pub struct FareSchedule {
    pub base_fare: f64,
    pub per_km_rate: f64,
    discounts: HashMap<String, f64>,
}

impl Default for FareSchedule {
    fn default() -> Self {
        let mut discounts = HashMap::new();
        discounts.insert("regular".to_string(), 0.0);
        discounts.insert("student".to_string(), 0.20);
        discounts.insert("senior".to_string(), 0.20);
        discounts.insert("pwd".to_string(), 0.20);
        Self { base_fare: 15.0, per_km_rate: 2.5, discounts }
    }
}

impl FareSchedule {
    pub fn new(base_fare: f64, per_km_rate: f64) -> Self {
        Self { base_fare, per_km_rate, discounts: HashMap::new() }
    }

    /// Add or replace a discount entry (stored lowercase).
    pub fn with_discount(mut self, passenger_type: &str, fraction: f64) -> Self {
        self.discounts.insert(passenger_type.to_ascii_lowercase(), fraction);
        self
    }

    /// Discount fraction for a passenger type.
    ///
    /// Unknown types get 0.0 rather than an error. Fractions outside
    /// `[0, 1]` are clamped.
    pub fn discount_for(&self, passenger_type: &str) -> f64 {
        self.discounts
            .get(&passenger_type.to_ascii_lowercase())
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    /// Quote a fare for a distance already measured.
    ///
    /// The distance is rounded to 2 decimals before rating; the resulting
    /// total stays unrounded (display rounding is the caller's step, via
    /// [`FareQuote::total_rounded`]).
    ///
    /// # Example
    ///
    /// ```
    /// use bussim_poc::domain::fare::FareSchedule;
    ///
    /// let schedule = FareSchedule::default();
    /// let quote = schedule.quote(1.56, "student", 2);
    /// assert_eq!(quote.total_rounded(), 30.24);
    /// ```
    pub fn quote(&self, distance_km: f64, passenger_type: &str, passengers: u32) -> FareQuote {
        let distance_km = round2(distance_km);
        let discount = self.discount_for(passenger_type);
        let total = (self.base_fare + distance_km * self.per_km_rate)
            * (1.0 - discount)
            * passengers as f64;

        FareQuote {
            distance_km,
            base_fare: self.base_fare,
            per_km_rate: self.per_km_rate,
            passenger_type: passenger_type.to_string(),
            passengers,
            discount,
            total,
            quoted_at: Utc::now(),
        }
    }

    /// Quote a fare between two points (great-circle distance).
    pub fn quote_between(
        &self,
        origin: LngLat,
        destination: LngLat,
        passenger_type: &str,
        passengers: u32,
    ) -> FareQuote {
        self.quote(origin.haversine_km(destination), passenger_type, passengers)
    }
}

/// One computed fare.
#[derive(Debug, Clone, Serialize)]
pub struct FareQuote {
    pub distance_km: f64,
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub passenger_type: String,
    pub passengers: u32,
    pub discount: f64,
    pub total: f64,
    pub quoted_at: DateTime<Utc>,
}

impl FareQuote {
    /// Total rounded to 2 decimals for display.
    pub fn total_rounded(&self) -> f64 {
        round2(self.total)
    }
}
