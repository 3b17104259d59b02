//! Running fare meter
//!
//! Consumes position updates and keeps a live fare for the distance covered
//! so far, the way the rider-facing display ticks upward while the bus
//! moves. The meter is pure stream-side state: it never touches the clock
//! or the feed itself.

use crate::domain::fare::{FareQuote, FareSchedule};
use crate::domain::geo::LngLat;
use crate::services::feed::PositionUpdate;

pub struct FareMeter {
    schedule: FareSchedule,
    passenger_type: String,
    passengers: u32,
    /// Lap and position of the previous observation.
    last: Option<(u64, LngLat)>,
    distance_km: f64,
}

impl FareMeter {
    pub fn new(schedule: FareSchedule, passenger_type: &str, passengers: u32) -> Self {
        Self {
            schedule,
            passenger_type: passenger_type.to_string(),
            passengers,
            last: None,
            distance_km: 0.0,
        }
    }

    /// Fold one update into the running distance and quote the fare so far.
    ///
    /// The first observation contributes nothing (no previous point). When
    /// the update's lap advances past the previous one, the bus is back at
    /// the route start and the meter resets before measuring again.
    pub fn observe(&mut self, update: &PositionUpdate) -> FareQuote {
        match self.last {
            Some((last_lap, last_pos)) if last_lap == update.lap => {
                self.distance_km += last_pos.haversine_km(update.position);
            }
            Some(_) => {
                self.distance_km = 0.0;
            }
            None => {}
        }
        self.last = Some((update.lap, update.position));

        self.schedule.quote(self.distance_km, &self.passenger_type, self.passengers)
    }

    /// Unrounded distance accumulated in the current lap.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upd(index: usize, lap: u64, lng: f64, lat: f64) -> PositionUpdate {
        PositionUpdate {
            feed_id: "feed".to_string(),
            route: "test".to_string(),
            index,
            lap,
            position: LngLat::new(lng, lat),
            ts_ms: 0,
        }
    }

    #[test]
    fn test_first_observation_charges_base_fare_only() {
        let mut meter = FareMeter::new(FareSchedule::default(), "regular", 1);
        let quote = meter.observe(&upd(0, 0, 123.9, 10.3));

        assert_eq!(meter.distance_km(), 0.0);
        assert!((quote.total - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_accumulates_along_equator() {
        let mut meter = FareMeter::new(FareSchedule::default(), "regular", 1);
        meter.observe(&upd(0, 0, 0.0, 0.0));
        meter.observe(&upd(1, 0, 0.01, 0.0));
        let quote = meter.observe(&upd(2, 0, 0.02, 0.0));

        // 0.02 degrees of longitude at the equator, ~1.112 km per 0.01.
        let expected = 0.02 * crate::domain::geo::EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!((meter.distance_km() - expected).abs() < 1e-9);
        assert_eq!(quote.distance_km, 2.22);
    }

    #[test]
    fn test_distance_is_monotone_within_a_lap() {
        let mut meter = FareMeter::new(FareSchedule::default(), "regular", 1);
        let mut previous = 0.0;
        for i in 0..5 {
            meter.observe(&upd(i, 0, 123.9 + i as f64 * 0.001, 10.3));
            assert!(meter.distance_km() >= previous);
            previous = meter.distance_km();
        }
    }

    #[test]
    fn test_lap_change_resets_the_meter() {
        let mut meter = FareMeter::new(FareSchedule::default(), "student", 2);
        meter.observe(&upd(0, 0, 0.0, 0.0));
        meter.observe(&upd(1, 0, 0.05, 0.0));
        assert!(meter.distance_km() > 0.0);

        let quote = meter.observe(&upd(0, 1, 0.0, 0.0));
        assert_eq!(meter.distance_km(), 0.0);
        // Back at the start: base fare, student discount, two passengers.
        assert!((quote.total - 15.0 * 0.8 * 2.0).abs() < 1e-9);
    }
}
