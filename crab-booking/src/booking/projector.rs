//! Availability Projector
//!
//! 只读投影：从窗口起始日期开始，连续 N 天，每个活跃时段的剩余座位数。
//! 每次请求实时计算，不缓存；每个单元格独立读取账本，
//! 同一响应内不同单元格可能对应不同时刻的账本状态。

use super::catalog::CatalogService;
use super::error::{BookingError, BookingResult};
use super::ledger::CapacityLedger;
use super::locale::DisplayLocale;
use chrono::{Datelike, Duration, NaiveDate};
use shared::models::{AvailabilityDay, SlotAvailability};
use std::sync::Arc;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_WINDOW_DAYS: u32 = 31;

#[derive(Debug, Clone)]
pub struct AvailabilityProjector {
    ledger: CapacityLedger,
    catalog: Arc<CatalogService>,
    locale: DisplayLocale,
}

impl AvailabilityProjector {
    pub fn new(ledger: CapacityLedger, catalog: Arc<CatalogService>, locale: DisplayLocale) -> Self {
        Self {
            ledger,
            catalog,
            locale,
        }
    }

    /// Project `days` consecutive days starting at `window_start`
    ///
    /// `days` is clamped to `1..=MAX_WINDOW_DAYS`.
    pub fn project(&self, window_start: NaiveDate, days: u32) -> BookingResult<Vec<AvailabilityDay>> {
        let config = self.catalog.restaurant_config()?;
        let slots = self.catalog.list_active()?;
        if slots.is_empty() {
            return Err(BookingError::NoActiveTimeslots);
        }

        let days = days.clamp(1, MAX_WINDOW_DAYS);
        let capacity = config.total_capacity;

        (0..days)
            .map(|offset| -> BookingResult<AvailabilityDay> {
                let date = window_start + Duration::days(i64::from(offset));
                let timeslots = slots
                    .iter()
                    .map(|slot| -> BookingResult<SlotAvailability> {
                        let consumed = self.ledger.consumed_guests(date, slot.id)?;
                        Ok(SlotAvailability {
                            id: slot.id,
                            time: slot.start_time,
                            total_places: capacity,
                            available_places: capacity.saturating_sub(consumed),
                        })
                    })
                    .collect::<BookingResult<Vec<_>>>()?;

                Ok(AvailabilityDay {
                    date,
                    display_date: self.locale.display_date(date),
                    day_name: self.locale.day_name(date.weekday()).to_string(),
                    timeslots,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::ledger::NewReservation;
    use crate::booking::storage::BookingStorage;
    use shared::models::{RestaurantConfigUpdate, TimeslotCreate, UserSummary};

    fn setup(capacity: Option<u32>, times: &[&str]) -> (AvailabilityProjector, CapacityLedger, Arc<CatalogService>) {
        let storage = BookingStorage::open_in_memory().unwrap();
        let ledger = CapacityLedger::new(storage.clone());
        let catalog = Arc::new(CatalogService::new(storage).unwrap());
        if let Some(capacity) = capacity {
            catalog
                .update_restaurant_config(RestaurantConfigUpdate {
                    total_capacity: Some(capacity),
                    restaurant_name: Some("Le Crabe".into()),
                    ..Default::default()
                })
                .unwrap();
        }
        for t in times {
            catalog
                .create_timeslot(TimeslotCreate {
                    start_time: t.to_string(),
                    is_active: None,
                })
                .unwrap();
        }
        let projector = AvailabilityProjector::new(ledger.clone(), catalog.clone(), DisplayLocale::Fr);
        (projector, ledger, catalog)
    }

    fn book(ledger: &CapacityLedger, user: i64, slot: i64, date: NaiveDate, guests: u32) {
        ledger
            .insert(NewReservation {
                user: UserSummary {
                    id: user,
                    first_name: "A".into(),
                    last_name: "B".into(),
                    email: "a@b.c".into(),
                    phone: None,
                },
                timeslot_id: slot,
                reservation_date: date,
                number_of_guests: guests,
            })
            .unwrap();
    }

    // 2030-01-13 is a Sunday
    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 13).unwrap()
    }

    #[test]
    fn test_window_shape() {
        let (projector, _, catalog) = setup(Some(20), &["20:00", "12:00"]);
        let days = projector.project(sunday(), DEFAULT_WINDOW_DAYS).unwrap();

        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, sunday());
        assert_eq!(days[0].day_name, "Dimanche");
        assert_eq!(days[0].display_date, "13/01/2030");
        assert_eq!(days[1].day_name, "Lundi");
        assert_eq!(days[6].date, NaiveDate::from_ymd_opt(2030, 1, 19).unwrap());

        let active = catalog.list_active().unwrap();
        for day in &days {
            let ids: Vec<i64> = day.timeslots.iter().map(|s| s.id).collect();
            assert_eq!(ids, active.iter().map(|s| s.id).collect::<Vec<_>>());
            assert!(day.timeslots.iter().all(|s| s.total_places == 20 && s.available_places == 20));
        }
        assert_eq!(days[0].timeslots[0].time.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_remaining_seats_per_cell() {
        let (projector, ledger, catalog) = setup(Some(10), &["19:00", "21:00"]);
        let slots = catalog.list_active().unwrap();
        let monday = sunday() + Duration::days(1);
        book(&ledger, 1, slots[0].id, monday, 4);
        book(&ledger, 2, slots[0].id, monday, 3);

        let days = projector.project(sunday(), 3).unwrap();
        assert_eq!(days[1].timeslots[0].available_places, 3);
        assert_eq!(days[1].timeslots[1].available_places, 10);
        assert_eq!(days[0].timeslots[0].available_places, 10);
        assert_eq!(days[2].timeslots[0].available_places, 10);
    }

    #[test]
    fn test_overbooked_cell_clamps_to_zero() {
        let (projector, ledger, catalog) = setup(Some(10), &["19:00"]);
        let slot = catalog.list_active().unwrap()[0].id;
        book(&ledger, 1, slot, sunday(), 8);
        catalog
            .update_restaurant_config(RestaurantConfigUpdate {
                total_capacity: Some(5),
                ..Default::default()
            })
            .unwrap();

        let days = projector.project(sunday(), 1).unwrap();
        assert_eq!(days[0].timeslots[0].available_places, 0);
        assert_eq!(days[0].timeslots[0].total_places, 5);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let (projector, ledger, catalog) = setup(Some(10), &["19:00"]);
        let slot = catalog.list_active().unwrap()[0].id;
        book(&ledger, 1, slot, sunday(), 2);

        let first = projector.project(sunday(), 7).unwrap();
        let second = projector.project(sunday(), 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_config_or_timeslots() {
        let (projector, _, _) = setup(None, &["19:00"]);
        assert!(matches!(
            projector.project(sunday(), 7),
            Err(BookingError::ConfigMissing)
        ));

        let (projector, _, _) = setup(Some(10), &[]);
        assert!(matches!(
            projector.project(sunday(), 7),
            Err(BookingError::NoActiveTimeslots)
        ));
    }

    #[test]
    fn test_days_clamped() {
        let (projector, _, _) = setup(Some(10), &["19:00"]);
        assert_eq!(projector.project(sunday(), 0).unwrap().len(), 1);
        assert_eq!(projector.project(sunday(), 400).unwrap().len(), 31);
    }
}
